use anyhow::Result;
use image::RgbaImage;

use crate::render::batcher::Vertex;

/// Texture handle for referencing uploaded textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Abstraction over the graphics device the batcher draws through.
/// Implementations: WgpuRenderer (production), CommandRecorder (testing).
pub trait RenderBackend {
    /// Acquire the render target and clear it.
    fn begin_frame(&mut self) -> Result<()>;
    /// Present the frame.
    fn end_frame(&mut self) -> Result<()>;

    /// Upload a decoded image. Colour is premultiplied by alpha on upload.
    fn create_texture(&mut self, image: &RgbaImage) -> Result<TextureId>;
    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)>;
    /// Free a texture; returns false if the id was not known.
    fn remove_texture(&mut self, id: TextureId) -> bool;

    /// Upload `vertices`/`indices` and issue one indexed triangle-list draw.
    fn draw_triangles(&mut self, texture: TextureId, vertices: &[Vertex], indices: &[u16])
    -> Result<()>;

    fn screen_size(&self) -> (u32, u32);
}

/// Receiver of per-slot mesh submissions.
pub trait MeshSink {
    /// `vertices` and `uvs` are flat `(x, y)` / `(u, v)` pairs of equal length;
    /// `indices` are relative to this submission's first vertex.
    fn submit(
        &mut self,
        texture: TextureId,
        vertices: &[f32],
        uvs: &[f32],
        indices: &[u16],
        color: [f32; 4],
    ) -> Result<()>;
}
