use anyhow::Result;
use image::RgbaImage;

use crate::armature::ArmatureDisplay;
use crate::config::RenderConfig;
use crate::render::batcher::MeshBatcher;
use crate::traits::render::{MeshSink, RenderBackend, TextureId};

/// Per-frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub pending_vertices: usize,
    pub pending_indices: usize,
}

/// Drives armature displays through the batcher onto a backend.
///
/// Slots submit through the `MeshSink` impl; `render_frame` runs one full
/// begin / visit / flush / present cycle.
pub struct Renderer<B: RenderBackend> {
    backend: B,
    batcher: MeshBatcher,
}

impl<B: RenderBackend> Renderer<B> {
    pub fn new(backend: B, config: &RenderConfig) -> Self {
        Self::with_capacity(backend, config.max_vertices, config.max_indices)
    }

    pub fn with_capacity(backend: B, max_vertices: usize, max_indices: usize) -> Self {
        Self {
            backend,
            batcher: MeshBatcher::with_capacity(max_vertices, max_indices),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn batcher(&self) -> &MeshBatcher {
        &self.batcher
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Reset the batch and clear the render target.
    pub fn begin_frame(&mut self) -> Result<()> {
        self.batcher.reset();
        self.backend.begin_frame()
    }

    /// Draw whatever is pending.
    pub fn flush(&mut self) -> Result<()> {
        self.batcher.flush(&mut self.backend)
    }

    /// Flush the final partial batch and present.
    pub fn end_frame(&mut self) -> Result<()> {
        self.flush()?;
        self.backend.end_frame()
    }

    /// Render every display in order; later displays layer on top.
    ///
    /// A display that fails does not stop the rest of the scene: the frame is
    /// still presented and the first failure is returned afterwards.
    pub fn render_frame(&mut self, displays: &mut [ArmatureDisplay]) -> Result<()> {
        self.begin_frame()?;
        let mut first_error = None;
        for (i, display) in displays.iter_mut().enumerate() {
            if let Err(e) = display.render(self) {
                tracing::warn!("display {i} failed to render: {e:#}");
                first_error.get_or_insert(e);
            }
        }
        self.end_frame()?;
        tracing::trace!("frame done with {} draw call(s)", self.batcher.draw_calls());
        first_error.map_or(Ok(()), Err)
    }

    pub fn create_texture(&mut self, image: &RgbaImage) -> Result<TextureId> {
        self.backend.create_texture(image)
    }

    pub fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.backend.texture_size(id)
    }

    pub fn remove_texture(&mut self, id: TextureId) -> bool {
        self.backend.remove_texture(id)
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            draw_calls: self.batcher.draw_calls(),
            pending_vertices: self.batcher.vertex_count(),
            pending_indices: self.batcher.index_count(),
        }
    }
}

impl<B: RenderBackend> MeshSink for Renderer<B> {
    fn submit(
        &mut self,
        texture: TextureId,
        vertices: &[f32],
        uvs: &[f32],
        indices: &[u16],
        color: [f32; 4],
    ) -> Result<()> {
        self.batcher
            .submit(&mut self.backend, texture, vertices, uvs, indices, color)
    }
}
