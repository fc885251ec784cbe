use anyhow::Result;

use crate::traits::render::{RenderBackend, TextureId};

/// Default vertex capacity of the staging buffer.
pub const MAX_VERTICES: usize = 8000;
/// Default index capacity of the staging buffer.
pub const MAX_INDICES: usize = 24000;

/// Interleaved vertex record uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    /// Vertex buffer layout for wgpu pipeline.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // uv
                wgpu::VertexAttribute {
                    offset: 8,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // color
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Accumulates meshes that share a texture into fixed-size staging buffers.
///
/// A batch is drawn when the texture changes, when the next mesh would not
/// fit, or on an explicit flush. Counts never exceed the capacities.
pub struct MeshBatcher {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    vertex_count: usize,
    index_count: usize,
    current_texture: Option<TextureId>,
    draw_calls: u32,
}

impl Default for MeshBatcher {
    fn default() -> Self {
        Self::with_capacity(MAX_VERTICES, MAX_INDICES)
    }
}

impl MeshBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate staging buffers once; they are reused for the batcher's lifetime.
    pub fn with_capacity(max_vertices: usize, max_indices: usize) -> Self {
        Self {
            vertices: vec![Vertex::default(); max_vertices],
            indices: vec![0; max_indices],
            vertex_count: 0,
            index_count: 0,
            current_texture: None,
            draw_calls: 0,
        }
    }

    pub fn max_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn max_indices(&self) -> usize {
        self.indices.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn current_texture(&self) -> Option<TextureId> {
        self.current_texture
    }

    /// Draw calls issued since the last `reset`.
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    /// Start a new frame: drop pending data and counters.
    pub fn reset(&mut self) {
        self.vertex_count = 0;
        self.index_count = 0;
        self.current_texture = None;
        self.draw_calls = 0;
    }

    /// Append one mesh, flushing first on texture change or overflow.
    ///
    /// A mesh larger than the whole staging buffer, or bound to a texture the
    /// backend does not know, is dropped with a warning.
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &mut self,
        backend: &mut dyn RenderBackend,
        texture: TextureId,
        vertices: &[f32],
        uvs: &[f32],
        indices: &[u16],
        color: [f32; 4],
    ) -> Result<()> {
        let num_vertices = vertices.len() / 2;
        let num_indices = indices.len();

        if num_vertices > self.max_vertices() || num_indices > self.max_indices() {
            tracing::warn!(
                "mesh with {num_vertices} vertices / {num_indices} indices exceeds batch capacity"
            );
            return Ok(());
        }
        if backend.texture_size(texture).is_none() {
            tracing::warn!("skipping mesh bound to unknown texture {texture:?}");
            return Ok(());
        }

        if self.current_texture != Some(texture)
            || self.vertex_count + num_vertices > self.max_vertices()
            || self.index_count + num_indices > self.max_indices()
        {
            self.flush(backend)?;
            self.current_texture = Some(texture);
        }

        let base = self.vertex_count;
        let staged = &mut self.vertices[base..base + num_vertices];
        for ((vertex, position), uv) in staged
            .iter_mut()
            .zip(vertices.chunks_exact(2))
            .zip(uvs.chunks_exact(2))
        {
            *vertex = Vertex {
                position: [position[0], position[1]],
                uv: [uv[0], uv[1]],
                color,
            };
        }

        let staged = &mut self.indices[self.index_count..self.index_count + num_indices];
        for (dst, &index) in staged.iter_mut().zip(indices) {
            *dst = base as u16 + index;
        }

        self.vertex_count += num_vertices;
        self.index_count += num_indices;
        Ok(())
    }

    /// Draw the pending batch, if any, and reset both counts.
    pub fn flush(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        if self.vertex_count == 0 {
            return Ok(());
        }
        let vertex_count = std::mem::take(&mut self.vertex_count);
        let index_count = std::mem::take(&mut self.index_count);
        let Some(texture) = self.current_texture else {
            return Ok(());
        };

        tracing::trace!("flush {vertex_count} vertices / {index_count} indices");
        self.draw_calls += 1;
        backend.draw_triangles(
            texture,
            &self.vertices[..vertex_count],
            &self.indices[..index_count],
        )
    }
}
