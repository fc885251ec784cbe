/// Cached per-slot buffers derived from the current display frame.
///
/// `uvs`, `local_vertices` and `result_vertices` always have the same length.
/// Buffers are reallocated only when the required length changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRenderState {
    pub indices: Vec<u16>,
    pub uvs: Vec<f32>,
    pub local_vertices: Vec<f32>,
    pub result_vertices: Vec<f32>,
    /// Premultiplied RGBA.
    pub color: [f32; 4],
}

impl Default for SlotRenderState {
    fn default() -> Self {
        Self {
            indices: Vec::new(),
            uvs: Vec::new(),
            local_vertices: Vec::new(),
            result_vertices: Vec::new(),
            color: [1.0; 4],
        }
    }
}

impl SlotRenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether geometry has been built for the current frame.
    pub fn has_geometry(&self) -> bool {
        !self.local_vertices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.local_vertices.len() / 2
    }

    /// Size the vertex buffers for `vertex_count` vertices.
    pub(crate) fn resize_vertices(&mut self, vertex_count: usize) {
        let len = vertex_count * 2;
        resize_buffer(&mut self.uvs, len);
        resize_buffer(&mut self.local_vertices, len);
        resize_buffer(&mut self.result_vertices, len);
    }

    pub(crate) fn resize_indices(&mut self, index_count: usize) {
        resize_buffer(&mut self.indices, index_count);
    }

    /// Drop the current geometry; the slot draws nothing until rebuilt.
    pub fn clear_geometry(&mut self) {
        self.indices.clear();
        self.uvs.clear();
        self.local_vertices.clear();
        self.result_vertices.clear();
    }
}

fn resize_buffer<T: Copy + Default>(buffer: &mut Vec<T>, len: usize) {
    if buffer.len() != len {
        *buffer = vec![T::default(); len];
    }
}
