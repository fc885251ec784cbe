pub mod batcher;
pub mod color;
pub mod command_recorder;
pub mod renderer;
pub mod shader;
pub mod texture;
pub mod wgpu_renderer;
pub mod window;

pub use batcher::{MAX_INDICES, MAX_VERTICES, MeshBatcher, Vertex};
pub use command_recorder::{CommandRecorder, DrawCommand};
pub use renderer::{FrameStats, Renderer};
pub use wgpu_renderer::WgpuRenderer;
