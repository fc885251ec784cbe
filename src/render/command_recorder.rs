use std::collections::HashMap;

use anyhow::{Result, anyhow};
use image::RgbaImage;

use crate::render::batcher::Vertex;
use crate::traits::render::{RenderBackend, TextureId};

/// Recorded draw command for testing.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginFrame,
    EndFrame,
    Clear([f32; 4]),
    DrawTriangles {
        texture: TextureId,
        vertices: Vec<Vertex>,
        indices: Vec<u16>,
    },
}

/// Mock texture data for the command recorder.
struct MockTexture {
    width: u32,
    height: u32,
}

/// A mock RenderBackend that records draw commands for snapshot testing.
/// Does not require a GPU.
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    textures: HashMap<TextureId, MockTexture>,
    next_texture_id: u64,
    clear_color: [f32; 4],
    screen_width: u32,
    screen_height: u32,
}

impl CommandRecorder {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            commands: Vec::new(),
            textures: HashMap::new(),
            next_texture_id: 1,
            clear_color: [0.0; 4],
            screen_width,
            screen_height,
        }
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Get all recorded commands.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Clear recorded commands.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of recorded draw calls.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::DrawTriangles { .. }))
            .count()
    }

    /// Register a mock texture with specified dimensions.
    pub fn register_texture(&mut self, width: u32, height: u32) -> TextureId {
        let id = TextureId(self.next_texture_id);
        self.next_texture_id += 1;
        self.textures.insert(id, MockTexture { width, height });
        id
    }
}

impl RenderBackend for CommandRecorder {
    fn begin_frame(&mut self) -> Result<()> {
        self.commands.push(DrawCommand::BeginFrame);
        self.commands.push(DrawCommand::Clear(self.clear_color));
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.commands.push(DrawCommand::EndFrame);
        Ok(())
    }

    fn create_texture(&mut self, image: &RgbaImage) -> Result<TextureId> {
        Ok(self.register_texture(image.width(), image.height()))
    }

    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&id).map(|t| (t.width, t.height))
    }

    fn remove_texture(&mut self, id: TextureId) -> bool {
        self.textures.remove(&id).is_some()
    }

    fn draw_triangles(
        &mut self,
        texture: TextureId,
        vertices: &[Vertex],
        indices: &[u16],
    ) -> Result<()> {
        if !self.textures.contains_key(&texture) {
            return Err(anyhow!("unknown texture: {:?}", texture));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(anyhow!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            ));
        }
        self.commands.push(DrawCommand::DrawTriangles {
            texture,
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        });
        Ok(())
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }
}
