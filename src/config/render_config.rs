use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::render::batcher::{MAX_INDICES, MAX_VERTICES};

/// Largest vertex capacity addressable with 16-bit indices.
pub const MAX_ADDRESSABLE_VERTICES: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub max_vertices: usize,
    pub max_indices: usize,
    pub clear_color: [f32; 4],
    pub vsync: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            max_vertices: MAX_VERTICES,
            max_indices: MAX_INDICES,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            vsync: true,
        }
    }
}

impl RenderConfig {
    /// Loads config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("canvas size must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.max_vertices == 0 || self.max_indices == 0 {
            bail!("batch capacity must be non-zero");
        }
        if self.max_vertices > MAX_ADDRESSABLE_VERTICES {
            bail!(
                "max_vertices {} exceeds 16-bit index range ({})",
                self.max_vertices,
                MAX_ADDRESSABLE_VERTICES
            );
        }
        Ok(())
    }
}
