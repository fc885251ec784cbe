use std::sync::Arc;

use crate::atlas::TextureData;
use crate::model::geometry::Geometry;

/// What a slot shows, as described by the skeleton data.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayData {
    /// Atlas sprite drawn as a quad; pivot is relative to the sprite size.
    Image { pivot: [f32; 2] },
    /// Triangle mesh, optionally skinned.
    Mesh { geometry: Arc<Geometry> },
    /// Nested armature; drawn by its own display, not by this slot.
    Armature,
    BoundingBox,
    Path,
}

impl DisplayData {
    pub fn image(pivot_x: f32, pivot_y: f32) -> Self {
        Self::Image {
            pivot: [pivot_x, pivot_y],
        }
    }

    pub fn mesh(geometry: Geometry) -> Self {
        Self::Mesh {
            geometry: Arc::new(geometry),
        }
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        match self {
            Self::Mesh { geometry } => Some(geometry),
            _ => None,
        }
    }
}

/// The resolved asset a slot currently displays.
///
/// Rebuilt by the animation engine whenever the active display changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayFrame {
    pub texture: Option<TextureData>,
    /// `None` means a bare texture with no display data; drawn as a quad with zero pivot.
    pub display: Option<DisplayData>,
}

impl DisplayFrame {
    pub fn new(texture: Option<TextureData>, display: Option<DisplayData>) -> Self {
        Self { texture, display }
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.display.as_ref().and_then(DisplayData::geometry)
    }

    pub fn is_mesh(&self) -> bool {
        self.geometry().is_some()
    }
}

/// Per-slot colour multipliers from the animation engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorTransform {
    pub red_multiplier: f32,
    pub green_multiplier: f32,
    pub blue_multiplier: f32,
    pub alpha_multiplier: f32,
}

impl ColorTransform {
    pub const IDENTITY: Self = Self {
        red_multiplier: 1.0,
        green_multiplier: 1.0,
        blue_multiplier: 1.0,
        alpha_multiplier: 1.0,
    };

    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red_multiplier: red,
            green_multiplier: green,
            blue_multiplier: blue,
            alpha_multiplier: alpha,
        }
    }

    /// RGBA with colour channels scaled by alpha.
    pub fn premultiplied(&self) -> [f32; 4] {
        let a = self.alpha_multiplier;
        [
            self.red_multiplier * a,
            self.green_multiplier * a,
            self.blue_multiplier * a,
            a,
        ]
    }
}

impl Default for ColorTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
