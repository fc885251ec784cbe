use std::collections::BTreeMap;

use crate::traits::render::TextureId;

/// Rectangle in atlas pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A packed sub-image of an atlas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AtlasRegion {
    pub region: Rect,
    /// Original untrimmed footprint, offset relative to the trimmed image.
    pub frame: Option<Rect>,
    /// Stored rotated 90 degrees in the atlas.
    pub rotated: bool,
}

/// An atlas region resolved against its parent atlas, ready for geometry building.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextureData {
    pub region: Rect,
    pub frame: Option<Rect>,
    pub rotated: bool,
    pub atlas_width: u32,
    pub atlas_height: u32,
    /// GPU texture of the parent atlas, once the image has been uploaded.
    pub render_texture: Option<TextureId>,
}

impl TextureData {
    /// Atlas size used for UV normalisation; zero dimensions count as 1.
    pub fn atlas_size(&self) -> (f32, f32) {
        (self.atlas_width.max(1) as f32, self.atlas_height.max(1) as f32)
    }
}

/// Parsed texture atlas: image metadata plus its named regions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureAtlasData {
    pub name: String,
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    pub render_texture: Option<TextureId>,
    pub regions: BTreeMap<String, AtlasRegion>,
}

impl TextureAtlasData {
    /// Attach the uploaded atlas texture, filling undeclared dimensions from the image.
    pub fn bind_texture(&mut self, texture: TextureId, image_width: u32, image_height: u32) {
        self.render_texture = Some(texture);
        if self.width == 0 {
            self.width = image_width;
        }
        if self.height == 0 {
            self.height = image_height;
        }
    }

    pub fn region(&self, name: &str) -> Option<&AtlasRegion> {
        self.regions.get(name)
    }

    pub fn texture_data(&self, name: &str) -> Option<TextureData> {
        self.regions.get(name).map(|r| TextureData {
            region: r.region,
            frame: r.frame,
            rotated: r.rotated,
            atlas_width: self.width,
            atlas_height: self.height,
            render_texture: self.render_texture,
        })
    }

    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}
