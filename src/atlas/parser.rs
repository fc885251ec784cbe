use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::atlas::error::AtlasError;
use crate::atlas::texture_data::{AtlasRegion, Rect, TextureAtlasData};

/// Texture atlas JSON top-level structure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonAtlas {
    #[serde(default)]
    name: String,
    #[serde(default)]
    image_path: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(rename = "SubTexture", default)]
    sub_textures: Vec<JsonSubTexture>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonSubTexture {
    name: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    frame_x: f32,
    #[serde(default)]
    frame_y: f32,
    #[serde(default)]
    frame_width: f32,
    #[serde(default)]
    frame_height: f32,
    #[serde(default)]
    rotated: bool,
}

impl JsonSubTexture {
    fn into_region(self) -> Result<(String, AtlasRegion), AtlasError> {
        if self.width < 0.0 || self.height < 0.0 {
            return Err(AtlasError::InvalidRegion {
                name: self.name,
                width: self.width,
                height: self.height,
            });
        }
        let frame = (self.frame_width > 0.0 && self.frame_height > 0.0).then(|| {
            Rect::new(self.frame_x, self.frame_y, self.frame_width, self.frame_height)
        });
        let region = AtlasRegion {
            region: Rect::new(self.x, self.y, self.width, self.height),
            frame,
            rotated: self.rotated,
        };
        Ok((self.name, region))
    }
}

/// Parse a texture atlas description.
pub fn parse_texture_atlas(json: &str) -> Result<TextureAtlasData, AtlasError> {
    let raw: JsonAtlas = serde_json::from_str(json)?;

    let mut regions = BTreeMap::new();
    for sub in raw.sub_textures {
        let (name, region) = sub.into_region()?;
        if regions.contains_key(&name) {
            return Err(AtlasError::DuplicateName(name));
        }
        regions.insert(name, region);
    }

    Ok(TextureAtlasData {
        name: raw.name,
        image_path: raw.image_path,
        width: raw.width,
        height: raw.height,
        render_texture: None,
        regions,
    })
}

/// Read and parse a texture atlas file.
pub fn load_texture_atlas(path: &Path) -> Result<TextureAtlasData, AtlasError> {
    let content = std::fs::read_to_string(path).map_err(|source| AtlasError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let atlas = parse_texture_atlas(&content)?;
    tracing::debug!(
        "parsed atlas {:?} with {} regions from {}",
        atlas.name,
        atlas.regions.len(),
        path.display()
    );
    Ok(atlas)
}
