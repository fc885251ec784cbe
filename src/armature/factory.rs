use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::armature::ArmatureDisplay;
use crate::atlas::{AtlasError, TextureAtlasData, TextureData, load_texture_atlas, parse_texture_atlas};
use crate::model::{DisplayData, DisplayFrame};
use crate::render::Renderer;
use crate::slot::MeshSlot;
use crate::traits::armature::{ArmatureBuilder, RenderableSlot, SkeletonData};
use crate::traits::render::{RenderBackend, TextureId};

/// Registry of texture atlases that display frames and slots are built from.
#[derive(Debug, Default)]
pub struct Factory {
    atlases: HashMap<String, TextureAtlasData>,
}

impl Factory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an atlas under `name`, or under its own name when `None`.
    /// Replaces any atlas already registered under that key.
    pub fn add_texture_atlas(&mut self, atlas: TextureAtlasData, name: Option<&str>) -> String {
        let key = name.unwrap_or(&atlas.name).to_string();
        if self.atlases.insert(key.clone(), atlas).is_some() {
            tracing::debug!("replaced texture atlas {key:?}");
        }
        key
    }

    /// Parse atlas JSON, bind its uploaded texture and register it.
    pub fn parse_texture_atlas_data(
        &mut self,
        json: &str,
        texture: Option<(TextureId, u32, u32)>,
        name: Option<&str>,
    ) -> Result<String, AtlasError> {
        let mut atlas = parse_texture_atlas(json)?;
        if let Some((id, width, height)) = texture {
            atlas.bind_texture(id, width, height);
        }
        Ok(self.add_texture_atlas(atlas, name))
    }

    pub fn texture_atlas(&self, name: &str) -> Option<&TextureAtlasData> {
        self.atlases.get(name)
    }

    pub fn remove_texture_atlas(&mut self, name: &str) -> Option<TextureAtlasData> {
        self.atlases.remove(name)
    }

    pub fn atlas_names(&self) -> impl Iterator<Item = &str> {
        self.atlases.keys().map(String::as_str)
    }

    /// Resolve a region; an empty `atlas_name` searches every atlas.
    pub fn texture_data(&self, atlas_name: &str, texture_name: &str) -> Option<TextureData> {
        if atlas_name.is_empty() {
            return self
                .atlases
                .values()
                .find_map(|atlas| atlas.texture_data(texture_name));
        }
        self.atlases.get(atlas_name)?.texture_data(texture_name)
    }

    /// A missing region yields a texture-less frame, which draws nothing.
    pub fn build_display_frame(
        &self,
        atlas_name: &str,
        texture_name: &str,
        display: Option<DisplayData>,
    ) -> DisplayFrame {
        let texture = self.texture_data(atlas_name, texture_name);
        if texture.is_none() {
            tracing::debug!("no texture {texture_name:?} in atlas {atlas_name:?}");
        }
        DisplayFrame::new(texture, display)
    }

    /// A fresh slot with its geometry built from `frame`.
    pub fn build_slot(&self, frame: DisplayFrame) -> MeshSlot {
        let mut slot = MeshSlot::new();
        slot.on_frame_changed(frame);
        slot
    }

    /// Load an atlas description and its image, upload the image and register the atlas.
    ///
    /// Without an explicit `image_path` the atlas's own `imagePath` is resolved
    /// next to the atlas file.
    pub fn load_texture_atlas<B: RenderBackend>(
        &mut self,
        renderer: &mut Renderer<B>,
        atlas_path: &Path,
        image_path: Option<&Path>,
    ) -> Result<String> {
        let mut atlas = load_texture_atlas(atlas_path)?;
        let image_path = match image_path {
            Some(path) => path.to_path_buf(),
            None => atlas_path
                .parent()
                .map(|dir| dir.join(&atlas.image_path))
                .unwrap_or_else(|| PathBuf::from(&atlas.image_path)),
        };
        let image = image::open(&image_path)
            .map_err(|source| AtlasError::Image {
                path: image_path.clone(),
                source,
            })?
            .to_rgba8();
        let texture = renderer.create_texture(&image)?;
        atlas.bind_texture(texture, image.width(), image.height());
        tracing::info!(
            "loaded atlas {:?} ({}x{}, {} regions)",
            atlas.name,
            atlas.width,
            atlas.height,
            atlas.regions.len()
        );
        Ok(self.add_texture_atlas(atlas, None))
    }

    /// Unregister an atlas and release its texture from the renderer.
    pub fn unload_texture_atlas<B: RenderBackend>(
        &mut self,
        renderer: &mut Renderer<B>,
        name: &str,
    ) -> bool {
        let Some(atlas) = self.remove_texture_atlas(name) else {
            return false;
        };
        if let Some(texture) = atlas.render_texture
            && !renderer.remove_texture(texture)
        {
            tracing::debug!("atlas {name:?} texture {texture:?} was already released");
        }
        tracing::info!("unloaded atlas {name:?}");
        true
    }
}

/// Files and names needed to build one armature display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArmatureConfig {
    pub directory: PathBuf,
    pub skeleton_file: String,
    pub texture_atlas_file: String,
    pub texture_image_file: String,
    pub armature_name: String,
    pub animation_name: Option<String>,
}

/// Read skeleton data: raw bytes for `.dbbin`, JSON otherwise.
pub fn read_skeleton(path: &Path) -> Result<SkeletonData> {
    if path.extension().is_some_and(|ext| ext == "dbbin") {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read skeleton {}", path.display()))?;
        return Ok(SkeletonData::Binary(bytes));
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read skeleton {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse skeleton {}", path.display()))?;
    Ok(SkeletonData::Json(value))
}

/// Load skeleton, atlas and image from `config.directory`, build the armature
/// and start its default animation.
pub fn load_armature<B: RenderBackend>(
    factory: &mut Factory,
    renderer: &mut Renderer<B>,
    config: &ArmatureConfig,
    builder: &mut dyn ArmatureBuilder,
) -> Result<ArmatureDisplay> {
    let dir = &config.directory;
    let skeleton = read_skeleton(&dir.join(&config.skeleton_file))?;
    factory.load_texture_atlas(
        renderer,
        &dir.join(&config.texture_atlas_file),
        Some(&dir.join(&config.texture_image_file)),
    )?;

    let armature = builder
        .build_armature(&skeleton, &config.armature_name, factory)
        .with_context(|| format!("failed to build armature {:?}", config.armature_name))?;
    let mut display = ArmatureDisplay::new(armature);

    if let Some(animation) = &config.animation_name
        && !display.play(animation)
    {
        tracing::warn!(
            "armature {:?} has no animation {:?}",
            config.armature_name,
            animation
        );
    }
    tracing::info!("loaded armature {:?}", config.armature_name);
    Ok(display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::Rect;

    const ATLAS: &str = r#"{
        "name": "hero",
        "imagePath": "hero.png",
        "width": 0,
        "height": 0,
        "SubTexture": [
            {"name": "head", "x": 0, "y": 0, "width": 32, "height": 32},
            {"name": "arm", "x": 32, "y": 0, "width": 16, "height": 48, "rotated": true}
        ]
    }"#;

    #[test]
    fn test_parse_binds_texture_and_fills_size() {
        let mut factory = Factory::new();
        let key = factory
            .parse_texture_atlas_data(ATLAS, Some((TextureId(3), 64, 128)), None)
            .unwrap();
        assert_eq!(key, "hero");

        let atlas = factory.texture_atlas("hero").unwrap();
        assert_eq!((atlas.width, atlas.height), (64, 128));
        assert_eq!(atlas.render_texture, Some(TextureId(3)));

        let head = factory.texture_data("hero", "head").unwrap();
        assert_eq!(head.region, Rect::new(0.0, 0.0, 32.0, 32.0));
        assert_eq!(head.render_texture, Some(TextureId(3)));
        assert!(factory.texture_data("hero", "leg").is_none());
    }

    #[test]
    fn test_texture_data_search_all_atlases() {
        let mut factory = Factory::new();
        factory
            .parse_texture_atlas_data(ATLAS, None, Some("alias"))
            .unwrap();
        assert!(factory.texture_atlas("hero").is_none());
        let arm = factory.texture_data("", "arm").unwrap();
        assert!(arm.rotated);
        assert!(factory.texture_data("missing", "arm").is_none());
    }

    #[test]
    fn test_build_display_frame_missing_region() {
        let factory = Factory::new();
        let frame = factory.build_display_frame("hero", "head", Some(DisplayData::image(0.0, 0.0)));
        assert!(frame.texture.is_none());

        let slot = factory.build_slot(frame);
        assert!(!slot.state().has_geometry());
    }

    #[test]
    fn test_build_slot_from_region() {
        let mut factory = Factory::new();
        factory
            .parse_texture_atlas_data(ATLAS, Some((TextureId(1), 64, 64)), None)
            .unwrap();
        let frame = factory.build_display_frame("hero", "head", Some(DisplayData::image(0.0, 0.0)));
        let slot = factory.build_slot(frame);
        assert_eq!(slot.state().uvs, vec![0.0, 0.0, 0.5, 0.0, 0.5, 0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_read_skeleton_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("hero_ske.dbbin");
        std::fs::write(&bin, [0x44, 0x42, 0x44, 0x54]).unwrap();
        assert_eq!(
            read_skeleton(&bin).unwrap(),
            SkeletonData::Binary(vec![0x44, 0x42, 0x44, 0x54])
        );

        let json = dir.path().join("hero_ske.json");
        std::fs::write(&json, r#"{"frameRate": 24}"#).unwrap();
        assert_eq!(
            read_skeleton(&json).unwrap(),
            SkeletonData::Json(serde_json::json!({"frameRate": 24}))
        );

        let bad = dir.path().join("broken.json");
        std::fs::write(&bad, "{").unwrap();
        assert!(read_skeleton(&bad).is_err());
    }
}
