use anyhow::Result;

use crate::slot::DisplayTransform;
use crate::traits::armature::{Armature, RenderableSlot, SlotPose};
use crate::traits::render::MeshSink;

/// Visual container for one armature: a flat position and scale applied
/// after each slot's own transform.
pub struct ArmatureDisplay {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    armature: Option<Box<dyn Armature>>,
}

impl ArmatureDisplay {
    pub fn new(armature: Box<dyn Armature>) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            armature: Some(armature),
        }
    }

    /// Set both scale factors.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale_x = scale;
        self.scale_y = scale;
    }

    /// Horizontal scale; equals the uniform scale after `set_scale`.
    pub fn scale(&self) -> f32 {
        self.scale_x
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn transform(&self) -> DisplayTransform {
        DisplayTransform {
            x: self.x,
            y: self.y,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
        }
    }

    pub fn armature(&self) -> Option<&dyn Armature> {
        self.armature.as_deref()
    }

    pub fn armature_mut(&mut self) -> Option<&mut (dyn Armature + 'static)> {
        self.armature.as_deref_mut()
    }

    pub fn is_disposed(&self) -> bool {
        self.armature.is_none()
    }

    pub fn advance_time(&mut self, dt: f32) {
        if let Some(armature) = &mut self.armature {
            armature.advance_time(dt);
        }
    }

    /// Returns false when disposed or the animation is unknown.
    pub fn play(&mut self, animation: &str) -> bool {
        self.armature
            .as_mut()
            .is_some_and(|armature| armature.play(animation))
    }

    /// Release the armature; later renders draw nothing.
    pub fn dispose(&mut self) {
        if self.armature.take().is_some() {
            tracing::debug!("armature display disposed");
        }
    }

    /// Submit every renderable slot in the armature's draw order.
    pub fn render(&mut self, sink: &mut dyn MeshSink) -> Result<()> {
        let transform = self.transform();
        let Some(armature) = &mut self.armature else {
            return Ok(());
        };
        armature.visit_slots(&mut |slot: &mut dyn RenderableSlot, pose: &SlotPose<'_>| {
            slot.render(pose, &transform, &mut *sink)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armature::StaticArmature;
    use crate::atlas::{Rect, TextureData};
    use crate::model::{DisplayData, DisplayFrame};
    use crate::traits::render::TextureId;

    #[derive(Default)]
    struct Positions(Vec<Vec<f32>>);

    impl MeshSink for Positions {
        fn submit(
            &mut self,
            _texture: TextureId,
            vertices: &[f32],
            _uvs: &[f32],
            _indices: &[u16],
            _color: [f32; 4],
        ) -> Result<()> {
            self.0.push(vertices.to_vec());
            Ok(())
        }
    }

    fn one_quad() -> StaticArmature {
        let texture = TextureData {
            region: Rect::new(0.0, 0.0, 10.0, 10.0),
            atlas_width: 10,
            atlas_height: 10,
            render_texture: Some(TextureId(1)),
            ..Default::default()
        };
        let mut armature = StaticArmature::new("quad");
        armature.add_slot(
            "body",
            DisplayFrame::new(Some(texture), Some(DisplayData::image(0.0, 0.0))),
        );
        armature.add_animation("idle");
        armature
    }

    #[test]
    fn test_set_scale_sets_both() {
        let mut display = ArmatureDisplay::new(Box::new(one_quad()));
        display.set_scale(2.5);
        assert_eq!(display.scale_x, 2.5);
        assert_eq!(display.scale_y, 2.5);
        assert_eq!(display.scale(), 2.5);
    }

    #[test]
    fn test_render_applies_container_transform() {
        let mut display = ArmatureDisplay::new(Box::new(one_quad()));
        display.set_position(100.0, 50.0);
        display.scale_x = 2.0;
        display.scale_y = 3.0;

        let mut sink = Positions::default();
        display.render(&mut sink).unwrap();
        assert_eq!(
            sink.0,
            vec![vec![100.0, 50.0, 120.0, 50.0, 120.0, 80.0, 100.0, 80.0]]
        );
    }

    #[test]
    fn test_play_unknown_animation() {
        let mut display = ArmatureDisplay::new(Box::new(one_quad()));
        assert!(display.play("idle"));
        assert!(!display.play("run"));
    }

    #[test]
    fn test_dispose_stops_rendering() {
        let mut display = ArmatureDisplay::new(Box::new(one_quad()));
        display.dispose();
        assert!(display.is_disposed());
        assert!(!display.play("idle"));
        display.advance_time(0.016);

        let mut sink = Positions::default();
        display.render(&mut sink).unwrap();
        assert!(sink.0.is_empty());
    }
}
