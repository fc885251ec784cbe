use anyhow::Result;

use crate::model::{ColorTransform, DisplayFrame, Matrix};
use crate::slot::MeshSlot;
use crate::traits::armature::{Armature, RenderableSlot, SlotPose, SlotVisitor};

/// One slot of a `StaticArmature` with its current pose.
#[derive(Debug)]
pub struct StaticSlot {
    pub name: String,
    pub transform: Matrix,
    pub visible: bool,
    pub display_index: i32,
    pub deform: Vec<f32>,
    slot: MeshSlot,
}

impl StaticSlot {
    pub fn mesh_slot(&self) -> &MeshSlot {
        &self.slot
    }
}

/// An armature whose pose is set directly instead of evaluated from timelines.
///
/// Slots render in insertion order. Animation names are only recorded:
/// `play` succeeds for a registered name and restarts the playhead.
#[derive(Debug, Default)]
pub struct StaticArmature {
    name: String,
    bones: Vec<Option<Matrix>>,
    slots: Vec<StaticSlot>,
    animations: Vec<String>,
    current_animation: Option<String>,
    time: f32,
}

impl StaticArmature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bone index used by weight tables.
    pub fn add_bone(&mut self, matrix: Option<Matrix>) -> usize {
        self.bones.push(matrix);
        self.bones.len() - 1
    }

    pub fn set_bone(&mut self, index: usize, matrix: Option<Matrix>) {
        if let Some(bone) = self.bones.get_mut(index) {
            *bone = matrix;
        }
    }

    pub fn bones(&self) -> &[Option<Matrix>] {
        &self.bones
    }

    /// Append a slot on top of the existing ones and build its geometry.
    pub fn add_slot(&mut self, name: impl Into<String>, frame: DisplayFrame) -> usize {
        let mut slot = MeshSlot::new();
        slot.on_frame_changed(frame);
        self.slots.push(StaticSlot {
            name: name.into(),
            transform: Matrix::IDENTITY,
            visible: true,
            display_index: 0,
            deform: Vec::new(),
            slot,
        });
        self.slots.len() - 1
    }

    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    pub fn slots(&self) -> &[StaticSlot] {
        &self.slots
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut StaticSlot> {
        self.slots.get_mut(index)
    }

    pub fn set_slot_transform(&mut self, index: usize, transform: Matrix) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.transform = transform;
            slot.slot.on_transform_changed();
        }
    }

    pub fn set_display_frame(&mut self, index: usize, frame: DisplayFrame) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.slot.on_frame_changed(frame);
        }
    }

    pub fn set_color(&mut self, index: usize, color: &ColorTransform) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.slot.on_color_changed(color);
        }
    }

    pub fn add_animation(&mut self, name: impl Into<String>) {
        self.animations.push(name.into());
    }

    pub fn current_animation(&self) -> Option<&str> {
        self.current_animation.as_deref()
    }

    /// Seconds since the current animation started.
    pub fn time(&self) -> f32 {
        self.time
    }
}

impl Armature for StaticArmature {
    fn advance_time(&mut self, dt: f32) {
        self.time += dt.max(0.0);
    }

    fn play(&mut self, animation: &str) -> bool {
        if !self.animations.iter().any(|a| a == animation) {
            tracing::warn!("armature {:?} has no animation {:?}", self.name, animation);
            return false;
        }
        self.current_animation = Some(animation.to_string());
        self.time = 0.0;
        true
    }

    fn visit_slots(&mut self, visitor: &mut SlotVisitor<'_>) -> Result<()> {
        for entry in &mut self.slots {
            let pose = SlotPose {
                global_transform: entry.transform,
                bones: &self.bones,
                deform: &entry.deform,
                visible: entry.visible,
                display_index: entry.display_index,
            };
            visitor(&mut entry.slot, &pose)?;
        }
        Ok(())
    }
}
