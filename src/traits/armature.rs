use anyhow::Result;

use crate::armature::Factory;
use crate::model::{ColorTransform, DisplayFrame, Matrix};
use crate::slot::DisplayTransform;
use crate::traits::render::MeshSink;

/// Current-pose inputs for one slot, provided by the animation engine each frame.
#[derive(Debug, Clone, Copy)]
pub struct SlotPose<'a> {
    /// Slot-to-armature transform.
    pub global_transform: Matrix,
    /// Global bone matrices indexed by the mesh weight table; `None` for unresolved bones.
    pub bones: &'a [Option<Matrix>],
    /// Per-vertex offsets for unweighted meshes; empty when not deformed.
    pub deform: &'a [f32],
    pub visible: bool,
    /// Negative when the slot shows nothing.
    pub display_index: i32,
}

impl Default for SlotPose<'_> {
    fn default() -> Self {
        Self {
            global_transform: Matrix::IDENTITY,
            bones: &[],
            deform: &[],
            visible: true,
            display_index: 0,
        }
    }
}

/// Hooks the engine's slot lifecycle calls on a renderer-side slot.
pub trait RenderableSlot {
    /// The active display frame changed.
    fn on_frame_changed(&mut self, frame: DisplayFrame);
    /// The slot's colour transform changed.
    fn on_color_changed(&mut self, color: &ColorTransform);
    /// The slot transform changed; resolved lazily at render time.
    fn on_transform_changed(&mut self) {}
    /// Compute this frame's vertices and submit them.
    fn render(
        &mut self,
        pose: &SlotPose<'_>,
        transform: &DisplayTransform,
        sink: &mut dyn MeshSink,
    ) -> Result<()>;
}

/// Visitor over an armature's renderable slots.
pub type SlotVisitor<'v> =
    dyn FnMut(&mut dyn RenderableSlot, &SlotPose<'_>) -> Result<()> + 'v;

/// An animated armature owned by the animation engine.
pub trait Armature {
    /// Advance animation playback.
    fn advance_time(&mut self, dt: f32);
    /// Start playing an animation; returns false if the name is unknown.
    fn play(&mut self, animation: &str) -> bool;
    /// Visit every renderable slot in draw order.
    fn visit_slots(&mut self, visitor: &mut SlotVisitor<'_>) -> Result<()>;
}

/// Raw skeleton file contents.
#[derive(Debug, Clone, PartialEq)]
pub enum SkeletonData {
    Binary(Vec<u8>),
    Json(serde_json::Value),
}

/// Builds armatures from skeleton data; implemented by the animation engine.
pub trait ArmatureBuilder {
    fn build_armature(
        &mut self,
        skeleton: &SkeletonData,
        armature_name: &str,
        factory: &Factory,
    ) -> Result<Box<dyn Armature>>;
}
