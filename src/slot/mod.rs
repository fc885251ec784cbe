//! Slot-to-geometry pipeline: geometry building, skinning/deformation and
//! transform resolution for a single slot.

pub mod geometry_builder;
pub mod mesh_slot;
pub mod render_state;
pub mod skinning;
pub mod transform;

pub use geometry_builder::{QUAD_INDICES, build_geometry};
pub use mesh_slot::MeshSlot;
pub use render_state::SlotRenderState;
pub use transform::DisplayTransform;
