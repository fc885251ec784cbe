//! Armature containers, the atlas factory and armature loading.

pub mod display;
pub mod factory;
pub mod static_armature;

pub use display::ArmatureDisplay;
pub use factory::{ArmatureConfig, Factory, load_armature, read_skeleton};
pub use static_armature::{StaticArmature, StaticSlot};
