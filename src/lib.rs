//! Batched mesh renderer for 2D skeletal animation.
//!
//! An animation engine exposes its slots through [`traits::armature::Armature`];
//! [`render::Renderer`] walks them once per frame and batches every slot mesh
//! into as few draw calls as texture changes allow.

pub mod armature;
pub mod atlas;
pub mod config;
pub mod model;
pub mod render;
pub mod slot;
pub mod traits;
pub mod util;

pub use armature::{ArmatureConfig, ArmatureDisplay, Factory, StaticArmature, load_armature};
pub use config::RenderConfig;
pub use render::{CommandRecorder, Renderer, WgpuRenderer};
