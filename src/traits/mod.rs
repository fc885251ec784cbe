pub mod armature;
pub mod render;
