//! Pose-facing data model: matrices, mesh geometry and display frames.

pub mod display;
pub mod geometry;
pub mod matrix;

pub use display::{ColorTransform, DisplayData, DisplayFrame};
pub use geometry::{BoneInfluence, Geometry, GeometryError, WeightTable};
pub use matrix::Matrix;
