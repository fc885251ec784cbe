//! Texture atlas metadata and its JSON description.

pub mod error;
pub mod parser;
pub mod texture_data;

pub use error::AtlasError;
pub use parser::{load_texture_atlas, parse_texture_atlas};
pub use texture_data::{AtlasRegion, Rect, TextureAtlasData, TextureData};
