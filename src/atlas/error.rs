use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("failed to read texture atlas: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse texture atlas JSON")]
    Parse(#[from] serde_json::Error),

    #[error("sub-texture {name:?} has negative size {width}x{height}")]
    InvalidRegion { name: String, width: f32, height: f32 },

    #[error("duplicate sub-texture name: {0}")]
    DuplicateName(String),

    #[error("failed to decode atlas image: {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
