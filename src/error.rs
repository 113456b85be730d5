//! Error Types - One enum for the whole conversion path

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    /// A collaborator needed for array input is not installed.
    #[error("{0} is required {1}")]
    MissingDependency(&'static str, &'static str),

    #[error("Expected an image object, but got {0} instead")]
    UnsupportedType(String),

    #[error("Invalid array: {0}")]
    InvalidArray(String),

    #[error("Encoding error: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<image::ImageError> for ImageError {
    fn from(e: image::ImageError) -> Self {
        ImageError::Encode(e.to_string())
    }
}

impl From<ndarray::ShapeError> for ImageError {
    fn from(e: ndarray::ShapeError) -> Self {
        ImageError::InvalidArray(e.to_string())
    }
}
