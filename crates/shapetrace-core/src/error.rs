//! Error types for mask construction and configuration loading.

use thiserror::Error;

/// Errors raised while building a [`ShapeMask`](crate::mask::ShapeMask).
#[derive(Debug, Error)]
pub enum MaskError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Pixel buffer has {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Result type for mask operations.
pub type MaskResult<T> = Result<T, MaskError>;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Shape '{name}' has required coverage {value}, expected a value in [0, 1]")]
    InvalidCoverage { name: String, value: f64 },
    #[error("{name} is {value}, expected a non-negative radius")]
    InvalidRadius { name: &'static str, value: f64 },
    #[error("Configuration contains no shapes")]
    NoShapes,
    #[error("End shape index {0} is out of range")]
    InvalidEndShape(usize),
    #[error("Viewport {width}x{height} must have positive dimensions")]
    InvalidViewport { width: f64, height: f64 },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
