//! Error types for the simulation core

use thiserror::Error;

/// Result type for fallible core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by construction-time misuse or generator bugs
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(
        "invalid viewport: half extents must be positive and finite, got {half_width}x{half_height}"
    )]
    InvalidViewport { half_width: f32, half_height: f32 },

    #[error("path sample {index} is not finite")]
    NonFiniteSample { index: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
