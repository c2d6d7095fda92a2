//! Error types for the studs-core library.

use thiserror::Error;

/// Main error type for the studs library.
#[derive(Error, Debug)]
pub enum StudsError {
    /// Geometry / orientation error.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Entity extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// A recognition pass could not be produced.
    #[error("recognition error: {0}")]
    Recognition(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to pass geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The pass was tagged with a rotation other than 0, 90 or 270 degrees.
    #[error("unsupported rotation: {0} degrees (expected 0, 90 or 270)")]
    UnsupportedRotation(i32),
}

/// Errors related to beam/count extraction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// Captured digits do not fit the count domain.
    #[error("count value overflows: {0}")]
    CountOverflow(String),

    /// Count range bounds are inverted.
    #[error("invalid count range: min {min} > max {max}")]
    InvalidRange { min: u32, max: u32 },

    /// A distance setting is negative or not finite.
    #[error("invalid {name}: {value}")]
    InvalidDistance { name: &'static str, value: f32 },
}

/// Result type for the studs library.
pub type Result<T> = std::result::Result<T, StudsError>;
