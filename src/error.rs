//! Error types for the regression engine

use thiserror::Error;

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, RegressionError>;

#[derive(Error, Debug)]
pub enum RegressionError {
    /// Malformed training or evaluation data. Raised before any training happens.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Shape mismatch in {op}: left has shape {left:?}, right has shape {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    #[error("Index {index:?} is out of bounds for shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl RegressionError {
    pub(crate) fn shape_mismatch(op: &'static str, left: &[usize], right: &[usize]) -> Self {
        RegressionError::ShapeMismatch {
            op,
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }
}
