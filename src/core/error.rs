//! Error types for kernel evaluation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Shape mismatch: expected {expected} dimensions, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Diagonal evaluation requires equal batch sizes, got {n1} and {n2}")]
    DiagonalMismatch { n1: usize, n2: usize },

    #[error("Batch mismatch: expected {expected} batches, got {actual}")]
    BatchMismatch { expected: usize, actual: usize },

    #[error("Category index {value} out of range for dimension {dim} with {categories} categories")]
    CategoryOutOfRange {
        dim: usize,
        value: usize,
        categories: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl KernelError {
    /// True for every error that reports incompatible input shapes
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            KernelError::ShapeMismatch { .. }
                | KernelError::DiagonalMismatch { .. }
                | KernelError::BatchMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, KernelError>;
