//! Error types for occupancy grid operations

use thiserror::Error;

/// Main error type for occupancy grid operations
#[derive(Error, Debug)]
pub enum OccupancyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Index out of range: {index} not in [0, {len})")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Specialized Result type for occupancy grid operations
pub type Result<T> = std::result::Result<T, OccupancyError>;

impl From<serde_json::Error> for OccupancyError {
    fn from(err: serde_json::Error) -> Self {
        OccupancyError::Serialization(err.to_string())
    }
}

impl From<ndarray_npy::ReadNpzError> for OccupancyError {
    fn from(err: ndarray_npy::ReadNpzError) -> Self {
        OccupancyError::Archive(err.to_string())
    }
}

impl From<ndarray::ShapeError> for OccupancyError {
    fn from(err: ndarray::ShapeError) -> Self {
        OccupancyError::InvalidDimensions(err.to_string())
    }
}
