use thiserror::Error;

use crate::vector::VectorError;

/// Failures reported by a record store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

impl From<VectorError> for StoreError {
    fn from(e: VectorError) -> Self {
        match e {
            VectorError::DimensionMismatch { expected, actual } => {
                Self::DimensionMismatch { expected, actual }
            }
            other => Self::unavailable(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
