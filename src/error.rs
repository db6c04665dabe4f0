//! Error types for the analysis engine
//!
//! Every operation is read-only, so a failed call has nothing to roll back.
//! Errors are surfaced verbatim; the engine performs no retries and no
//! fallback substitution.

use thiserror::Error;

use crate::storage::StoreError;
use crate::vector::VectorError;

/// Main error type for search, clustering and correlation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Query or stored vector has the wrong length (caller bug)
    #[error(
        "Vector dimension mismatch: expected {expected}, got {actual}\nSuggestion: Pad or truncate provider output to the store dimension before searching"
    )]
    DimensionMismatch { expected: usize, actual: usize },

    /// Clustering was asked for zero clusters (caller bug)
    #[error("Invalid cluster count: {0}\nSuggestion: Request at least one cluster")]
    InvalidClusterCount(usize),

    /// The record store failed; safe to retry with backoff
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AnalysisError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that a host layer can map onto its own
    /// wire protocol.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::InvalidClusterCount(_) => "INVALID_CLUSTER_COUNT",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Whether the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<StoreError> for AnalysisError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DimensionMismatch { expected, actual } => {
                Self::DimensionMismatch { expected, actual }
            }
            StoreError::Unavailable { reason } => Self::StoreUnavailable(reason),
        }
    }
}

impl From<VectorError> for AnalysisError {
    fn from(e: VectorError) -> Self {
        StoreError::from(e).into()
    }
}

/// Result type alias for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
