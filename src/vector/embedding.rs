//! Embedding provider interface.
//!
//! The analysis core never generates embeddings. A host turns free text
//! into a query vector through an injected [`EmbeddingProvider`] before
//! calling search, and ingestion uses the same trait for messages that
//! arrive without a precomputed vector.
//!
//! Several providers (remote APIs, local models) can be tried in order
//! with [`ProviderChain`]. Each provider is an explicitly constructed
//! object owned by the host; there is no global model state.

use thiserror::Error;
use tracing::debug;

use crate::vector::VectorDimension;

/// Errors raised while producing an embedding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error("Embedding provider '{provider}' failed: {reason}")]
    ProviderFailed { provider: String, reason: String },

    #[error(
        "No embedding provider available\nSuggestion: Configure at least one provider before embedding text"
    )]
    NoProviders,

    #[error("All embedding providers failed: {}", .failures.join("; "))]
    AllProvidersFailed { failures: Vec<String> },
}

/// Trait for turning text into an embedding vector.
///
/// Implementations should be thread-safe; the same provider is shared by
/// every caller of the host layer.
pub trait EmbeddingProvider: Send + Sync {
    /// Short name used in logs and combined error messages.
    fn name(&self) -> &str;

    /// Embed a single text. The returned length may differ from the store
    /// dimension; [`ProviderChain`] fits it.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Ordered list of providers tried in sequence until one succeeds.
pub struct ProviderChain {
    providers: Vec<Box<dyn EmbeddingProvider>>,
    dimension: VectorDimension,
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl ProviderChain {
    /// Create an empty chain producing vectors of `dimension`.
    #[must_use]
    pub fn new(dimension: VectorDimension) -> Self {
        Self {
            providers: Vec::new(),
            dimension,
        }
    }

    /// Append a provider; earlier providers take precedence.
    #[must_use]
    pub fn with_provider(mut self, provider: impl EmbeddingProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }
}

impl EmbeddingProvider for ProviderChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.providers.is_empty() {
            return Err(EmbeddingError::NoProviders);
        }

        let mut failures = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            match provider.embed(text) {
                Ok(vector) => {
                    debug!(provider = provider.name(), len = vector.len(), "embedding produced");
                    return Ok(fit_to_dimension(vector, self.dimension));
                }
                Err(e) => {
                    debug!(provider = provider.name(), error = %e, "embedding provider failed, trying next");
                    failures.push(format!("{}: {e}", provider.name()));
                }
            }
        }

        Err(EmbeddingError::AllProvidersFailed { failures })
    }
}

/// Zero-pad or truncate a vector to `dimension`.
///
/// Smaller local models (e.g. 384 dimensions) are padded so they fit a
/// 1536-dimensional store.
pub fn fit_to_dimension(mut vector: Vec<f32>, dimension: VectorDimension) -> Vec<f32> {
    vector.resize(dimension.get(), 0.0);
    vector
}
