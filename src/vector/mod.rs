//! Vector primitives for log embeddings.
//!
//! Distance functions, the deterministic K-means used for failure-pattern
//! clustering, and the embedding provider interface.

mod clustering;
mod distance;
mod embedding;
mod types;

// Re-export core types for public API
pub use clustering::{
    ClusteringError, DEFAULT_MAX_ITERATIONS, DEFAULT_N_INIT, DEFAULT_SEED, DEFAULT_TOLERANCE,
    KMeansConfig, KMeansResult, assign_to_nearest_centroid, kmeans_clustering,
};
pub use distance::{cosine_distance, cosine_similarity, squared_euclidean};
#[cfg(test)]
pub(crate) use embedding::testing;
pub use embedding::{EmbeddingError, EmbeddingProvider, ProviderChain, fit_to_dimension};
pub use types::{EMBEDDING_DIMENSION, VectorDimension, VectorError};
