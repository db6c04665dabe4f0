/// The main library module for rootcause
pub mod analysis;
pub mod config;
pub mod error;
pub mod ingest;
pub mod storage;
pub mod types;
pub mod vector;

// Explicit exports for better API clarity
pub use analysis::{
    Analyzer, ClusterOptions, cluster_failure_patterns, correlate_with_deployments,
    find_similar, summarize_matches,
};
pub use config::Settings;
pub use error::{AnalysisError, AnalysisResult};
pub use ingest::{IngestError, IngestResult};
pub use storage::{MemoryStore, RecordStore, StoreError, StoreResult};
pub use types::{
    Cluster, CorrelationPair, DeploymentId, DeploymentRecord, LogFilter, LogId, LogRecord,
    NewDeployment, NewLogRecord, RankedMatch,
};
pub use vector::{EmbeddingError, EmbeddingProvider, ProviderChain, VectorDimension};
