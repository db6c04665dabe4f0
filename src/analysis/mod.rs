//! The analysis engine: similarity search, failure-pattern clustering and
//! deployment correlation over a shared [`RecordStore`].
//!
//! All three operations are read-only and stateless, so one [`Analyzer`]
//! can serve any number of concurrent callers without locking. Timeouts
//! and retries belong to the caller.

mod correlation;
mod patterns;
mod search;
mod summary;

pub use correlation::{
    DEFAULT_CORRELATION_LIMIT, MAX_CORRELATION_LIMIT, correlate_with_deployments,
};
pub use patterns::{
    ClusterOptions, DEFAULT_PREVIEW_SIZE, MAX_PREVIEW_SIZE, cluster_failure_patterns,
};
pub use search::find_similar;
pub use summary::summarize_matches;

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::AnalysisResult;
use crate::storage::RecordStore;
use crate::types::{Cluster, CorrelationPair, LogFilter, RankedMatch};

/// Entry point bundling a record store with analysis settings.
#[derive(Clone)]
pub struct Analyzer {
    store: Arc<dyn RecordStore>,
    cluster_options: ClusterOptions,
    correlation_limit: usize,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("store", &"<dyn RecordStore>")
            .field("dimension", &self.store.dimension())
            .field("cluster_options", &self.cluster_options)
            .field("correlation_limit", &self.correlation_limit)
            .finish()
    }
}

impl Analyzer {
    /// Create an analyzer with default clustering and correlation settings.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            cluster_options: ClusterOptions::default(),
            correlation_limit: DEFAULT_CORRELATION_LIMIT,
        }
    }

    /// Create an analyzer configured from loaded settings.
    pub fn with_settings(store: Arc<dyn RecordStore>, settings: &Settings) -> Self {
        Self {
            store,
            cluster_options: settings.clustering.options(),
            correlation_limit: settings.correlation.effective_limit(),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn cluster_options(&self) -> &ClusterOptions {
        &self.cluster_options
    }

    pub fn correlation_limit(&self) -> usize {
        self.correlation_limit
    }

    /// Rank stored logs against a query vector. See [`find_similar`].
    pub fn search(
        &self,
        query: &[f32],
        filter: &LogFilter,
        top_k: NonZeroUsize,
    ) -> AnalysisResult<Vec<RankedMatch>> {
        find_similar(self.store.as_ref(), query, filter, top_k)
    }

    /// Group matching logs into failure patterns. See [`cluster_failure_patterns`].
    pub fn cluster(&self, k_requested: usize, filter: &LogFilter) -> AnalysisResult<Vec<Cluster>> {
        cluster_failure_patterns(self.store.as_ref(), k_requested, filter, &self.cluster_options)
    }

    /// Pair deployments with subsequent logs. See [`correlate_with_deployments`].
    pub fn correlate(&self, service: &str) -> AnalysisResult<Vec<CorrelationPair>> {
        correlate_with_deployments(self.store.as_ref(), service, self.correlation_limit)
    }
}
