//! Failure-pattern clustering.
//!
//! Groups the logs matching a filter by embedding proximity and summarizes
//! each group with its size and a short preview of members.

use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::storage::RecordStore;
use crate::types::{Cluster, LogFilter};
use crate::vector::{ClusteringError, KMeansConfig, kmeans_clustering};

/// Default number of member records shown per cluster.
pub const DEFAULT_PREVIEW_SIZE: usize = 5;

/// Upper bound on preview length; larger settings are capped.
pub const MAX_PREVIEW_SIZE: usize = 5;

/// Tunables for [`cluster_failure_patterns`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    pub kmeans: KMeansConfig,
    pub preview_size: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            kmeans: KMeansConfig::default(),
            preview_size: DEFAULT_PREVIEW_SIZE,
        }
    }
}

/// Partition the logs matching `filter` into at most `k_requested` groups.
///
/// With n matching records the effective cluster count is
/// `min(k_requested, n)`. Records are put in id order before clustering, so
/// the output depends only on the set of (id, embedding) pairs, never on
/// the order the store returned them in. Empty clusters are dropped;
/// the rest are returned by ascending label.
///
/// # Errors
/// * `InvalidClusterCount` when `k_requested == 0`
/// * `DimensionMismatch` when the store hands back a malformed embedding
/// * `StoreUnavailable` when the scan fails
pub fn cluster_failure_patterns(
    store: &dyn RecordStore,
    k_requested: usize,
    filter: &LogFilter,
    options: &ClusterOptions,
) -> AnalysisResult<Vec<Cluster>> {
    if k_requested == 0 {
        return Err(AnalysisError::InvalidClusterCount(k_requested));
    }

    let mut records = store.scan_logs(filter)?;
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let dimension = store.dimension();
    for record in &records {
        dimension.validate_vector(&record.embedding)?;
    }

    records.sort_by_key(|r| r.id);
    let k = k_requested.min(records.len().max(1));

    let vectors: Vec<&[f32]> = records.iter().map(|r| r.embedding.as_slice()).collect();
    let result = match kmeans_clustering(&vectors, k, &options.kmeans) {
        Ok(result) => result,
        Err(ClusteringError::EmptyVectorSet) => return Ok(Vec::new()),
        Err(ClusteringError::InvalidClusterCount(k)) => {
            return Err(AnalysisError::InvalidClusterCount(k));
        }
        Err(ClusteringError::DimensionMismatch { expected, actual }) => {
            return Err(AnalysisError::DimensionMismatch { expected, actual });
        }
    };

    // Member indices per label; records are id-ordered so members are too
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (index, &label) in result.assignments.iter().enumerate() {
        members[label].push(index);
    }

    let clusters: Vec<Cluster> = members
        .into_iter()
        .enumerate()
        .filter(|(_, indices)| !indices.is_empty())
        .map(|(label, indices)| Cluster {
            cluster_id: label,
            size: indices.len(),
            preview: indices
                .iter()
                .take(options.preview_size.min(MAX_PREVIEW_SIZE))
                .map(|&i| records[i].clone())
                .collect(),
        })
        .collect();

    debug!(
        k_requested,
        k,
        records = records.len(),
        non_empty = clusters.len(),
        iterations = result.iterations,
        "clustered failure patterns"
    );
    Ok(clusters)
}
