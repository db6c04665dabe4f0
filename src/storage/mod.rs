//! Record store abstraction shared by search, clustering and correlation.
//!
//! Records are logically immutable; the analysis core only reads. Snapshot
//! consistency between concurrent reads and appends is the store's concern.

mod error;
mod memory;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

use std::num::NonZeroUsize;

use crate::types::{DeploymentRecord, LogFilter, LogRecord, RankedMatch};
use crate::vector::{VectorDimension, cosine_distance};

/// Read access to stored logs and deployments.
///
/// Implementations must be safe to share between threads; every method
/// takes `&self` and may be called concurrently.
pub trait RecordStore: Send + Sync {
    /// Dimension of every embedding this store returns.
    fn dimension(&self) -> VectorDimension;

    /// All log records matching `filter`.
    fn scan_logs(&self, filter: &LogFilter) -> StoreResult<Vec<LogRecord>>;

    /// The `top_k` records matching `filter` closest to `query` by cosine
    /// distance, in ranking order.
    ///
    /// The default scans then ranks. Stores with a vector index may push
    /// the ranking down as long as the ordering is the same.
    fn rank_logs(
        &self,
        query: &[f32],
        filter: &LogFilter,
        top_k: NonZeroUsize,
    ) -> StoreResult<Vec<RankedMatch>> {
        let dimension = self.dimension();
        dimension.validate_vector(query)?;
        let records = self.scan_logs(filter)?;
        for record in &records {
            dimension.validate_vector(&record.embedding)?;
        }
        Ok(rank_by_cosine(query, records, top_k))
    }

    /// All deployments of `service`.
    fn scan_deployments(&self, service: &str) -> StoreResult<Vec<DeploymentRecord>>;
}

/// Rank records by cosine distance to `query` and keep the best `top_k`.
///
/// Ties on distance are broken by ascending id, so the output is fully
/// determined by the set of records.
pub fn rank_by_cosine(
    query: &[f32],
    records: Vec<LogRecord>,
    top_k: NonZeroUsize,
) -> Vec<RankedMatch> {
    let top_k = top_k.get();
    let mut matches: Vec<RankedMatch> = records
        .into_iter()
        .map(|record| {
            let distance = cosine_distance(query, &record.embedding);
            RankedMatch { record, distance }
        })
        .collect();

    if matches.len() > top_k {
        matches.select_nth_unstable_by(top_k - 1, RankedMatch::rank_cmp);
        matches.truncate(top_k);
    }
    matches.sort_by(RankedMatch::rank_cmp);
    matches
}
