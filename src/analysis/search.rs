//! Similarity search over embedded log records.

use std::num::NonZeroUsize;

use tracing::debug;

use crate::error::AnalysisResult;
use crate::storage::RecordStore;
use crate::types::{LogFilter, RankedMatch};

/// Find the `top_k` stored logs closest to `query` among those matching
/// `filter`.
///
/// Results are ordered by cosine distance ascending, ties by ascending id.
/// Fewer matching records than `top_k` yields all of them.
///
/// # Errors
/// * `DimensionMismatch` if `query` or a stored embedding does not have the
///   store dimension
/// * `StoreUnavailable` if the store fails; not retried here
pub fn find_similar(
    store: &dyn RecordStore,
    query: &[f32],
    filter: &LogFilter,
    top_k: NonZeroUsize,
) -> AnalysisResult<Vec<RankedMatch>> {
    store.dimension().validate_vector(query)?;

    let matches = store.rank_logs(query, filter, top_k)?;
    debug!(
        top_k = top_k.get(),
        returned = matches.len(),
        filtered = !filter.is_unconstrained(),
        "similarity search"
    );
    Ok(matches)
}
