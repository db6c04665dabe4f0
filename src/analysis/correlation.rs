//! Deployment correlation.
//!
//! Joins each deployment of a service with every log of that service that
//! happened at or after it. The join is many-to-many: a log following two
//! deployments is reported once per deployment.

use std::cmp::Reverse;

use tracing::debug;

use crate::error::AnalysisResult;
use crate::storage::RecordStore;
use crate::types::{CorrelationPair, LogFilter};

/// Default cap on returned pairs.
pub const DEFAULT_CORRELATION_LIMIT: usize = 20;

/// Hard cap on returned pairs; larger limits are lowered to it.
pub const MAX_CORRELATION_LIMIT: usize = 20;

/// Correlate deployments of `service` with the logs that follow them.
///
/// Pairs are ordered by log timestamp descending (ties: log id descending,
/// then deployment id ascending) and truncated to `limit` (at most
/// [`MAX_CORRELATION_LIMIT`]) after the full join. An unknown service
/// yields an empty result.
pub fn correlate_with_deployments(
    store: &dyn RecordStore,
    service: &str,
    limit: usize,
) -> AnalysisResult<Vec<CorrelationPair>> {
    let deployments = store.scan_deployments(service)?;
    if deployments.is_empty() {
        debug!(service, "no deployments to correlate");
        return Ok(Vec::new());
    }

    let logs = store.scan_logs(&LogFilter::new().with_service(service))?;

    // Join on indices first; only the surviving pairs are cloned
    let mut joined: Vec<(usize, usize)> = Vec::new();
    for (d, deployment) in deployments.iter().enumerate() {
        for (l, log) in logs.iter().enumerate() {
            if log.service == deployment.service && log.timestamp >= deployment.deployed_at {
                joined.push((d, l));
            }
        }
    }
    let total = joined.len();

    joined.sort_by_key(|&(d, l)| {
        (
            Reverse(logs[l].timestamp),
            Reverse(logs[l].id),
            deployments[d].id,
        )
    });
    joined.truncate(limit.min(MAX_CORRELATION_LIMIT));

    debug!(
        service,
        deployments = deployments.len(),
        logs = logs.len(),
        joined = total,
        returned = joined.len(),
        "correlated deployments"
    );

    Ok(joined
        .into_iter()
        .map(|(d, l)| CorrelationPair {
            deployment: deployments[d].clone(),
            log: logs[l].clone(),
        })
        .collect())
}
