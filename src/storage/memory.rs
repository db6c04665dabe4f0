use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use super::{RecordStore, StoreError, StoreResult};
use crate::types::{
    DeploymentId, DeploymentRecord, LogFilter, LogId, LogRecord, NewDeployment, NewLogRecord,
};
use crate::vector::VectorDimension;

/// In-memory record store.
///
/// Ids are assigned monotonically starting at 1. Scans return records in
/// id order. Cloning shares the underlying maps.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    logs: Arc<DashMap<LogId, LogRecord>>,
    deployments: Arc<DashMap<DeploymentId, DeploymentRecord>>,
    next_log_id: Arc<AtomicU32>,
    next_deployment_id: Arc<AtomicU32>,
    dimension: VectorDimension,
}

impl MemoryStore {
    pub fn new(dimension: VectorDimension) -> Self {
        Self {
            logs: Arc::new(DashMap::new()),
            deployments: Arc::new(DashMap::new()),
            next_log_id: Arc::new(AtomicU32::new(1)),
            next_deployment_id: Arc::new(AtomicU32::new(1)),
            dimension,
        }
    }

    /// Store a log record and return its id.
    ///
    /// Rejects embeddings whose length differs from the store dimension.
    pub fn insert_log(&self, log: NewLogRecord) -> StoreResult<LogId> {
        self.dimension.validate_vector(&log.embedding)?;

        let id = LogId::new(self.next_log_id.fetch_add(1, Ordering::SeqCst))
            .ok_or_else(|| StoreError::unavailable("log id space exhausted"))?;
        self.logs.insert(id, log.into_record(id));
        Ok(id)
    }

    pub fn insert_deployment(&self, deployment: NewDeployment) -> StoreResult<DeploymentId> {
        let id = DeploymentId::new(self.next_deployment_id.fetch_add(1, Ordering::SeqCst))
            .ok_or_else(|| StoreError::unavailable("deployment id space exhausted"))?;
        self.deployments.insert(id, deployment.into_record(id));
        Ok(id)
    }

    pub fn get_log(&self, id: LogId) -> Option<LogRecord> {
        self.logs.get(&id).map(|entry| entry.clone())
    }

    pub fn log_count(&self) -> usize {
        self.logs.len()
    }

    pub fn deployment_count(&self) -> usize {
        self.deployments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty() && self.deployments.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(VectorDimension::default())
    }
}

impl RecordStore for MemoryStore {
    fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    fn scan_logs(&self, filter: &LogFilter) -> StoreResult<Vec<LogRecord>> {
        let mut records: Vec<LogRecord> = self
            .logs
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    fn scan_deployments(&self, service: &str) -> StoreResult<Vec<DeploymentRecord>> {
        let mut records: Vec<DeploymentRecord> = self
            .deployments
            .iter()
            .filter(|entry| entry.service == service)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|d| d.id);
        Ok(records)
    }
}
