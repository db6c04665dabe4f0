//! Fixtures shared by the integration tests

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rootcause::storage::{RecordStore, StoreError, StoreResult};
use rootcause::{
    DeploymentRecord, LogFilter, LogId, LogRecord, MemoryStore, NewDeployment, NewLogRecord,
    VectorDimension,
};

pub const DIM: usize = 1536;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

pub fn at(offset_secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(offset_secs)
}

/// Unit vector along `axis`
pub fn basis(axis: usize) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    v[axis] = 1.0;
    v
}

/// Vector near `basis(axis)` with seeded jitter on a handful of other axes
pub fn near(axis: usize, rng: &mut StdRng) -> Vec<f32> {
    let mut v = basis(axis);
    for _ in 0..4 {
        let i = rng.random_range(0..DIM);
        v[i] += rng.random_range(-0.05..0.05);
    }
    v
}

/// Index of the largest component
pub fn dominant_axis(v: &[f32]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub fn new_log(
    level: &str,
    service: &str,
    offset_secs: i64,
    message: &str,
    embedding: Vec<f32>,
) -> NewLogRecord {
    NewLogRecord {
        timestamp: at(offset_secs),
        level: level.to_string(),
        service: service.to_string(),
        message: message.to_string(),
        embedding,
    }
}

pub fn new_deployment(service: &str, version: &str, offset_secs: i64) -> NewDeployment {
    NewDeployment {
        service: service.to_string(),
        version: version.to_string(),
        deployed_at: at(offset_secs),
    }
}

pub fn empty_store() -> MemoryStore {
    MemoryStore::new(VectorDimension::embedding_default())
}

/// A store of `count` logs spread over three failure modes, three services
/// and two levels, with every fifth embedding duplicated to force ties.
pub fn populated_store(count: usize, seed: u64) -> MemoryStore {
    let store = empty_store();
    let mut rng = StdRng::seed_from_u64(seed);
    let services = ["auth", "billing", "search"];
    let levels = ["ERROR", "WARN"];
    let mut previous: Option<Vec<f32>> = None;

    for i in 0..count {
        let embedding = match (&previous, i % 5) {
            (Some(prev), 0) => prev.clone(),
            _ => near(i % 3, &mut rng),
        };
        previous = Some(embedding.clone());
        store
            .insert_log(new_log(
                levels[i % 2],
                services[(i / 2) % 3],
                i as i64 * 30,
                &format!("event {i}"),
                embedding,
            ))
            .unwrap();
    }
    store
}

/// Store serving a fixed record set in whatever order it was built with
pub struct FixedOrderStore {
    pub logs: Vec<LogRecord>,
    pub deployments: Vec<DeploymentRecord>,
}

impl RecordStore for FixedOrderStore {
    fn dimension(&self) -> VectorDimension {
        VectorDimension::embedding_default()
    }

    fn scan_logs(&self, filter: &LogFilter) -> StoreResult<Vec<LogRecord>> {
        Ok(self
            .logs
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn scan_deployments(&self, service: &str) -> StoreResult<Vec<DeploymentRecord>> {
        Ok(self
            .deployments
            .iter()
            .filter(|d| d.service == service)
            .cloned()
            .collect())
    }
}

/// Store whose backend is down; counts how often it was asked
#[derive(Default)]
pub struct UnavailableStore {
    pub calls: Mutex<usize>,
}

impl UnavailableStore {
    fn fail<T>(&self) -> StoreResult<T> {
        *self.calls.lock().unwrap() += 1;
        Err(StoreError::unavailable("connection refused"))
    }
}

impl RecordStore for UnavailableStore {
    fn dimension(&self) -> VectorDimension {
        VectorDimension::embedding_default()
    }

    fn scan_logs(&self, _filter: &LogFilter) -> StoreResult<Vec<LogRecord>> {
        self.fail()
    }

    fn scan_deployments(&self, _service: &str) -> StoreResult<Vec<DeploymentRecord>> {
        self.fail()
    }
}

/// Store that hands back a record with a truncated embedding
pub struct CorruptStore {
    pub record: LogRecord,
}

impl CorruptStore {
    pub fn new() -> Self {
        Self {
            record: LogRecord {
                id: LogId::new(1).unwrap(),
                timestamp: t0(),
                level: "ERROR".to_string(),
                service: "auth".to_string(),
                message: "db timeout".to_string(),
                embedding: vec![1.0; 8],
            },
        }
    }
}

impl RecordStore for CorruptStore {
    fn dimension(&self) -> VectorDimension {
        VectorDimension::embedding_default()
    }

    fn scan_logs(&self, _filter: &LogFilter) -> StoreResult<Vec<LogRecord>> {
        Ok(vec![self.record.clone()])
    }

    fn scan_deployments(&self, _service: &str) -> StoreResult<Vec<DeploymentRecord>> {
        Ok(Vec::new())
    }
}
