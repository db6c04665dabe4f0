mod filter;

pub use filter::LogFilter;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::num::NonZeroU32;

/// Store-assigned identifier of a log record. Ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogId(NonZeroU32);

/// Store-assigned identifier of a deployment record. Ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeploymentId(NonZeroU32);

impl LogId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(&self) -> u32 {
        self.0.get()
    }
}

impl DeploymentId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(&self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for LogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored log event with its message embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: LogId,
    pub timestamp: DateTime<Utc>,
    /// Free-form severity, e.g. ERROR, WARN, INFO
    pub level: String,
    pub service: String,
    pub message: String,
    pub embedding: Vec<f32>,
}

/// A log event before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub service: String,
    pub message: String,
    pub embedding: Vec<f32>,
}

impl NewLogRecord {
    pub(crate) fn into_record(self, id: LogId) -> LogRecord {
        LogRecord {
            id,
            timestamp: self.timestamp,
            level: self.level,
            service: self.service,
            message: self.message,
            embedding: self.embedding,
        }
    }
}

/// A release of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: DeploymentId,
    pub service: String,
    pub version: String,
    pub deployed_at: DateTime<Utc>,
}

/// A deployment before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeployment {
    pub service: String,
    pub version: String,
    pub deployed_at: DateTime<Utc>,
}

impl NewDeployment {
    pub(crate) fn into_record(self, id: DeploymentId) -> DeploymentRecord {
        DeploymentRecord {
            id,
            service: self.service,
            version: self.version,
            deployed_at: self.deployed_at,
        }
    }
}

/// A log record paired with its distance to a query vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub record: LogRecord,
    /// Cosine distance, always >= 0
    pub distance: f32,
}

impl RankedMatch {
    /// Ranking order: distance ascending, then id ascending.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.record.id.cmp(&other.record.id))
    }
}

/// One failure pattern produced by clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// K-means label in `0..k`
    pub cluster_id: usize,
    /// Exact member count
    pub size: usize,
    /// Up to five members, lowest ids first
    pub preview: Vec<LogRecord>,
}

/// A log that happened at or after a deployment of the same service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub deployment: DeploymentRecord,
    pub log: LogRecord,
}
