//! Loading logs and deployments into a [`MemoryStore`].
//!
//! Logs arrive as JSON Lines, one event per line:
//!
//! ```text
//! {"timestamp": "2024-05-01T10:00:00", "level": "ERROR", "service": "auth", "message": "db timeout"}
//! ```
//!
//! An optional `embedding` array carries a precomputed vector. Lines
//! without one are embedded through the supplied [`EmbeddingProvider`].
//! Deployments arrive as a single JSON array of
//! `{"service", "version", "deployed_at"}` objects.
//!
//! Timestamps may be RFC 3339 or naive ISO-8601; naive values are UTC.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::storage::{MemoryStore, StoreError};
use crate::types::{NewDeployment, NewLogRecord};
use crate::vector::{EmbeddingError, EmbeddingProvider};

/// Errors raised while ingesting log or deployment files
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON on line {line}: {source}")]
    InvalidLine {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Invalid deployments document: {0}")]
    InvalidDeployments(serde_json::Error),

    #[error("Invalid timestamp '{value}' on line {line}")]
    InvalidTimestamp { line: usize, value: String },

    #[error(
        "Line {line} has no embedding and no provider was given\nSuggestion: Include an \"embedding\" array or configure an embedding provider"
    )]
    MissingEmbedding { line: usize },

    #[error("Embedding failed on line {line}: {source}")]
    Embedding {
        line: usize,
        source: EmbeddingError,
    },

    #[error("Store rejected record on line {line}: {source}")]
    Store { line: usize, source: StoreError },
}

pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Deserialize)]
struct LogLine {
    timestamp: String,
    level: String,
    service: String,
    message: String,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct DeploymentEntry {
    service: String,
    version: String,
    deployed_at: String,
}

/// Parse an RFC 3339 or naive ISO-8601 timestamp. Naive values are UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Ingest JSON Lines log events from `reader`.
///
/// Blank lines are skipped. Returns the number of records stored. Records
/// before a failing line stay stored.
pub fn ingest_logs<R: Read>(
    store: &MemoryStore,
    reader: R,
    provider: Option<&dyn EmbeddingProvider>,
) -> IngestResult<usize> {
    let mut ingested = 0;

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let entry: LogLine = serde_json::from_str(&line).map_err(|source| {
            IngestError::InvalidLine {
                line: line_no,
                source,
            }
        })?;

        let timestamp =
            parse_timestamp(&entry.timestamp).ok_or_else(|| IngestError::InvalidTimestamp {
                line: line_no,
                value: entry.timestamp.clone(),
            })?;

        let embedding = match (entry.embedding, provider) {
            (Some(embedding), _) => embedding,
            (None, Some(provider)) => provider.embed(&entry.message).map_err(|source| {
                IngestError::Embedding {
                    line: line_no,
                    source,
                }
            })?,
            (None, None) => return Err(IngestError::MissingEmbedding { line: line_no }),
        };

        let id = store
            .insert_log(NewLogRecord {
                timestamp,
                level: entry.level,
                service: entry.service,
                message: entry.message,
                embedding,
            })
            .map_err(|source| IngestError::Store {
                line: line_no,
                source,
            })?;
        debug!(%id, line = line_no, "log ingested");
        ingested += 1;
    }

    info!(ingested, "log ingestion complete");
    Ok(ingested)
}

/// Ingest a JSON array of deployments from `reader`.
pub fn ingest_deployments<R: Read>(store: &MemoryStore, reader: R) -> IngestResult<usize> {
    let entries: Vec<DeploymentEntry> =
        serde_json::from_reader(reader).map_err(IngestError::InvalidDeployments)?;

    let total = entries.len();
    for (index, entry) in entries.into_iter().enumerate() {
        let line = index + 1;
        let deployed_at =
            parse_timestamp(&entry.deployed_at).ok_or_else(|| IngestError::InvalidTimestamp {
                line,
                value: entry.deployed_at.clone(),
            })?;

        store
            .insert_deployment(NewDeployment {
                service: entry.service,
                version: entry.version,
                deployed_at,
            })
            .map_err(|source| IngestError::Store { line, source })?;
    }

    info!(ingested = total, "deployment ingestion complete");
    Ok(total)
}

/// Ingest a JSON Lines log file.
pub fn ingest_logs_file(
    store: &MemoryStore,
    path: impl AsRef<Path>,
    provider: Option<&dyn EmbeddingProvider>,
) -> IngestResult<usize> {
    let file = open(path.as_ref())?;
    ingest_logs(store, file, provider)
}

/// Ingest a JSON deployments file.
pub fn ingest_deployments_file(store: &MemoryStore, path: impl AsRef<Path>) -> IngestResult<usize> {
    let file = open(path.as_ref())?;
    ingest_deployments(store, file)
}

fn open(path: &Path) -> IngestResult<File> {
    File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
