//! Files on disk through ingestion into the analyzer

use std::io::Write;
use std::sync::Arc;

use rootcause::ingest::{IngestError, ingest_deployments_file, ingest_logs, ingest_logs_file};
use rootcause::vector::{EmbeddingError, EmbeddingProvider, ProviderChain};
use rootcause::{Analyzer, LogFilter, MemoryStore, VectorDimension, summarize_matches};
use serde_json::json;
use tempfile::NamedTempFile;

use crate::support::{DIM, basis};

/// Maps a few failure keywords onto fixed axes
struct KeywordEmbedder;

impl EmbeddingProvider for KeywordEmbedder {
    fn name(&self) -> &str {
        "keywords"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut v = vec![0.0; 4];
        for (axis, keyword) in ["timeout", "heartbeat", "declined"].iter().enumerate() {
            if text.contains(keyword) {
                v[axis] = 1.0;
            }
        }
        v[3] = 0.01;
        Ok(v)
    }
}

struct Offline;

impl EmbeddingProvider for Offline {
    fn name(&self) -> &str {
        "offline"
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::ProviderFailed {
            provider: "offline".to_string(),
            reason: "no network".to_string(),
        })
    }
}

fn write_lines(lines: &[serde_json::Value]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

#[test]
fn test_files_to_correlation_and_search() {
    let logs = write_lines(&[
        json!({"timestamp": "2024-05-01T10:00:00", "level": "ERROR", "service": "auth", "message": "db timeout", "embedding": basis(0)}),
        json!({"timestamp": "2024-05-01T10:00:01", "level": "INFO", "service": "auth", "message": "heartbeat ok", "embedding": basis(1)}),
        json!({"timestamp": "2024-05-01T09:00:00Z", "level": "ERROR", "service": "billing", "message": "card declined", "embedding": basis(2)}),
    ]);
    let mut deployments = NamedTempFile::new().unwrap();
    write!(
        deployments,
        "{}",
        json!([{"service": "auth", "version": "1.4.2", "deployed_at": "2024-05-01T10:00:00"}])
    )
    .unwrap();

    let store = MemoryStore::new(VectorDimension::embedding_default());
    assert_eq!(ingest_logs_file(&store, logs.path(), None).unwrap(), 3);
    assert_eq!(
        ingest_deployments_file(&store, deployments.path()).unwrap(),
        1
    );

    let analyzer = Analyzer::new(Arc::new(store));

    let pairs = analyzer.correlate("auth").unwrap();
    let messages: Vec<&str> = pairs.iter().map(|p| p.log.message.as_str()).collect();
    assert_eq!(messages, vec!["heartbeat ok", "db timeout"]);

    let top_k = std::num::NonZeroUsize::new(2).unwrap();
    let matches = analyzer
        .search(&basis(0), &LogFilter::new().with_level("ERROR"), top_k)
        .unwrap();
    assert_eq!(matches[0].record.message, "db timeout");
    assert_eq!(matches[0].distance, 0.0);
    assert_eq!(matches[1].record.service, "billing");

    let summary = summarize_matches(&matches);
    assert!(summary.contains("Affected services: auth, billing."));
}

#[test]
fn test_provider_chain_falls_back_and_pads() {
    let chain = ProviderChain::new(VectorDimension::embedding_default())
        .with_provider(Offline)
        .with_provider(KeywordEmbedder);
    let store = MemoryStore::new(VectorDimension::embedding_default());

    let input = [
        json!({"timestamp": "2024-05-01T10:00:00", "level": "ERROR", "service": "auth", "message": "db timeout"}),
        json!({"timestamp": "2024-05-01T10:00:05", "level": "ERROR", "service": "auth", "message": "upstream timeout"}),
        json!({"timestamp": "2024-05-01T10:00:09", "level": "INFO", "service": "auth", "message": "heartbeat ok"}),
    ]
    .iter()
    .map(|v| v.to_string())
    .collect::<Vec<_>>()
    .join("\n");

    assert_eq!(ingest_logs(&store, input.as_bytes(), Some(&chain)).unwrap(), 3);

    let records = store.get_log(rootcause::LogId::new(1).unwrap()).unwrap();
    assert_eq!(records.embedding.len(), DIM);
    assert_eq!(records.embedding[0], 1.0);

    let clusters = Analyzer::new(Arc::new(store))
        .cluster(2, &LogFilter::new())
        .unwrap();
    let mut sizes: Vec<usize> = clusters.iter().map(|c| c.size).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![1, 2]);
}

#[test]
fn test_exhausted_chain_reports_every_failure() {
    let chain = ProviderChain::new(VectorDimension::embedding_default())
        .with_provider(Offline)
        .with_provider(Offline);
    let store = MemoryStore::new(VectorDimension::embedding_default());
    let input = json!({"timestamp": "2024-05-01T10:00:00", "level": "ERROR", "service": "auth", "message": "db timeout"}).to_string();

    match ingest_logs(&store, input.as_bytes(), Some(&chain)) {
        Err(IngestError::Embedding {
            line: 1,
            source: EmbeddingError::AllProvidersFailed { failures },
        }) => assert_eq!(failures.len(), 2),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(store.is_empty());
}
