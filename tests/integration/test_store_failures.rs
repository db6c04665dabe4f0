//! Store faults and concurrent callers

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

use rootcause::{AnalysisError, Analyzer, LogFilter};

use crate::support::{CorruptStore, DIM, UnavailableStore, basis, populated_store};

#[test]
fn test_unavailable_store_surfaces_without_retry() {
    let store = Arc::new(UnavailableStore::default());
    let analyzer = Analyzer::new(store.clone());
    let top_k = NonZeroUsize::new(3).unwrap();

    let errors = [
        analyzer
            .search(&basis(0), &LogFilter::new(), top_k)
            .unwrap_err(),
        analyzer.cluster(2, &LogFilter::new()).unwrap_err(),
        analyzer.correlate("auth").unwrap_err(),
    ];

    for err in &errors {
        assert_eq!(
            err,
            &AnalysisError::StoreUnavailable("connection refused".to_string())
        );
        assert_eq!(err.status_code(), "STORE_UNAVAILABLE");
        assert!(err.is_retryable());
    }
    // One store call per operation: nothing was retried
    assert_eq!(*store.calls.lock().unwrap(), 3);
}

#[test]
fn test_malformed_stored_embedding_is_a_dimension_error() {
    let analyzer = Analyzer::new(Arc::new(CorruptStore::new()));
    let expected = AnalysisError::DimensionMismatch {
        expected: DIM,
        actual: 8,
    };

    let top_k = NonZeroUsize::new(1).unwrap();
    assert_eq!(
        analyzer
            .search(&basis(0), &LogFilter::new(), top_k)
            .unwrap_err(),
        expected
    );
    assert_eq!(
        analyzer.cluster(1, &LogFilter::new()).unwrap_err(),
        expected
    );
}

#[test]
fn test_concurrent_callers_see_identical_results() {
    let analyzer = Analyzer::new(Arc::new(populated_store(60, 13)));
    let top_k = NonZeroUsize::new(10).unwrap();
    let filter = LogFilter::new().with_level("ERROR");

    let expected_search = analyzer.search(&basis(1), &filter, top_k).unwrap();
    let expected_clusters = analyzer.cluster(3, &filter).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let analyzer = analyzer.clone();
            let filter = filter.clone();
            thread::spawn(move || {
                (
                    analyzer.search(&basis(1), &filter, top_k).unwrap(),
                    analyzer.cluster(3, &filter).unwrap(),
                )
            })
        })
        .collect();

    for handle in handles {
        let (search, clusters) = handle.join().unwrap();
        assert_eq!(search, expected_search);
        assert_eq!(clusters, expected_clusters);
    }
}
