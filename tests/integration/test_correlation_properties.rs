//! Deployment correlation through the analysis facade

use std::sync::Arc;

use rootcause::{Analyzer, LogFilter, Settings};

use crate::support::{basis, empty_store, new_deployment, new_log};

#[test]
fn test_auth_deployment_pairs_with_both_following_logs() {
    let store = empty_store();
    store
        .insert_log(new_log("ERROR", "auth", 0, "db timeout", basis(0)))
        .unwrap();
    store
        .insert_log(new_log("INFO", "auth", 1, "heartbeat ok", basis(1)))
        .unwrap();
    store
        .insert_deployment(new_deployment("auth", "1.4.2", 0))
        .unwrap();

    let analyzer = Analyzer::new(Arc::new(store));
    let pairs = analyzer.correlate("auth").unwrap();

    let ids: Vec<u32> = pairs.iter().map(|p| p.log.id.value()).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!(pairs.iter().all(|p| p.deployment.version == "1.4.2"));
}

#[test]
fn test_log_at_deploy_instant_is_included() {
    let store = empty_store();
    store
        .insert_log(new_log("ERROR", "auth", 100, "boot failure", basis(0)))
        .unwrap();
    store
        .insert_log(new_log("ERROR", "auth", 99, "old failure", basis(0)))
        .unwrap();
    store
        .insert_deployment(new_deployment("auth", "2.0.0", 100))
        .unwrap();

    let pairs = Analyzer::new(Arc::new(store)).correlate("auth").unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].log.timestamp, pairs[0].deployment.deployed_at);
}

#[test]
fn test_results_are_capped_and_newest_first() {
    let store = empty_store();
    store
        .insert_deployment(new_deployment("auth", "1.0.0", 0))
        .unwrap();
    store
        .insert_deployment(new_deployment("auth", "1.1.0", 500))
        .unwrap();
    for i in 0..40 {
        store
            .insert_log(new_log("ERROR", "auth", i * 25, "db timeout", basis(0)))
            .unwrap();
        store
            .insert_log(new_log("ERROR", "billing", i * 25, "card declined", basis(1)))
            .unwrap();
    }

    let pairs = Analyzer::new(Arc::new(store)).correlate("auth").unwrap();
    assert_eq!(pairs.len(), 20);
    assert!(pairs.iter().all(|p| p.log.service == "auth"));
    assert!(
        pairs
            .windows(2)
            .all(|w| w[0].log.timestamp >= w[1].log.timestamp)
    );
    assert!(
        pairs
            .iter()
            .all(|p| p.log.timestamp >= p.deployment.deployed_at)
    );
}

#[test]
fn test_service_without_deployments_is_empty() {
    let store = empty_store();
    store
        .insert_log(new_log("ERROR", "auth", 10, "db timeout", basis(0)))
        .unwrap();
    store
        .insert_deployment(new_deployment("billing", "0.3.0", 0))
        .unwrap();

    let analyzer = Analyzer::new(Arc::new(store));
    assert!(analyzer.correlate("auth").unwrap().is_empty());
    assert!(analyzer.correlate("unknown").unwrap().is_empty());
}

#[test]
fn test_oversized_settings_do_not_lift_caps() {
    let store = empty_store();
    store
        .insert_deployment(new_deployment("auth", "3.0.0", 0))
        .unwrap();
    for i in 0..30 {
        store
            .insert_log(new_log("ERROR", "auth", i, "db timeout", basis(0)))
            .unwrap();
    }

    let mut settings = Settings::default();
    settings.clustering.preview_size = 50;
    settings.correlation.limit = 100;
    let analyzer = Analyzer::with_settings(Arc::new(store), &settings);

    let clusters = analyzer.cluster(1, &LogFilter::new()).unwrap();
    assert_eq!(clusters[0].size, 30);
    assert_eq!(clusters[0].preview.len(), 5);
    assert_eq!(analyzer.correlate("auth").unwrap().len(), 20);
}
