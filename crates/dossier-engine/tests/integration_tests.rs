//! Integration tests for the Investigation Engine

use dossier_domain::hit::fields;
use dossier_domain::{InvestigationStatus, LinkKind, RawHit, SourceErrorKind, SourceId};
use dossier_engine::{EngineConfig, EngineError, InvestigationEngine};
use dossier_governor::GovernorConfig;
use dossier_sources::{MockAdapter, SourceError};
use std::sync::Arc;
use std::time::Duration;

fn fast_engine_config() -> EngineConfig {
    EngineConfig {
        overall_deadline_ms: 5_000,
        detail_limit: 0,
        ..EngineConfig::default()
    }
}

fn governor_config() -> GovernorConfig {
    GovernorConfig {
        capacity: 10,
        refill_interval_ms: 60_000,
        ..GovernorConfig::default()
    }
}

fn code_host_hit(url: &str, name: &str, conf: f64, fetched_at: u64) -> RawHit {
    RawHit::new(SourceId::CodeHost, url, name, fetched_at, conf)
}

fn engine_with(adapters: Vec<Arc<MockAdapter>>) -> InvestigationEngine {
    let mut engine = InvestigationEngine::new(fast_engine_config()).unwrap();
    for adapter in adapters {
        engine = engine.with_source(adapter, governor_config());
    }
    engine
}

#[tokio::test(start_paused = true)]
async fn test_full_run_produces_complete_record() {
    let code_host = Arc::new(MockAdapter::new(SourceId::CodeHost));
    code_host.enqueue_hits(vec![code_host_hit("https://gh/jdoe", "Jane Doe", 0.8, 10)]);

    let prof_net = Arc::new(MockAdapter::new(SourceId::ProfessionalNetwork));
    prof_net.enqueue_hits(vec![RawHit::new(
        SourceId::ProfessionalNetwork,
        "https://pn/jane-doe",
        "Jane Doe",
        20,
        0.7,
    )]);

    let engine = engine_with(vec![code_host, prof_net]);
    let record = engine.start_investigation("Jane Doe").await.unwrap();

    assert_eq!(record.status, InvestigationStatus::Complete);
    assert_eq!(record.candidates.len(), 2);
    assert!(record.source_errors.is_empty());
    assert!(record.fault.is_none());
    assert_eq!(record.target.name, "Jane Doe");
    assert!(record.completed_at >= record.started_at);
}

#[tokio::test(start_paused = true)]
async fn test_partial_failure_still_completes_with_data() {
    // 2 of 3 sources blocked: the record is partial but carries the
    // surviving source's candidates
    let code_host = Arc::new(MockAdapter::new(SourceId::CodeHost));
    code_host.enqueue_hits(vec![code_host_hit("https://gh/jdoe", "Jane Doe", 0.8, 10)]);

    let prof_net = Arc::new(MockAdapter::new(SourceId::ProfessionalNetwork));
    prof_net.enqueue_failure(SourceError::Blocked("captcha".into()));

    let web = Arc::new(MockAdapter::new(SourceId::WebSearch));
    web.enqueue_failure(SourceError::Blocked("captcha".into()));

    let engine = engine_with(vec![code_host, prof_net, web]);
    let record = engine.start_investigation("Jane Doe").await.unwrap();

    assert_eq!(record.status, InvestigationStatus::Partial);
    assert!(!record.candidates.is_empty());
    assert_eq!(
        record.source_errors.get(&SourceId::ProfessionalNetwork),
        Some(&SourceErrorKind::Blocked)
    );
    assert_eq!(
        record.source_errors.get(&SourceId::WebSearch),
        Some(&SourceErrorKind::Blocked)
    );
}

#[tokio::test(start_paused = true)]
async fn test_not_found_sources_keep_record_complete() {
    let code_host = Arc::new(MockAdapter::new(SourceId::CodeHost));
    code_host.enqueue_hits(vec![code_host_hit("https://gh/jdoe", "Jane Doe", 0.8, 10)]);

    // unscripted mock answers NotFound
    let web = Arc::new(MockAdapter::new(SourceId::WebSearch));

    let engine = engine_with(vec![code_host, web]);
    let record = engine.start_investigation("Jane Doe").await.unwrap();

    assert_eq!(record.status, InvestigationStatus::Complete);
    assert_eq!(
        record.source_errors.get(&SourceId::WebSearch),
        Some(&SourceErrorKind::NotFound)
    );
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_start_rejected_while_in_flight() {
    let code_host = Arc::new(MockAdapter::new(SourceId::CodeHost));
    code_host.enqueue_hits(vec![code_host_hit("https://gh/jdoe", "Jane Doe", 0.8, 10)]);
    let slow = Arc::new(MockAdapter::new(SourceId::WebSearch).with_delay(Duration::from_millis(500)));

    let engine = Arc::new(engine_with(vec![code_host, slow]));

    let first = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.start_investigation("Jane Doe").await })
    };
    // let the first run reach its dispatch sleep
    tokio::task::yield_now().await;

    let second = engine.start_investigation("jane doe").await;
    assert!(matches!(second, Err(EngineError::AlreadyInProgress(_))));

    let record = first.await.unwrap().unwrap();
    assert_eq!(record.target.name, "Jane Doe");

    // once settled, the same target can be investigated again
    let third = engine.start_investigation("Jane Doe").await;
    assert!(third.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_different_targets_may_run_concurrently() {
    let slow_a = Arc::new(MockAdapter::new(SourceId::CodeHost).with_delay(Duration::from_millis(200)));
    slow_a.enqueue_hits(vec![code_host_hit("https://gh/a", "Jane Doe", 0.8, 10)]);
    slow_a.enqueue_hits(vec![code_host_hit("https://gh/b", "Rob Roe", 0.8, 20)]);

    let engine = Arc::new(engine_with(vec![slow_a]));

    let first = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.start_investigation("Jane Doe").await })
    };
    tokio::task::yield_now().await;

    let second = engine.start_investigation("Rob Roe").await;
    assert!(second.is_ok());
    assert!(first.await.unwrap().is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_deadline_expiry_settles_as_transient() {
    let config = EngineConfig {
        overall_deadline_ms: 100,
        detail_limit: 0,
        ..EngineConfig::default()
    };
    let slow = Arc::new(MockAdapter::new(SourceId::WebSearch).with_delay(Duration::from_secs(5)));
    slow.enqueue_hits(vec![RawHit::new(SourceId::WebSearch, "https://x", "Jane Doe", 1, 0.4)]);

    let engine = InvestigationEngine::new(config)
        .unwrap()
        .with_source(slow, governor_config());

    let record = engine.start_investigation("Jane Doe").await.unwrap();

    assert_eq!(record.status, InvestigationStatus::Partial);
    assert_eq!(
        record.source_errors.get(&SourceId::WebSearch),
        Some(&SourceErrorKind::Transient)
    );
    assert!(record.candidates.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cross_reference_scenario_splits_and_confirms() {
    // same-name profiles from two sources stay split on name similarity
    // alone, but the explicit reference yields a full-strength
    // confirmation and boosts both
    let code_host = Arc::new(MockAdapter::new(SourceId::CodeHost));
    code_host.enqueue_hits(vec![code_host_hit("https://gh/jdoe", "Jane Doe", 0.8, 10)
        .with_field(fields::HANDLE, "jdoe")]);

    let prof_net = Arc::new(MockAdapter::new(SourceId::ProfessionalNetwork));
    prof_net.enqueue_hits(vec![RawHit::new(
        SourceId::ProfessionalNetwork,
        "https://pn/jane-doe",
        "Jane Doe",
        20,
        0.7,
    )
    .with_field(fields::REFERENCE, "https://gh/jdoe")]);

    let engine = engine_with(vec![code_host, prof_net]);
    let record = engine.start_investigation("Jane Doe").await.unwrap();

    assert_eq!(record.candidates.len(), 2, "name match alone must not merge");
    assert_eq!(record.links.len(), 1);
    assert_eq!(record.links[0].kind, LinkKind::Confirms);
    assert_eq!(record.links[0].strength, 1.0);

    // both candidates boosted above their raw confidences
    assert!((record.candidates[0].match_score - 0.95).abs() < 1e-9);
    assert!((record.candidates[1].match_score - 0.85).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_detail_enrichment_folds_into_candidates() {
    let config = EngineConfig {
        overall_deadline_ms: 5_000,
        detail_limit: 1,
        ..EngineConfig::default()
    };
    let code_host = Arc::new(MockAdapter::new(SourceId::CodeHost));
    code_host.enqueue_hits(vec![code_host_hit("https://gh/jdoe", "Jane Doe", 0.8, 10)]);
    code_host.set_detail_field(fields::ORGANIZATION, "Acme");

    let engine = InvestigationEngine::new(config)
        .unwrap()
        .with_source(code_host, governor_config());

    let record = engine.start_investigation("Jane Doe").await.unwrap();
    let candidate = &record.candidates[0];
    assert_eq!(
        candidate.merged_fields.get(fields::ORGANIZATION).unwrap().value,
        "Acme"
    );
}

#[tokio::test(start_paused = true)]
async fn test_aggregation_fault_preserves_partial_record() {
    let code_host = Arc::new(MockAdapter::new(SourceId::CodeHost));
    let mut poisoned = code_host_hit("https://gh/jdoe", "Jane Doe", 0.5, 10);
    poisoned.confidence = f64::NAN;
    code_host.enqueue_hits(vec![poisoned]);

    let engine = engine_with(vec![code_host]);
    let record = engine.start_investigation("Jane Doe").await.unwrap();

    assert!(record.fault.is_some());
    assert_eq!(record.status, InvestigationStatus::Partial);
    // the record still exists and is retrievable
    assert!(engine.current_record().is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_current_record_tracks_last_completed() {
    let code_host = Arc::new(MockAdapter::new(SourceId::CodeHost));
    code_host.enqueue_hits(vec![code_host_hit("https://gh/jdoe", "Jane Doe", 0.8, 10)]);

    let engine = engine_with(vec![code_host]);
    assert!(matches!(
        engine.current_record(),
        Err(EngineError::NoActiveInvestigation)
    ));

    let record = engine.start_investigation("Jane Doe").await.unwrap();
    let current = engine.current_record().unwrap();
    assert_eq!(current.target, record.target);
}

#[tokio::test(start_paused = true)]
async fn test_no_candidate_duplicates_across_sources() {
    // the same URL surfacing twice from one source folds into one candidate
    let code_host = Arc::new(MockAdapter::new(SourceId::CodeHost));
    code_host.enqueue_hits(vec![
        code_host_hit("https://gh/jdoe", "Jane Doe", 0.8, 10),
        code_host_hit("https://gh/jdoe", "Jane D.", 0.6, 11),
        code_host_hit("https://gh/other", "Jane Doe", 0.5, 12),
    ]);

    let engine = engine_with(vec![code_host]);
    let record = engine.start_investigation("Jane Doe").await.unwrap();

    let mut seen = std::collections::HashSet::new();
    for candidate in &record.candidates {
        for hit in &candidate.hits {
            assert!(seen.insert((hit.source, hit.url.clone())));
        }
    }
}
