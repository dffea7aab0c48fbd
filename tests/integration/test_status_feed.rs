//! Integration Tests for the Status Feed
//!
//! Login announcements, silent polling, failure degradation and stale
//! result handling.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use omegaterm::app::async_ops::{self, Poller};
use omegaterm::engine::{ALL_OPERATIONAL, STATUS_UNAVAILABLE, WARNINGS_DETECTED};
use omegaterm::persistence::MemorySessionStore;
use omegaterm::status::{StatusError, StatusProvider, StatusSnapshot};
use omegaterm::{FetchKind, SessionEngine};
use tokio::sync::mpsc;
use test_utils::*;

fn tail(engine: &SessionEngine, n: usize) -> Vec<String> {
    let lines = engine.transcript().to_vec();
    lines[lines.len().saturating_sub(n)..].to_vec()
}

#[test]
fn test_login_fetch_announces_all_clear() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.apply_status(1, FetchKind::Login, Ok(quiet_snapshot()));
    assert_eq!(tail(&engine, 2), ["", ALL_OPERATIONAL]);
}

#[test]
fn test_login_fetch_lists_only_warning_components() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.apply_status(1, FetchKind::Login, Ok(outage_snapshot()));
    assert_eq!(
        tail(&engine, 4),
        ["", WARNINGS_DETECTED, "Dashboard: DEGRADED_PERFORMANCE", "Webhooks: MAJOR_OUTAGE"]
    );
}

#[test]
fn test_status_command_lists_every_component_in_feed_order() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.apply_status(1, FetchKind::Poll, Ok(outage_snapshot()));
    engine.submit("status").unwrap();

    assert_eq!(
        tail(&engine, 6),
        [
            "> status",
            "",
            "API: OPERATIONAL",
            "Dashboard: DEGRADED_PERFORMANCE",
            "Webhooks: MAJOR_OUTAGE",
            "Billing: PARTIAL_OUTAGE",
        ]
    );
}

#[test]
fn test_failed_fetch_is_silent_and_degrades_status() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.apply_status(1, FetchKind::Poll, Ok(quiet_snapshot()));

    let before = engine.transcript().len();
    engine.apply_status(1, FetchKind::Login, Err(StatusError::Malformed("eof".to_string())));
    assert_eq!(engine.transcript().len(), before);

    engine.submit("status").unwrap();
    assert_eq!(tail(&engine, 2), ["> status", STATUS_UNAVAILABLE]);
}

#[test]
fn test_snapshot_is_overwritten_not_merged() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.apply_status(1, FetchKind::Poll, Ok(outage_snapshot()));
    engine.apply_status(1, FetchKind::Poll, Ok(StatusSnapshot::default()));

    let snapshot = engine.status_board().snapshot().unwrap();
    assert!(snapshot.components.is_empty());
}

#[test]
fn test_results_after_logout_are_discarded() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.submit("logout").unwrap();
    let before = engine.transcript().to_vec();

    engine.apply_status(1, FetchKind::Login, Ok(outage_snapshot()));
    assert_eq!(engine.transcript().to_vec(), before);
    assert!(engine.status_board().snapshot().is_none());
}

#[test]
fn test_announcement_waits_for_typed_output() {
    // A remembered session fetches while nothing is typing; the summary
    // must land after the restore lines
    let mut engine =
        SessionEngine::new(create_test_config(), Arc::new(MemorySessionStore::remembered()))
            .unwrap();
    engine.tick();
    engine.apply_status(1, FetchKind::Login, Ok(quiet_snapshot()));
    engine.run_feed_to_idle();

    assert_eq!(tail(&engine, 4), ["Session restored.", "Type `help` to get started.", "", ALL_OPERATIONAL]);
}

#[tokio::test]
async fn test_fetch_task_delivers_mock_result() {
    let provider = Arc::new(MockStatusProvider::healthy(quiet_snapshot()));
    let (tx, mut rx) = mpsc::unbounded_channel();

    async_ops::spawn_fetch(provider.clone(), tx, 4);
    let update = rx.recv().await.unwrap();

    assert_eq!(update.epoch, 4);
    assert_eq!(update.kind, FetchKind::Login);
    assert_eq!(update.result.unwrap(), quiet_snapshot());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_poller_reports_each_interval_until_stopped() {
    let provider = Arc::new(
        MockStatusProvider::healthy(quiet_snapshot())
            .then(Err(StatusError::HttpStatus(502)))
            .then(Ok(outage_snapshot())),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut poller = Poller::new();
    poller.start(provider.clone(), tx, 2, Duration::from_secs(15));

    let first = rx.recv().await.unwrap();
    assert!(matches!(first.result, Err(StatusError::HttpStatus(502))));
    let second = rx.recv().await.unwrap();
    assert_eq!(second.result.unwrap(), outage_snapshot());
    let third = rx.recv().await.unwrap();
    assert_eq!(third.result.unwrap(), quiet_snapshot());
    assert!([first.kind, second.kind, third.kind].iter().all(|k| *k == FetchKind::Poll));

    poller.stop();
    assert!(rx.recv().await.is_none());
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_mock_failure_flows_into_unavailable() {
    let provider: Arc<dyn StatusProvider> = Arc::new(MockStatusProvider::failing());
    let mut engine = logged_in_engine(MemorySessionStore::new());

    let result = provider.fetch_status().await;
    engine.apply_status(engine.session().epoch(), FetchKind::Login, result);
    engine.submit("status").unwrap();
    assert_eq!(tail(&engine, 1), [STATUS_UNAVAILABLE]);
}
