//! Reconcile-cycle integration tests
//!
//! Drives the reconciler against a recording fake of the registry and checks
//! the publish decisions cycle by cycle.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use bluewatch::device::{self, PeripheralRecord, CLASSIC_INTERFACE};
use bluewatch::error::{AgentError, Result};
use bluewatch::reconcile::{PublishState, Reconciler, ScanOutcome};
use bluewatch::registry::{QueryOutcome, Registry};

/// Recording registry fake: scripted query responses, captured writes
#[derive(Default)]
struct FakeState {
    query_responses: Mutex<VecDeque<Result<QueryOutcome>>>,
    queries: Mutex<Vec<String>>,
    published: Mutex<Vec<Vec<PeripheralRecord>>>,
    published_single: Mutex<Vec<PeripheralRecord>>,
    removed: Mutex<Vec<PeripheralRecord>>,
}

#[derive(Clone, Default)]
struct FakeRegistry {
    state: Arc<FakeState>,
}

impl FakeRegistry {
    fn with_query_responses(
        responses: impl IntoIterator<Item = Result<QueryOutcome>>,
    ) -> Self {
        let fake = Self::default();
        *fake.state.query_responses.lock().unwrap() = responses.into_iter().collect();
        fake
    }

    fn query_count(&self) -> usize {
        self.state.queries.lock().unwrap().len()
    }

    fn published(&self) -> Vec<Vec<PeripheralRecord>> {
        self.state.published.lock().unwrap().clone()
    }

    fn published_single(&self) -> Vec<PeripheralRecord> {
        self.state.published_single.lock().unwrap().clone()
    }

    fn removed(&self) -> Vec<PeripheralRecord> {
        self.state.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Registry for FakeRegistry {
    async fn query(&self, identifier_pattern: &str) -> Result<QueryOutcome> {
        self.state
            .queries
            .lock()
            .unwrap()
            .push(identifier_pattern.to_string());
        self.state
            .query_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(QueryOutcome::Records(vec![])))
    }

    async fn publish(&self, records: &[PeripheralRecord]) -> Result<()> {
        self.state.published.lock().unwrap().push(records.to_vec());
        Ok(())
    }

    async fn publish_one(&self, record: &PeripheralRecord) -> Result<()> {
        self.state
            .published_single
            .lock()
            .unwrap()
            .push(record.clone());
        Ok(())
    }

    async fn remove(&self, record: &PeripheralRecord) -> Result<()> {
        self.state.removed.lock().unwrap().push(record.clone());
        Ok(())
    }
}

fn phone() -> PeripheralRecord {
    PeripheralRecord::classic("AA:BB", "Phone", vec!["phone".into()])
}

// Scenario: empty scan result leaves the registry completely untouched
#[tokio::test]
async fn empty_scan_issues_no_http_calls() {
    let registry = FakeRegistry::default();
    let mut reconciler = Reconciler::new(registry.clone(), CLASSIC_INTERFACE);

    reconciler.reconcile(ScanOutcome::Devices(vec![])).await;

    assert_eq!(registry.query_count(), 0);
    assert!(registry.published().is_empty());
}

// Scenario: registry empty, one scanned device => exactly one POST
#[tokio::test]
async fn unpublished_device_is_posted() {
    let registry =
        FakeRegistry::with_query_responses([Ok(QueryOutcome::Records(vec![]))]);
    let mut reconciler = Reconciler::new(registry.clone(), CLASSIC_INTERFACE);

    reconciler.reconcile(ScanOutcome::Devices(vec![phone()])).await;

    assert_eq!(registry.published(), vec![vec![phone()]]);
    assert_eq!(reconciler.state(), PublishState::Published);
}

// Scenario: registry already holds the identical record => no POST
#[tokio::test]
async fn identical_registry_record_skips_publish() {
    let registry =
        FakeRegistry::with_query_responses([Ok(QueryOutcome::Records(vec![phone()]))]);
    let mut reconciler = Reconciler::new(registry.clone(), CLASSIC_INTERFACE);

    reconciler.reconcile(ScanOutcome::Devices(vec![phone()])).await;

    assert!(registry.published().is_empty());
    assert_eq!(reconciler.state(), PublishState::Published);
}

// Scenario: registry holds a record with different classes => republish
#[tokio::test]
async fn changed_record_is_republished() {
    let stale = PeripheralRecord::classic("AA:BB", "Phone", vec!["computer".into()]);
    let registry =
        FakeRegistry::with_query_responses([Ok(QueryOutcome::Records(vec![stale]))]);
    let mut reconciler = Reconciler::new(registry.clone(), CLASSIC_INTERFACE);

    reconciler.reconcile(ScanOutcome::Devices(vec![phone()])).await;

    assert_eq!(registry.published(), vec![vec![phone()]]);
}

// Scenario: query transport error => treated as not yet published => POST
#[tokio::test]
async fn query_error_is_treated_as_unpublished() {
    let registry = FakeRegistry::with_query_responses([Err(AgentError::Other(
        "connection refused".into(),
    ))]);
    let mut reconciler = Reconciler::new(registry.clone(), CLASSIC_INTERFACE);

    reconciler.reconcile(ScanOutcome::Devices(vec![phone()])).await;

    assert_eq!(registry.published(), vec![vec![phone()]]);
}

// Malformed registry body gets the same bias-to-republish treatment
#[tokio::test]
async fn malformed_query_body_triggers_republish() {
    let registry = FakeRegistry::with_query_responses([Ok(QueryOutcome::Malformed)]);
    let mut reconciler = Reconciler::new(registry.clone(), CLASSIC_INTERFACE);

    reconciler.reconcile(ScanOutcome::Devices(vec![phone()])).await;

    assert_eq!(registry.published(), vec![vec![phone()]]);
}

// Two cycles with an unchanged scan: the second must not publish again once
// the registry reflects the first publish
#[tokio::test]
async fn reconcile_is_idempotent_across_cycles() {
    let registry = FakeRegistry::with_query_responses([
        Ok(QueryOutcome::Records(vec![])),
        Ok(QueryOutcome::Records(vec![phone()])),
    ]);
    let mut reconciler = Reconciler::new(registry.clone(), CLASSIC_INTERFACE);

    reconciler.reconcile(ScanOutcome::Devices(vec![phone()])).await;
    reconciler.reconcile(ScanOutcome::Devices(vec![phone()])).await;

    assert_eq!(registry.query_count(), 2);
    assert_eq!(registry.published().len(), 1);
    assert_eq!(reconciler.state(), PublishState::Published);
}

// A degraded scan completes the cycle and publishes the sentinel
#[tokio::test]
async fn degraded_scan_publishes_unavailable_sentinel() {
    let registry =
        FakeRegistry::with_query_responses([Ok(QueryOutcome::Records(vec![]))]);
    let mut reconciler = Reconciler::new(registry.clone(), CLASSIC_INTERFACE);

    reconciler
        .reconcile(ScanOutcome::Degraded("no adapter".into()))
        .await;

    let published = registry.published();
    assert_eq!(published.len(), 1);
    assert_eq!(
        published[0],
        vec![PeripheralRecord::unavailable(CLASSIC_INTERFACE)]
    );
}

// A permuted registry listing of the same set is not drift
#[tokio::test]
async fn record_order_does_not_count_as_drift() {
    let a = PeripheralRecord::classic("AA:AA", "a", vec![]);
    let b = PeripheralRecord::classic("BB:BB", "b", vec![]);

    let registry = FakeRegistry::with_query_responses([Ok(QueryOutcome::Records(
        vec![b.clone(), a.clone()],
    ))]);
    let mut reconciler = Reconciler::new(registry.clone(), CLASSIC_INTERFACE);

    reconciler
        .reconcile(ScanOutcome::Devices(vec![a, b]))
        .await;

    assert!(registry.published().is_empty());
}

// Published record sets come out normalized regardless of scan order
#[tokio::test]
async fn published_set_is_normalized() {
    let a = PeripheralRecord::classic("AA:AA", "a", vec![]);
    let b = PeripheralRecord::classic("BB:BB", "b", vec![]);

    let registry =
        FakeRegistry::with_query_responses([Ok(QueryOutcome::Records(vec![]))]);
    let mut reconciler = Reconciler::new(registry.clone(), CLASSIC_INTERFACE);

    reconciler
        .reconcile(ScanOutcome::Devices(vec![b.clone(), a.clone()]))
        .await;

    let mut expected = vec![b, a];
    device::normalize(&mut expected);
    assert_eq!(registry.published(), vec![expected]);
}

// Devices that disappear from the scan are never deleted by the polling
// reconciler; cleanup of stale registry entries is out-of-band
#[tokio::test]
async fn vanished_devices_are_not_removed() {
    let registry = FakeRegistry::with_query_responses([
        Ok(QueryOutcome::Records(vec![])),
        Ok(QueryOutcome::Records(vec![phone()])),
    ]);
    let mut reconciler = Reconciler::new(registry.clone(), CLASSIC_INTERFACE);

    reconciler.reconcile(ScanOutcome::Devices(vec![phone()])).await;
    // Device gone from the next scan: empty cycle, registry left as-is
    reconciler.reconcile(ScanOutcome::Devices(vec![])).await;

    assert!(registry.removed().is_empty());
    assert_eq!(registry.published().len(), 1);
}

// LE-style incremental publish path keeps one record per call
#[tokio::test]
async fn publish_one_records_single_devices() {
    let registry = FakeRegistry::default();

    let mut record = PeripheralRecord::le("11:22:33:44:55:66", true);
    record.name = "Beacon".into();
    registry.publish_one(&record).await.unwrap();

    assert_eq!(registry.published_single(), vec![record]);
}
