//! Scan-to-registry reconciliation
//!
//! The core of the agent: once per cycle, decide whether what the scanner
//! saw differs from what the registry holds and, if so, republish the whole
//! record set for this transport. Comparison is value-based over normalized
//! record lists; cycles are long and device counts are small, so coarse
//! whole-set republish beats a diff protocol here.

use log::{debug, info, warn};

use crate::device::{self, PeripheralRecord};
use crate::error::Result;
use crate::registry::{QueryOutcome, Registry};

/// What one scan pass produced
///
/// Scan failures are an explicit variant rather than an error path: a failed
/// scan still feeds the reconciler, as a degraded sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Records for every device that answered the scan
    Devices(Vec<PeripheralRecord>),
    /// The scan machinery itself failed
    Degraded(String),
}

impl ScanOutcome {
    /// Collapse the outcome into the record set to reconcile against
    ///
    /// A degraded scan stands in as one `available=false` sentinel under the
    /// transport tag, so the registry still reflects that the transport
    /// exists but cannot currently be enumerated.
    pub fn into_records(self, interface: &str) -> Vec<PeripheralRecord> {
        match self {
            Self::Devices(records) => records,
            Self::Degraded(reason) => {
                warn!("Scan on {} degraded: {}", interface, reason);
                vec![PeripheralRecord::unavailable(interface)]
            }
        }
    }
}

/// Publish state of one scanner's record set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    /// No matching record confirmed in the registry
    Unpublished,
    /// Last known-good value confirmed present
    Published,
}

/// Decide whether the current record set must be (re)published
///
/// Biased toward republishing: a failed query, a malformed body and an empty
/// list all read as "nothing published yet". Duplicate-POST risk is accepted
/// in exchange for eventual consistency.
pub fn needs_publish(
    current: &[PeripheralRecord],
    query: &Result<QueryOutcome>,
) -> bool {
    match query {
        Err(e) => {
            debug!("Registry query failed ({}), treating as unpublished", e);
            true
        }
        Ok(QueryOutcome::Malformed) => true,
        Ok(QueryOutcome::Records(records)) if records.is_empty() => true,
        Ok(QueryOutcome::Records(records)) => {
            let mut known = records.clone();
            device::normalize(&mut known);
            known != current
        }
    }
}

/// Drives publish decisions for one transport namespace
pub struct Reconciler<R: Registry> {
    registry: R,
    transport: String,
    state: PublishState,
}

impl<R: Registry> Reconciler<R> {
    /// Create a reconciler for the given transport tag
    pub fn new(registry: R, transport: impl Into<String>) -> Self {
        Self {
            registry,
            transport: transport.into(),
            state: PublishState::Unpublished,
        }
    }

    /// Current publish state
    pub fn state(&self) -> PublishState {
        self.state
    }

    /// Run one reconcile pass over a scan outcome
    ///
    /// Never surfaces an error: every failure ends in "log and retry next
    /// cycle". An empty scan issues no HTTP call at all, not even the query.
    /// Devices that vanish from the scan are never deleted from the registry
    /// here; see the remove path on [`Registry`].
    pub async fn reconcile(&mut self, outcome: ScanOutcome) {
        let mut current = outcome.into_records(&self.transport);
        if current.is_empty() {
            debug!(
                "Nothing discovered on {}, leaving the registry alone",
                self.transport
            );
            return;
        }
        device::normalize(&mut current);

        let query = self.registry.query(&self.transport).await;
        if !needs_publish(&current, &query) {
            debug!("{} records already published and unchanged", self.transport);
            self.state = PublishState::Published;
            return;
        }

        info!(
            "Publishing {} record(s) for {}",
            current.len(),
            self.transport
        );
        match self.registry.publish(&current).await {
            Ok(()) => {
                self.state = PublishState::Published;
            }
            Err(e) => {
                warn!(
                    "Publish for {} failed, will retry next cycle: {}",
                    self.transport, e
                );
                self.state = PublishState::Unpublished;
            }
        }
    }
}
