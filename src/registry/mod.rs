//! Registry access
//!
//! The registry is the durable store for peripheral records, reached over
//! the local agent API. The [`Registry`] trait is the seam the reconciler
//! tests against; [`HttpRegistry`] is the real client.

mod client;

pub use client::HttpRegistry;

use std::time::Duration;

use async_trait::async_trait;
use log::info;
use tokio::time::sleep;

use crate::device::PeripheralRecord;
use crate::error::Result;

/// What a registry query produced, as seen by the reconciler
///
/// Transport failures surface as `Err`; a 2xx response whose body is not a
/// JSON array of records is `Malformed`. The reconciler treats both the same
/// way it treats an empty list: nothing confirmed published.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Well-formed list of registered records (possibly empty)
    Records(Vec<PeripheralRecord>),
    /// Response arrived but was not a list of records
    Malformed,
}

/// CRUD surface of the peripheral registry
///
/// No retry or backoff of its own; retries happen implicitly through the
/// outer reconcile cycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Registry: Send + Sync {
    /// Fetch records previously published under an identifier pattern
    async fn query(&self, identifier_pattern: &str) -> Result<QueryOutcome>;

    /// Publish a full record set for one transport in a single POST
    async fn publish(&self, records: &[PeripheralRecord]) -> Result<()>;

    /// Publish a single record (incremental LE path)
    async fn publish_one(&self, record: &PeripheralRecord) -> Result<()>;

    /// Remove a record from the registry
    async fn remove(&self, record: &PeripheralRecord) -> Result<()>;
}

/// Block until the agent API reports healthy
///
/// Polls the healthcheck endpoint, sleeping `retry_interval` between
/// attempts, forever. The rest of the edge stack is assumed to come up
/// eventually, so this returns only on success; progress is visible through
/// the logs, not through errors.
pub async fn wait_bootstrap(registry: &HttpRegistry, retry_interval: Duration) {
    info!("Checking if the agent API has been initialized...");

    while !registry.healthcheck().await {
        sleep(retry_interval).await;
    }

    info!("Agent API is up.");
}
