//! HTTP client for the peripheral registry

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;

use crate::config::AgentConfig;
use crate::device::PeripheralRecord;
use crate::error::Result;
use crate::registry::{QueryOutcome, Registry};

/// reqwest-backed registry client
///
/// Every request carries the bounded timeout from the agent config; there is
/// no unbounded network wait anywhere in the cycle.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRegistry {
    /// Build a client against the configured registry base URL
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.registry_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn peripheral_url(&self) -> String {
        format!("{}/peripheral", self.base_url)
    }

    /// One liveness probe; any 2xx counts as healthy
    pub async fn healthcheck(&self) -> bool {
        let url = format!("{}/healthcheck", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Healthcheck not reachable yet: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl Registry for HttpRegistry {
    async fn query(&self, identifier_pattern: &str) -> Result<QueryOutcome> {
        let response = self
            .client
            .get(self.peripheral_url())
            .query(&[("identifier_pattern", identifier_pattern)])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(
                "Registry query for {:?} returned {}",
                identifier_pattern,
                response.status()
            );
            return Ok(QueryOutcome::Malformed);
        }

        let body: Value = match response.json().await {
            Ok(value) => value,
            Err(e) => {
                warn!("Registry query body was not JSON: {}", e);
                return Ok(QueryOutcome::Malformed);
            }
        };

        if !body.is_array() {
            warn!("Registry query returned a non-list body");
            return Ok(QueryOutcome::Malformed);
        }

        match serde_json::from_value::<Vec<PeripheralRecord>>(body) {
            Ok(records) => Ok(QueryOutcome::Records(records)),
            Err(e) => {
                warn!("Registry returned records that could not be decoded: {}", e);
                Ok(QueryOutcome::Malformed)
            }
        }
    }

    async fn publish(&self, records: &[PeripheralRecord]) -> Result<()> {
        info!("Sending {} Bluetooth record(s) to the registry", records.len());
        self.client
            .post(self.peripheral_url())
            .json(records)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn publish_one(&self, record: &PeripheralRecord) -> Result<()> {
        info!(
            "Sending Bluetooth device {} ({}) to the registry",
            record.interface,
            if record.name.is_empty() { "unnamed" } else { &record.name }
        );
        self.client
            .post(self.peripheral_url())
            .json(record)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn remove(&self, record: &PeripheralRecord) -> Result<()> {
        info!("Removing Bluetooth device {} from the registry", record.interface);
        self.client
            .delete(self.peripheral_url())
            .json(record)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
