//! Bounded-window polled scanning
//!
//! One blocking-style pass per cycle: open the scan for the configured
//! window, collect every peripheral that resolved a name, close the scan.
//! Any adapter failure degrades the outcome instead of propagating, so the
//! polling loop keeps running with a dead or missing adapter.

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager};
use log::{debug, warn};
use tokio::time::sleep;

use crate::classes;
use crate::device::PeripheralRecord;
use crate::error::{AgentError, Result};
use crate::reconcile::ScanOutcome;
use crate::scan::ScanConfig;

/// Polled scanner for one adapter
pub struct PolledScanner {
    config: ScanConfig,
    adapter: Option<Adapter>,
}

impl PolledScanner {
    /// Create a scanner; the adapter is initialized lazily on first scan
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            adapter: None,
        }
    }

    /// Run one scan pass
    ///
    /// Failures never escape: they collapse into `ScanOutcome::Degraded`,
    /// and the adapter handle is dropped so the next cycle re-initializes
    /// from scratch.
    pub async fn scan(&mut self) -> ScanOutcome {
        match self.scan_inner().await {
            Ok(records) => ScanOutcome::Devices(records),
            Err(e) => {
                self.adapter = None;
                ScanOutcome::Degraded(e.to_string())
            }
        }
    }

    async fn scan_inner(&mut self) -> Result<Vec<PeripheralRecord>> {
        let window = self.config.scan_window;
        let adapter = self.get_or_init_adapter().await?;

        adapter.start_scan(ScanFilter::default()).await?;
        sleep(window).await;
        let peripherals = adapter.peripherals().await?;
        if let Err(e) = adapter.stop_scan().await {
            warn!("Failed to stop scan: {}", e);
        }

        let mut records = Vec::new();
        for peripheral in peripherals {
            let properties = match peripheral.properties().await {
                Ok(Some(properties)) => properties,
                Ok(None) => continue,
                Err(e) => {
                    debug!(
                        "Skipping {:?}: could not read properties: {}",
                        peripheral.id(),
                        e
                    );
                    continue;
                }
            };

            // Inquiry semantics: only devices that resolved a name count
            let name = match properties.local_name {
                Some(name) => name,
                None => continue,
            };
            let classes = properties.class.map(classes::decode).unwrap_or_default();

            records.push(PeripheralRecord::classic(
                properties.address.to_string(),
                name,
                classes,
            ));
        }

        debug!("Scan window closed with {} named device(s)", records.len());
        Ok(records)
    }

    async fn get_or_init_adapter(&mut self) -> Result<&Adapter> {
        if self.adapter.is_none() {
            let manager = Manager::new().await?;
            let adapter = manager
                .adapters()
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| AgentError::Other("no Bluetooth adapter available".into()))?;
            self.adapter = Some(adapter);
        }
        // Just set above when it was None
        Ok(self.adapter.as_ref().expect("adapter initialized"))
    }
}
