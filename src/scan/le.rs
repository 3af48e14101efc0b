//! Event-driven LE scanning
//!
//! The driver's discovery callback becomes a bounded channel: the scanner
//! task pushes one record per newly seen address, and a single consumer
//! publishes them sequentially. Re-advertisements from an address already
//! seen in this session are dropped here, which is what guarantees at most
//! one publish per device per session.

use std::collections::HashSet;

use btleplug::api::{
    BDAddr, Central, CentralEvent, Manager as _, Peripheral as _, PeripheralProperties,
    ScanFilter,
};
use btleplug::platform::Manager;
use futures::StreamExt;
use log::{debug, info};
use tokio::sync::mpsc::Sender;

use crate::classes;
use crate::device::PeripheralRecord;
use crate::error::{AgentError, Result};
use crate::scan::ScanConfig;

/// Tracks which addresses have already been reported this session
#[derive(Debug, Default)]
struct SessionFilter {
    seen: HashSet<BDAddr>,
}

impl SessionFilter {
    /// True exactly once per address; later sightings are re-advertisements
    fn first_sighting(&mut self, address: BDAddr) -> bool {
        self.seen.insert(address)
    }
}

/// Build the registry record for one LE advertisement
fn record_from_advertisement(properties: &PeripheralProperties) -> PeripheralRecord {
    let mut record = PeripheralRecord::le(properties.address.to_string(), true);
    if let Some(name) = &properties.local_name {
        record.name = name.clone();
    }
    if let Some(cod) = properties.class {
        record.classes = classes::decode(cod);
    }
    record
}

/// Continuous LE advertisement scanner
pub struct LeScanner {
    config: ScanConfig,
}

impl LeScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Capacity hint for the discovery channel this scanner feeds
    pub fn channel_capacity(&self) -> usize {
        self.config.channel_capacity
    }

    /// Scan until the consumer goes away
    ///
    /// Adapter initialization failure is fatal in this mode and propagates
    /// to the caller; once scanning, per-peripheral property failures are
    /// logged and skipped.
    pub async fn run(self, tx: Sender<PeripheralRecord>) -> Result<()> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Other("no Bluetooth adapter available".into()))?;

        let mut events = adapter.events().await?;
        adapter.start_scan(ScanFilter::default()).await?;
        info!("LE scan started");

        // The backend may replay discoveries; this filter is what enforces
        // first-sighting-only
        let mut session = SessionFilter::default();

        while let Some(event) = events.next().await {
            let id = match event {
                CentralEvent::DeviceDiscovered(id) => id,
                _ => continue,
            };

            let peripheral = match adapter.peripheral(&id).await {
                Ok(peripheral) => peripheral,
                Err(e) => {
                    debug!("Discovered peripheral vanished before lookup: {}", e);
                    continue;
                }
            };
            let properties = match peripheral.properties().await {
                Ok(Some(properties)) => properties,
                _ => continue,
            };

            if !session.first_sighting(properties.address) {
                continue;
            }

            let record = record_from_advertisement(&properties);
            debug!("New LE device {}", record.interface);
            if tx.send(record).await.is_err() {
                // Consumer dropped, stop scanning
                break;
            }
        }

        if let Err(e) = adapter.stop_scan().await {
            debug!("Failed to stop LE scan during shutdown: {}", e);
        }
        Ok(())
    }
}
