//! Bluetooth scanning adapters
//!
//! Two independent modes over the same btleplug stack: a bounded-window
//! polled scan feeding whole-cycle reconciliation, and a continuous LE scan
//! feeding a bounded channel of per-device discovery events.

mod le;
mod poll;

pub use le::LeScanner;
pub use poll::PolledScanner;

use std::time::Duration;

/// Configuration for the scanners
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// How long a polled scan window stays open
    pub scan_window: Duration,
    /// Capacity of the LE discovery event channel
    pub channel_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_window: Duration::from_secs(10),
            channel_capacity: 64,
        }
    }
}

impl ScanConfig {
    /// Create a scan configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scan window duration
    pub fn with_scan_window(mut self, window: Duration) -> Self {
        self.scan_window = window;
        self
    }

    /// Set the LE event channel capacity
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}
