//! Peripheral record data model
//!
//! The normalized unit of device information exchanged between the scanners,
//! the reconciler and the registry. Classic devices are keyed per hardware
//! address; LE peripherals share the fixed `bluetooth-le` identifier and are
//! told apart by their interface address, because advertisements offer no
//! stable name-space across sessions.

use serde::{Deserialize, Serialize};

/// Transport tag used for classic records and the degraded sentinel
pub const CLASSIC_INTERFACE: &str = "bluetooth";

/// Fixed identifier shared by all LE records
pub const LE_IDENTIFIER: &str = "bluetooth-le";

/// One discovered or registered device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralRecord {
    /// Unique key within the transport namespace
    pub identifier: String,
    /// Whether the device currently responds
    pub available: bool,
    /// Human-readable name, empty if the scan did not resolve one
    #[serde(default)]
    pub name: String,
    /// Semantic categories decoded from the class-of-device bitfield
    #[serde(default)]
    pub classes: Vec<String>,
    /// Transport-level address (MAC) or transport tag
    pub interface: String,
}

impl PeripheralRecord {
    /// Record for a classic device that answered an inquiry with a name
    pub fn classic(
        address: impl Into<String>,
        name: impl Into<String>,
        classes: Vec<String>,
    ) -> Self {
        Self {
            identifier: address.into(),
            available: true,
            name: name.into(),
            classes,
            interface: CLASSIC_INTERFACE.to_string(),
        }
    }

    /// Record for an LE peripheral seen in an advertisement
    ///
    /// Name and classes start empty; the LE scanner fills them in from the
    /// advertisement payload when present.
    pub fn le(address: impl Into<String>, connectable: bool) -> Self {
        Self {
            identifier: LE_IDENTIFIER.to_string(),
            available: connectable,
            name: String::new(),
            classes: Vec::new(),
            interface: address.into(),
        }
    }

    /// Degraded sentinel standing in for a result set when scanning itself
    /// failed: only the existence flag and the interface tag survive.
    pub fn unavailable(interface: impl Into<String>) -> Self {
        let interface = interface.into();
        Self {
            identifier: interface.clone(),
            available: false,
            name: String::new(),
            classes: Vec::new(),
            interface,
        }
    }
}

/// Sort records by (identifier, interface) so that set comparison is
/// order-insensitive. Scan order and registry order both vary run to run,
/// which must not read as drift.
pub fn normalize(records: &mut [PeripheralRecord]) {
    records.sort_by(|a, b| {
        (a.identifier.as_str(), a.interface.as_str())
            .cmp(&(b.identifier.as_str(), b.interface.as_str()))
    });
}
