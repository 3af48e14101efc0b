// Root module exports
pub mod classes;
pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod reconcile;
pub mod registry;
pub mod scan;

// Re-export common items for convenience
pub use config::AgentConfig;
pub use device::PeripheralRecord;
pub use error::{AgentError, Result};
pub use logging::init_logging;
pub use reconcile::{needs_publish, PublishState, Reconciler, ScanOutcome};
pub use registry::{wait_bootstrap, HttpRegistry, QueryOutcome, Registry};
pub use scan::{LeScanner, PolledScanner, ScanConfig};
