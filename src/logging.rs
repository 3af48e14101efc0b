//! Logging setup for the agent
//!
//! Thin wrapper over env_logger: the configured level is the default filter
//! and `RUST_LOG` still wins when set, so a misbehaving deployment can be
//! turned verbose without touching its config.

use env_logger::{Builder, Env};

use crate::config::LogLevel;

/// Initialize the process-wide logger
///
/// Safe to call more than once; only the first call takes effect (tests
/// share one process).
pub fn init_logging(level: LogLevel) {
    let env = Env::default().default_filter_or(level.as_filter_str());
    let _ = Builder::from_env(env)
        .format_timestamp_millis()
        .format_module_path(true)
        .try_init();
}
