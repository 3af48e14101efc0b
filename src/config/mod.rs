//! Agent configuration
//!
//! All knobs live in an explicit [`AgentConfig`] that is passed into each
//! component at construction. Values come from environment variables with
//! sensible defaults, so the daemon runs unconfigured inside the edge stack.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::scan::ScanConfig;

/// Base URL of the local agent API hosting the peripheral registry
pub const DEFAULT_REGISTRY_URL: &str = "http://agent/api";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment override could not be parsed
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Log verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive understood by env_logger
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the registry API
    pub registry_base_url: String,

    /// Delay between healthcheck attempts while waiting for the agent API
    pub bootstrap_retry_interval: Duration,

    /// Idle time between reconcile cycles in polled mode
    pub poll_interval: Duration,

    /// How long each polled scan window stays open
    pub scan_window: Duration,

    /// Request timeout applied to every registry call
    pub http_timeout: Duration,

    /// Capacity of the LE discovery event channel
    pub le_channel_capacity: usize,

    /// Log verbosity
    pub log_level: LogLevel,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            registry_base_url: DEFAULT_REGISTRY_URL.to_string(),
            bootstrap_retry_interval: Duration::from_secs(5),
            poll_interval: Duration::from_secs(90),
            scan_window: Duration::from_secs(10),
            http_timeout: Duration::from_secs(10),
            le_channel_capacity: 64,
            log_level: LogLevel::default(),
        }
    }
}

impl AgentConfig {
    /// Build a configuration from the environment, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let registry_base_url = env::var("BLUEWATCH_REGISTRY_URL")
            .unwrap_or(defaults.registry_base_url);

        let poll_interval = duration_from_env(
            "BLUEWATCH_POLL_INTERVAL_SECS",
            defaults.poll_interval,
        )?;
        let scan_window =
            duration_from_env("BLUEWATCH_SCAN_WINDOW_SECS", defaults.scan_window)?;
        let http_timeout =
            duration_from_env("BLUEWATCH_HTTP_TIMEOUT_SECS", defaults.http_timeout)?;

        let log_level = match env::var("BLUEWATCH_LOG") {
            Ok(value) => value.parse().map_err(|reason| ConfigError::InvalidValue {
                var: "BLUEWATCH_LOG",
                value,
                reason,
            })?,
            Err(_) => defaults.log_level,
        };

        Ok(Self {
            registry_base_url,
            bootstrap_retry_interval: defaults.bootstrap_retry_interval,
            poll_interval,
            scan_window,
            http_timeout,
            le_channel_capacity: defaults.le_channel_capacity,
            log_level,
        })
    }

    /// Convert to a scan config for the scanners
    pub fn to_scan_config(&self) -> ScanConfig {
        ScanConfig::new()
            .with_scan_window(self.scan_window)
            .with_channel_capacity(self.le_channel_capacity)
    }
}

fn duration_from_env(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(var) {
        Ok(value) => {
            let secs = value.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                var,
                value: value.clone(),
                reason: e.to_string(),
            })?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(default),
    }
}
