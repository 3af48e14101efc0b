//! Error types for the bluewatch agent

use thiserror::Error;

/// Top-level agent error type
#[derive(Debug, Error)]
pub enum AgentError {
    /// Bluetooth adapter or scan error
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Registry HTTP transport error
    #[error("Registry request failed: {0}")]
    Registry(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AgentError>;

impl From<String> for AgentError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for AgentError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}
