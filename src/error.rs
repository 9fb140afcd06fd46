use std::io;
use thiserror::Error;

/// Custom error type for the beacon agent
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Collector error: {0}")]
    Collector(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Result type alias for the beacon agent
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        AgentError::Config(msg.into())
    }

    /// Create a collector error
    pub fn collector<S: Into<String>>(msg: S) -> Self {
        AgentError::Collector(msg.into())
    }

    /// Create a delivery error
    pub fn delivery<S: Into<String>>(msg: S) -> Self {
        AgentError::Delivery(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        AgentError::PermissionDenied(msg.into())
    }
}
