//! Layered error definitions
//!
//! Categorized by source: config / lifecycle / collector

use thiserror::Error;

use crate::SensorChannel;

/// Unified error type
#[derive(Debug, Error)]
pub enum SyncError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Lifecycle Errors =====
    /// start() was invoked while the syncer is already running
    #[error("syncer is already running")]
    AlreadyRunning,

    // ===== Collector Errors =====
    /// A channel collector failed to register with the hardware
    #[error("collector for channel '{channel}' failed to start")]
    CollectorStart { channel: SensorChannel },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create collector start error
    pub fn collector_start(channel: SensorChannel) -> Self {
        Self::CollectorStart { channel }
    }
}
