//! Error hierarchy for Password Purgatory.

use thiserror::Error;

/// Errors from the key-value layer that holds session histories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or the I/O failed.
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    /// The stored value is neither the placeholder nor a JSON attempt array.
    #[error("Stored value for '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid store key '{key}'")]
    InvalidKey { key: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::unavailable(e.to_string())
    }
}

/// Errors from outbound notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification rejected: {status} {message}")]
    Rejected { status: u16, message: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Server error: {status} {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Notification sink is not configured: {0}")]
    NotConfigured(String),
}

impl NotifyError {
    /// Whether sending the same notice again could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Server { .. } | Self::Network(_) | Self::Timeout
        )
    }
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
