//! Error types for homedns
//!
//! Every stage of a sync run fails with its own category so the binary can
//! report which stage aborted the run.

use thiserror::Error;

/// Result type alias for homedns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for homedns
#[derive(Error, Debug)]
pub enum Error {
    /// A required startup parameter is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// The public IP could not be discovered, was ambiguous, malformed or private
    #[error("Error getting public IP: {0}")]
    Resolution(String),

    /// Domain or record fetch from the provider failed
    #[error("Error getting DNS settings: {0}")]
    Lookup(String),

    /// Record create or update failed
    #[error("Error writing DNS record: {0}")]
    Reconcile(String),

    /// Provider-specific error, wrapped into a stage error by the engine
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a lookup error
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Create a reconcile error
    pub fn reconcile(msg: impl Into<String>) -> Self {
        Self::Reconcile(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error was caused by startup configuration rather than
    /// by a failed network stage
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
