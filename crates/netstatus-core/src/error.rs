//! Error types for the netstatus system
//!
//! This module defines all error types used throughout the crate.
//!
//! Most of these never reach an application: detection failures are absorbed
//! by the driver and turned into a degraded [`ConnectionState`](crate::ConnectionState).
//! They exist so collaborators can report *what* went wrong, which is then logged.

use thiserror::Error;

/// Result type alias for netstatus operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the netstatus system
#[derive(Error, Debug)]
pub enum Error {
    /// Reachability probe failed (not the same as "offline")
    #[error("Reachability probe error: {0}")]
    Probe(String),

    /// Reachability probe did not answer in time
    #[error("Reachability probe timed out after {0} ms")]
    ProbeTimeout(u64),

    /// Active interface enumeration failed
    #[error("Interface enumeration error: {0}")]
    Interface(String),

    /// A subscriber rejected a change notification
    #[error("Subscriber error: {0}")]
    Subscriber(String),

    /// Bridge-level failures (unknown service, unhandled action, dropped callback)
    #[error("Bridge error: {0}")]
    Bridge(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument passed to a bridge action
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors from platform collaborators
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a reachability probe error
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Create an interface enumeration error
    pub fn interface(msg: impl Into<String>) -> Self {
        Self::Interface(msg.into())
    }

    /// Create a subscriber error
    pub fn subscriber(msg: impl Into<String>) -> Self {
        Self::Subscriber(msg.into())
    }

    /// Create a bridge error
    pub fn bridge(msg: impl Into<String>) -> Self {
        Self::Bridge(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
