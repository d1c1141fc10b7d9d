//! Error types for the DDNS system
//!
//! This module defines all error types used throughout the crate.
//!
//! Failures fall in three groups:
//! - transport failures reaching the provider or the resolver,
//! - application failures (provider envelope, malformed WAN IP),
//! - configuration failures, which are fatal at startup.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP-level failure talking to the provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with `success: false`
    #[error("Provider response error: {0}")]
    Response(String),

    /// The WAN IP echo service returned something that is not an address
    #[error("WAN IP query failed: {0}")]
    QueryFailed(String),

    /// Name resolution or socket failure on the WAN IP path
    #[error("Resolution error: {0}")]
    Resolve(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a provider response error
    pub fn response(msg: impl Into<String>) -> Self {
        Self::Response(msg.into())
    }

    /// Create a WAN IP query error
    pub fn query_failed(msg: impl Into<String>) -> Self {
        Self::QueryFailed(msg.into())
    }

    /// Create a resolution error
    pub fn resolve(msg: impl Into<String>) -> Self {
        Self::Resolve(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this failure happened below the application protocol
    /// (connection, timeout, lookup, socket).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Resolve(_))
    }
}
