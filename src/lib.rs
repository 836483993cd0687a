//! cgnat-check - Carrier-Grade NAT detection
//!
//! This library inspects the host's interface addresses and the externally
//! visible address (discovered over STUN or an HTTP IP-echo service) and
//! decides whether the host sits behind CGNAT (RFC 6598, 100.64.0.0/10).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod connectivity;

use connectivity::DetectionError;
use tracing_subscriber::EnvFilter;

/// Result type alias for cgnat-check operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cgnat-check operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Detection pass failed
    #[error(transparent)]
    Detection(#[from] DetectionError),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code for this error
    ///
    /// Detection errors map through [`connectivity::ErrorKind::exit_code`];
    /// everything else is a configuration/setup failure (1).
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Detection(e) => e.kind().exit_code(),
            Error::Config(_) | Error::Io(_) | Error::JsonSerialization(_) => 1,
        }
    }
}

/// Initialize logging
///
/// Logs go to stderr so the report on stdout stays machine-readable.
/// The level defaults to `warn` and can be raised with `RUST_LOG`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests;
