//! Common types for connectivity module

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Errors that can occur during a detection pass
#[derive(Debug, Error)]
pub enum DetectionError {
    /// The platform interface list could not be obtained
    #[error("Interface enumeration failed: {0}")]
    InterfaceEnumeration(String),

    /// Network timeout waiting for a response
    #[error("Request timed out")]
    Timeout,

    /// IO error during communication
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// STUN response carried no XOR-MAPPED-ADDRESS attribute
    #[error("STUN response has no XOR-MAPPED-ADDRESS attribute")]
    MissingAttribute,

    /// Discovered address is not IPv4
    #[error("Public address {0} is not IPv4")]
    NotIpv4(IpAddr),
}

impl DetectionError {
    /// Coarse classification used for reporting and exit codes
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InterfaceEnumeration(_) => ErrorKind::InterfaceEnumeration,
            Self::Timeout | Self::Io(_) | Self::Http(_) => ErrorKind::Network,
            Self::InvalidResponse(_) | Self::MissingAttribute | Self::NotIpv4(_) => {
                ErrorKind::Protocol
            }
        }
    }
}

/// Error taxonomy of a detection run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local interface list unavailable
    InterfaceEnumeration,
    /// Connection, transport or timeout failure
    Network,
    /// Malformed or incomplete response
    Protocol,
}

impl ErrorKind {
    /// Process exit code for this kind of failure
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InterfaceEnumeration => 2,
            Self::Network => 3,
            Self::Protocol => 4,
        }
    }
}

/// Method used to discover the public address
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublicIpMethod {
    /// STUN Binding Request (RFC 5389)
    #[default]
    Stun,
    /// Plain-text HTTP IP-echo service
    Http,
}

impl fmt::Display for PublicIpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stun => write!(f, "STUN"),
            Self::Http => write!(f, "HTTP"),
        }
    }
}

/// Outcome of a CGNAT classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// A local interface holds an address in 100.64.0.0/10
    CgnatConfirmed,
    /// Neither local nor public address is in the shared range
    LikelyCommonNatOrPublic,
    /// No local CGNAT address, yet the public address is in the shared range
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CgnatConfirmed => write!(f, "CGNAT confirmed"),
            Self::LikelyCommonNatOrPublic => write!(f, "Likely common NAT or public IP"),
            Self::Inconclusive => write!(f, "NAT detection inconclusive"),
        }
    }
}

/// Complete result of a detection pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionReport {
    /// IPv4 addresses found on local interfaces
    pub local_addresses: Vec<Ipv4Addr>,
    /// Whether any local address is in the CGNAT range
    pub local_cgnat: bool,
    /// Public address as seen from outside
    pub public_ip: Ipv4Addr,
    /// Whether the public address itself is in the CGNAT range
    pub public_cgnat: bool,
    /// Method used for the public lookup
    pub method: PublicIpMethod,
    /// STUN server or HTTP endpoint queried
    pub endpoint: String,
    /// Final classification
    pub verdict: Verdict,
    /// When the pass completed
    pub checked_at: DateTime<Utc>,
}

impl DetectionReport {
    /// Human-readable report, one fact per line
    pub fn summary(&self) -> String {
        let lines = [
            format!("Local CGNAT detected: {}", self.local_cgnat),
            format!(
                "Public IP: {} (via {} {})",
                self.public_ip, self.method, self.endpoint
            ),
            format!("Public IP in CGNAT range: {}", self.public_cgnat),
            self.verdict.to_string(),
        ];
        lines.join("\n")
    }
}
