//! Connectivity module for CGNAT detection
//!
//! This module provides the pieces of a detection pass:
//! - Local interface enumeration
//! - Public address discovery over STUN (RFC 5389) or an HTTP IP-echo service
//! - Shared address space classification (RFC 6598)
//! - The verdict decision table and the orchestrator tying them together

// Submodules
pub mod cgnat;
pub mod decision;
pub mod http_ip;
pub mod interfaces;
pub mod orchestrator;
pub mod source;
pub mod stun;
pub mod types;

// Re-export commonly used types
pub use types::{DetectionError, DetectionReport, ErrorKind, PublicIpMethod, Verdict};

// Re-export main functions
pub use cgnat::{detect_cgnat, is_cgnat_str, is_in_cgnat_range, CgnatRange};
pub use decision::classify;
pub use http_ip::{discover_public_ip_via_http, parse_ip_body, DEFAULT_HTTP_ENDPOINT};
pub use interfaces::{list_local_ipv4_addresses, LocalAddressSource, SystemInterfaces};
pub use orchestrator::run_detection;
pub use source::{public_source_from_settings, HttpSource, PublicAddressSource, StunSource};
pub use stun::{
    build_binding_request, discover_mapped_address, discover_public_ip_via_stun,
    parse_binding_response, TransactionId, DEFAULT_STUN_SERVER,
};
