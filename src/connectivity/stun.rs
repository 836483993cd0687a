//! STUN public address discovery - RFC 5389
//!
//! A single Binding Request is sent over UDP and the XOR-MAPPED-ADDRESS
//! attribute of the Binding Success Response is decoded into the address the
//! server saw us as.
//!
//! # Message Layout
//!
//! ```text
//!  0                   1                   2                   3
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |0 0|     STUN Message Type     |         Message Length        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         Magic Cookie                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                     Transaction ID (96 bits)                  |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use cgnat_check::connectivity::discover_public_ip_via_stun;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ip = discover_public_ip_via_stun("stun.l.google.com:19302", Duration::from_secs(5)).await?;
//! println!("Public IP: {}", ip);
//! # Ok(())
//! # }
//! ```

use super::types::DetectionError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, info};

/// Default public STUN server
pub const DEFAULT_STUN_SERVER: &str = "stun.l.google.com:19302";

/// Fixed magic cookie carried in every RFC 5389 message
pub(crate) const STUN_MAGIC_COOKIE: u32 = 0x2112_A442;

/// STUN header length in bytes
pub(crate) const STUN_HEADER_LEN: usize = 20;

/// Largest datagram we accept as a response
const MAX_RESPONSE_LEN: usize = 576;

/// 96-bit transaction identifier
pub type TransactionId = [u8; 12];

/// STUN message types used by a Binding transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub(crate) enum StunMessageType {
    BindingRequest = 0x0001,
    BindingSuccess = 0x0101,
    BindingError = 0x0111,
}

impl StunMessageType {
    pub(crate) fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0001 => Some(Self::BindingRequest),
            0x0101 => Some(Self::BindingSuccess),
            0x0111 => Some(Self::BindingError),
            _ => None,
        }
    }
}

/// Attribute types we read
pub(crate) const ATTR_ERROR_CODE: u16 = 0x0009;
pub(crate) const ATTR_XOR_MAPPED_ADDRESS: u16 = 0x0020;

/// Address families inside (XOR-)MAPPED-ADDRESS
pub(crate) const FAMILY_IPV4: u8 = 0x01;
pub(crate) const FAMILY_IPV6: u8 = 0x02;

/// Generate a fresh random transaction ID
pub fn new_transaction_id() -> TransactionId {
    rand::random()
}

/// Discover our public IPv4 address with one STUN Binding exchange
///
/// # Errors
///
/// - `DetectionError::Timeout` if no response arrives within `timeout`
/// - `DetectionError::Io` on resolution or socket failure
/// - `DetectionError::InvalidResponse` / `MissingAttribute` on a bad response
/// - `DetectionError::NotIpv4` if the server reports an IPv6 address
pub async fn discover_public_ip_via_stun(
    server: &str,
    timeout: Duration,
) -> Result<Ipv4Addr, DetectionError> {
    let mapped = discover_mapped_address(server, timeout).await?;
    match mapped.ip() {
        IpAddr::V4(ip) => Ok(ip),
        ip @ IpAddr::V6(_) => Err(DetectionError::NotIpv4(ip)),
    }
}

/// Discover the public transport address (IP and port) seen by a STUN server
///
/// The whole exchange, including name resolution, is bounded by `timeout`.
pub async fn discover_mapped_address(
    server: &str,
    timeout: Duration,
) -> Result<SocketAddr, DetectionError> {
    info!("Querying STUN server {} (timeout {:?})", server, timeout);

    let mapped = tokio::time::timeout(timeout, binding_exchange(server))
        .await
        .map_err(|_| DetectionError::Timeout)??;

    info!("STUN mapped address: {}", mapped);
    Ok(mapped)
}

async fn binding_exchange(server: &str) -> Result<SocketAddr, DetectionError> {
    let server_addr = lookup_host(server).await?.next().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("STUN server {} did not resolve", server),
        )
    })?;
    debug!("Resolved STUN server {} to {}", server, server_addr);

    let bind_addr: SocketAddr = match server_addr {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(bind_addr).await?;
    socket.connect(server_addr).await?;

    let transaction_id = new_transaction_id();
    let request = build_binding_request(&transaction_id);
    socket.send(&request).await?;
    debug!(
        "Sent STUN Binding Request to {} (transaction {})",
        server_addr,
        hex::encode(transaction_id)
    );

    let mut response_buf = [0u8; MAX_RESPONSE_LEN];
    let bytes_received = socket.recv(&mut response_buf).await?;
    debug!("Received {} bytes from STUN server", bytes_received);

    parse_binding_response(&response_buf[..bytes_received], &transaction_id)
}

/// Build a STUN Binding Request (header only, no attributes)
pub fn build_binding_request(transaction_id: &TransactionId) -> Vec<u8> {
    let mut request = Vec::with_capacity(STUN_HEADER_LEN);

    // Message type (2 bytes)
    request.extend_from_slice(&(StunMessageType::BindingRequest as u16).to_be_bytes());

    // Message length (2 bytes) - no attributes
    request.extend_from_slice(&0u16.to_be_bytes());

    // Magic cookie (4 bytes)
    request.extend_from_slice(&STUN_MAGIC_COOKIE.to_be_bytes());

    // Transaction ID (12 bytes)
    request.extend_from_slice(transaction_id);

    request
}

/// Parse a STUN Binding response and extract XOR-MAPPED-ADDRESS
///
/// The response must echo `transaction_id`.
pub fn parse_binding_response(
    response: &[u8],
    transaction_id: &TransactionId,
) -> Result<SocketAddr, DetectionError> {
    if response.len() < STUN_HEADER_LEN {
        return Err(DetectionError::InvalidResponse(format!(
            "Response too short: {} bytes (expected at least {})",
            response.len(),
            STUN_HEADER_LEN
        )));
    }

    let raw_type = u16::from_be_bytes([response[0], response[1]]);
    if raw_type & 0xC000 != 0 {
        return Err(DetectionError::InvalidResponse(
            "Not a STUN message".to_string(),
        ));
    }

    let cookie = u32::from_be_bytes([response[4], response[5], response[6], response[7]]);
    if cookie != STUN_MAGIC_COOKIE {
        return Err(DetectionError::InvalidResponse(format!(
            "Invalid magic cookie: {:#010x}",
            cookie
        )));
    }

    if &response[8..STUN_HEADER_LEN] != transaction_id {
        return Err(DetectionError::InvalidResponse(
            "Transaction ID mismatch".to_string(),
        ));
    }

    let message_len = u16::from_be_bytes([response[2], response[3]]) as usize;
    if message_len % 4 != 0 || STUN_HEADER_LEN + message_len > response.len() {
        return Err(DetectionError::InvalidResponse(format!(
            "Bad message length: {} (datagram has {} attribute bytes)",
            message_len,
            response.len() - STUN_HEADER_LEN
        )));
    }
    let attributes = &response[STUN_HEADER_LEN..STUN_HEADER_LEN + message_len];

    match StunMessageType::from_u16(raw_type) {
        Some(StunMessageType::BindingSuccess) => {}
        Some(StunMessageType::BindingError) => {
            let reason = find_attribute(attributes, ATTR_ERROR_CODE)?
                .map(describe_error_code)
                .unwrap_or_else(|| "no error code".to_string());
            return Err(DetectionError::InvalidResponse(format!(
                "Binding error response: {}",
                reason
            )));
        }
        _ => {
            return Err(DetectionError::InvalidResponse(format!(
                "Unexpected message type: {:#06x}",
                raw_type
            )));
        }
    }

    let value = find_attribute(attributes, ATTR_XOR_MAPPED_ADDRESS)?
        .ok_or(DetectionError::MissingAttribute)?;
    decode_xor_mapped_address(value, transaction_id)
}

/// Walk the attribute list and return the value of the first `wanted` attribute
fn find_attribute(attributes: &[u8], wanted: u16) -> Result<Option<&[u8]>, DetectionError> {
    let mut offset = 0;

    while offset + 4 <= attributes.len() {
        let attr_type = u16::from_be_bytes([attributes[offset], attributes[offset + 1]]);
        let attr_len = u16::from_be_bytes([attributes[offset + 2], attributes[offset + 3]]) as usize;

        let value_start = offset + 4;
        let value_end = value_start + attr_len;
        if value_end > attributes.len() {
            return Err(DetectionError::InvalidResponse(format!(
                "Attribute {:#06x} overruns message ({} > {})",
                attr_type,
                value_end,
                attributes.len()
            )));
        }

        if attr_type == wanted {
            return Ok(Some(&attributes[value_start..value_end]));
        }

        // Values are padded to a 4-byte boundary
        offset = value_start + ((attr_len + 3) & !3);
    }

    Ok(None)
}

/// Decode an XOR-MAPPED-ADDRESS attribute value
pub(crate) fn decode_xor_mapped_address(
    value: &[u8],
    transaction_id: &TransactionId,
) -> Result<SocketAddr, DetectionError> {
    if value.len() < 4 {
        return Err(DetectionError::InvalidResponse(format!(
            "XOR-MAPPED-ADDRESS too short: {} bytes",
            value.len()
        )));
    }

    let family = value[1];
    let port = u16::from_be_bytes([value[2], value[3]]) ^ (STUN_MAGIC_COOKIE >> 16) as u16;

    let ip = match family {
        FAMILY_IPV4 => {
            if value.len() < 8 {
                return Err(DetectionError::InvalidResponse(format!(
                    "IPv4 XOR-MAPPED-ADDRESS too short: {} bytes",
                    value.len()
                )));
            }
            let xaddr = u32::from_be_bytes([value[4], value[5], value[6], value[7]]);
            IpAddr::V4(Ipv4Addr::from(xaddr ^ STUN_MAGIC_COOKIE))
        }
        FAMILY_IPV6 => {
            if value.len() < 20 {
                return Err(DetectionError::InvalidResponse(format!(
                    "IPv6 XOR-MAPPED-ADDRESS too short: {} bytes",
                    value.len()
                )));
            }
            let mut key = [0u8; 16];
            key[..4].copy_from_slice(&STUN_MAGIC_COOKIE.to_be_bytes());
            key[4..].copy_from_slice(transaction_id);

            let mut octets = [0u8; 16];
            for (i, octet) in octets.iter_mut().enumerate() {
                *octet = value[4 + i] ^ key[i];
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        other => {
            return Err(DetectionError::InvalidResponse(format!(
                "Unknown address family: {:#04x}",
                other
            )));
        }
    };

    Ok(SocketAddr::new(ip, port))
}

/// Render an ERROR-CODE attribute as "<code> <reason>"
fn describe_error_code(value: &[u8]) -> String {
    if value.len() < 4 {
        return "malformed error code".to_string();
    }
    let code = u16::from(value[2] & 0x07) * 100 + u16::from(value[3]);
    let reason = String::from_utf8_lossy(&value[4..]);
    format!("{} {}", code, reason.trim_end_matches('\0'))
}
