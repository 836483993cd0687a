//! CGNAT (Carrier-Grade NAT) range classification
//!
//! CGNAT deployments number customer-facing links out of the shared address
//! space 100.64.0.0/10 (RFC 6598). An address in that block on a local
//! interface, or reported back as our public address, points at an ISP-side
//! NAT layer.

use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, warn};

/// An IPv4 CIDR block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CgnatRange {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl CgnatRange {
    /// RFC 6598 shared address space: 100.64.0.0/10
    pub const SHARED_ADDRESS_SPACE: CgnatRange = CgnatRange {
        network: Ipv4Addr::new(100, 64, 0, 0),
        prefix_len: 10,
    };

    /// Create a range from a network address and prefix length
    ///
    /// Host bits in `network` are cleared. Returns `None` if `prefix_len > 32`.
    pub fn new(network: Ipv4Addr, prefix_len: u8) -> Option<Self> {
        if prefix_len > 32 {
            return None;
        }
        let masked = u32::from(network) & mask(prefix_len);
        Some(Self {
            network: Ipv4Addr::from(masked),
            prefix_len,
        })
    }

    /// Network address of the block
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// Prefix length of the block
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// First address in the block (inclusive)
    pub fn first(&self) -> Ipv4Addr {
        self.network
    }

    /// Last address in the block (inclusive)
    pub fn last(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network) | !mask(self.prefix_len))
    }

    /// Check whether `addr` falls inside the block
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let m = mask(self.prefix_len);
        u32::from(addr) & m == u32::from(self.network) & m
    }
}

impl Default for CgnatRange {
    fn default() -> Self {
        Self::SHARED_ADDRESS_SPACE
    }
}

impl std::fmt::Display for CgnatRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

fn mask(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        n => u32::MAX << (32 - u32::from(n)),
    }
}

/// Check if an IPv4 address is in 100.64.0.0/10
///
/// # Example
///
/// ```
/// use std::net::Ipv4Addr;
/// use cgnat_check::connectivity::is_in_cgnat_range;
///
/// assert!(is_in_cgnat_range(Ipv4Addr::new(100, 64, 0, 1)));
/// assert!(!is_in_cgnat_range(Ipv4Addr::new(203, 0, 113, 5)));
/// ```
pub fn is_in_cgnat_range(addr: Ipv4Addr) -> bool {
    CgnatRange::SHARED_ADDRESS_SPACE.contains(addr)
}

/// Detect if an IP address is within CGNAT range
///
/// IPv6 addresses are never in CGNAT range.
pub fn detect_cgnat(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let is_cgnat = is_in_cgnat_range(ipv4);
            if is_cgnat {
                warn!("{} is in CGNAT range {}", ipv4, CgnatRange::SHARED_ADDRESS_SPACE);
            } else {
                debug!("{} is not in CGNAT range", ipv4);
            }
            is_cgnat
        }
        IpAddr::V6(_) => {
            debug!("IPv6 address - CGNAT not applicable");
            false
        }
    }
}

/// Textual variant of [`detect_cgnat`]
///
/// Text that does not parse as an IPv4 address is treated as "not in range".
pub fn is_cgnat_str(ip: &str) -> bool {
    match ip.trim().parse::<Ipv4Addr>() {
        Ok(ipv4) => is_in_cgnat_range(ipv4),
        Err(_) => {
            debug!("Unparseable address {:?} treated as outside CGNAT range", ip);
            false
        }
    }
}
