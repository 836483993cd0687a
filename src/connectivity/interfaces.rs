//! Local interface address enumeration

use super::types::DetectionError;
use pnet::ipnetwork::IpNetwork;
use std::net::Ipv4Addr;
use tracing::{debug, trace};

/// Source of the host's local IPv4 addresses
pub trait LocalAddressSource: Send + Sync {
    /// List every IPv4 address assigned to a local interface
    ///
    /// Fails only if the interface list itself is unavailable.
    fn list_ipv4(&self) -> Result<Vec<Ipv4Addr>, DetectionError>;
}

/// Reads the operating system's interface table
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl LocalAddressSource for SystemInterfaces {
    fn list_ipv4(&self) -> Result<Vec<Ipv4Addr>, DetectionError> {
        list_local_ipv4_addresses()
    }
}

/// Return all IPv4 addresses of the current host interfaces
///
/// Order follows the OS-reported interface order. Loopback and link-local
/// addresses are included. A host without IPv4 addresses yields an empty list.
pub fn list_local_ipv4_addresses() -> Result<Vec<Ipv4Addr>, DetectionError> {
    #[cfg(any(unix, windows))]
    {
        let interfaces = pnet::datalink::interfaces();
        debug!("Enumerated {} network interfaces", interfaces.len());

        let mut addrs = Vec::new();
        for iface in &interfaces {
            let found = ipv4_from_networks(&iface.ips);
            if found.is_empty() {
                trace!(interface = %iface.name, "no IPv4 addresses, skipping");
                continue;
            }
            debug!(interface = %iface.name, addresses = ?found, "local IPv4 addresses");
            addrs.extend(found);
        }

        Ok(addrs)
    }

    #[cfg(not(any(unix, windows)))]
    {
        Err(DetectionError::InterfaceEnumeration(
            "unsupported platform".to_string(),
        ))
    }
}

/// Keep the IPv4 host addresses of an interface's networks
///
/// IPv6 entries are skipped silently.
pub fn ipv4_from_networks<'a, I>(networks: I) -> Vec<Ipv4Addr>
where
    I: IntoIterator<Item = &'a IpNetwork>,
{
    networks
        .into_iter()
        .filter_map(|net| match net {
            IpNetwork::V4(v4) => Some(v4.ip()),
            IpNetwork::V6(_) => None,
        })
        .collect()
}
