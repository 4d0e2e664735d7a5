//! Interface selection and validation (C13, external to the discovery
//! core): picking the interface to run on, and checking it actually
//! satisfies the single-/24-broadcast-segment assumption the rest of
//! the system relies on.

use ipnetwork::IpNetwork;
use pnet::datalink::{self, NetworkInterface};

use crate::error::{DiscoverError, Result};

/// Picked interface plus the own IPv4 address and MAC the rest of the
/// system needs to build frames.
pub struct SelectedInterface {
    pub interface: NetworkInterface,
    pub own_mac: [u8; 6],
    pub own_ip: [u8; 4],
}

/// Enumerate interfaces and pick one by name, or fall back to the first
/// up, non-loopback interface carrying a /24 IPv4 address. Either way,
/// the chosen interface is validated before being returned.
pub fn select(name: Option<&str>) -> Result<SelectedInterface> {
    let interfaces = datalink::interfaces();

    let candidate = match name {
        Some(name) => interfaces
            .into_iter()
            .find(|i| i.name == name)
            .ok_or_else(|| DiscoverError::Config(format!("no such interface: {name}")))?,
        None => interfaces
            .into_iter()
            .find(|i| i.is_up() && !i.is_loopback() && i.mac.is_some() && has_ipv4_slash_24(i))
            .ok_or_else(|| DiscoverError::Config("no broadcast-capable /24 interface found".to_string()))?,
    };

    validate(candidate)
}

fn has_ipv4_slash_24(interface: &NetworkInterface) -> bool {
    interface.ips.iter().any(|net| matches!(net, IpNetwork::V4(v4) if v4.prefix() == 24))
}

fn validate(interface: NetworkInterface) -> Result<SelectedInterface> {
    if !interface.is_broadcast() {
        return Err(DiscoverError::Config(format!("interface {} has no broadcast flag set", interface.name)));
    }

    let own_mac = interface
        .mac
        .ok_or_else(|| DiscoverError::Config(format!("interface {} has no hardware address", interface.name)))?
        .octets();

    let own_ip = interface
        .ips
        .iter()
        .find_map(|net| match net {
            IpNetwork::V4(v4) if v4.prefix() == 24 => Some(v4.ip().octets()),
            _ => None,
        })
        .ok_or_else(|| DiscoverError::Config(format!("interface {} has no IPv4 /24 address", interface.name)))?;

    Ok(SelectedInterface {
        interface,
        own_mac,
        own_ip,
    })
}
