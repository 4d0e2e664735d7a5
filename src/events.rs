use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::oneshot;

/// Canonical identity of a discovered host: (MAC, IPv4). Equality is
/// bit-identical octet comparison, not string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostKey {
    pub mac: [u8; 6],
    pub ip: [u8; 4],
}

impl HostKey {
    pub fn new(mac: [u8; 6], ip: [u8; 4]) -> Self {
        Self { mac, ip }
    }

    pub fn mac_string(&self) -> String {
        self.mac
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":")
    }

    pub fn ip_string(&self) -> String {
        self.ip
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// A single discovered host. Once inserted, `mac`/`ip` never change —
/// only `last_seen` and the three name fields mutate.
#[derive(Debug, Clone)]
pub struct Host {
    pub last_seen: Instant,
    pub mac: [u8; 6],
    pub ip: [u8; 4],
    pub dns: String,
    pub nbns: String,
    pub mdns: String,
}

impl Host {
    pub fn new(key: HostKey, now: Instant) -> Self {
        Self {
            last_seen: now,
            mac: key.mac,
            ip: key.ip,
            dns: String::new(),
            nbns: String::new(),
            mdns: String::new(),
        }
    }
}

/// A point-in-time, independently-owned copy of the host table. No
/// references back into the event loop's map are ever handed out.
pub type HostSnapshot = HashMap<HostKey, Host>;

/// Serializable row shape used by the HTTP JSON endpoint and the TUI table.
#[derive(Debug, Clone, Serialize)]
pub struct HostRow {
    pub id: String,
    pub last_seen: String,
    pub mac_addr: String,
    pub ip: String,
    pub vendor: String,
    pub dns: String,
    pub nbns: String,
    pub mdns: String,
}

fn dash_if_empty(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

impl HostRow {
    pub fn from_host(key: &HostKey, host: &Host, vendor: &str, now_wall: chrono::DateTime<chrono::Local>, now_mono: Instant) -> Self {
        // last_seen is stored as a monotonic Instant; to render a wall-clock
        // timestamp we anchor to "now" and subtract the monotonic delta.
        let delta = now_mono.saturating_duration_since(host.last_seen);
        let wall = now_wall - chrono::Duration::from_std(delta).unwrap_or_default();
        Self {
            id: format!("{}_{}", key.mac_string(), key.ip_string()),
            last_seen: wall.format("%b %-d %H:%M:%S").to_string(),
            mac_addr: key.mac_string(),
            ip: key.ip_string(),
            vendor: vendor.to_string(),
            dns: dash_if_empty(&host.dns),
            nbns: dash_if_empty(&host.nbns),
            mdns: dash_if_empty(&host.mdns),
        }
    }
}

/// Events accepted by the event loop (§3). This is the sole mutation
/// surface for the host table.
pub enum Event {
    ArpSeen {
        src_mac: [u8; 6],
        src_ip: [u8; 4],
    },
    DnsResolved {
        key: HostKey,
        name: String,
    },
    NbnsSeen {
        src_mac: [u8; 6],
        src_ip: [u8; 4],
        name: String,
    },
    MdnsSeen {
        src_mac: [u8; 6],
        src_ip: [u8; 4],
        domain: String,
    },
    SnapshotRequest {
        reply: oneshot::Sender<HostSnapshot>,
        ack: oneshot::Receiver<()>,
    },
    Terminate,
}
