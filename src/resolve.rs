//! One-shot reverse-DNS resolution via the operating system's resolver.

use std::net::IpAddr;

use dns_lookup::lookup_addr;
use tokio::sync::mpsc;

use crate::events::{Event, HostKey};

/// Look up `key.ip` via the OS resolver on a blocking-pool thread and,
/// on success, emit `DnsResolved` to the event loop. Lookup failures and
/// empty results are silently dropped — this never surfaces an error to
/// the caller, matching the "never blocks other components" contract.
pub async fn resolve_one(key: HostKey, events: mpsc::Sender<Event>) {
    let ip = IpAddr::V4(key.ip.into());
    let name = tokio::task::spawn_blocking(move || lookup_addr(&ip).ok()).await.unwrap_or(None);

    let Some(name) = name else { return };
    let name = name.strip_suffix('.').unwrap_or(&name).to_string();
    if name.is_empty() {
        return;
    }

    let _ = events.send(Event::DnsResolved { key, name }).await;
}
