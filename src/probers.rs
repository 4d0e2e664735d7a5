//! Active probers (C8): two continuous sweeps (ARP, mDNS) plus one-shot
//! probes spawned by the event loop for newly-seen hosts (mDNS, NBNS).
//!
//! Periodic sweeps write raw frames through the shared link socket.
//! The NBNS one-shot probe instead opens a throwaway OS UDP socket —
//! unlike the multicast mDNS query, a unicast NBNS request doesn't need
//! hand-crafted Ethernet/IP framing, so there is no reason to bypass
//! the kernel's own UDP stack for it.

use std::time::Duration;

use rand::RngCore;
use tokio::net::UdpSocket;
use tokio::time::sleep;

use crate::error::DiscoverError;
use crate::link::LinkSender;
use crate::net::{arp, mdns, nbns};
use crate::subnet::available_targets;

const ARP_INTER_ADDRESS_DELAY: Duration = Duration::from_millis(50);
const ARP_INTER_SWEEP_DELAY: Duration = Duration::from_secs(10);
const MDNS_INTER_ADDRESS_DELAY: Duration = Duration::from_millis(200);

/// Continuous ARP sweep: a fresh random permutation of the /24 every
/// round, one request every 50ms, 10s between full sweeps.
pub async fn arp_prober(link: LinkSender, own_mac: [u8; 6], own_ip: [u8; 4]) {
    loop {
        for target in available_targets(own_ip) {
            let frame = arp::build_request(own_mac, own_ip, target);
            link.send(frame);
            sleep(ARP_INTER_ADDRESS_DELAY).await;
        }
        sleep(ARP_INTER_SWEEP_DELAY).await;
    }
}

/// Continuous mDNS PTR sweep: a fresh permutation every round, one
/// query every 200ms, no additional inter-sweep delay (the sweep
/// itself already takes roughly a minute).
pub async fn mdns_prober(link: LinkSender, own_mac: [u8; 6], own_ip: [u8; 4]) {
    loop {
        for target in available_targets(own_ip) {
            let frame = mdns::build_query_frame(own_mac, own_ip, target);
            link.send(frame);
            sleep(MDNS_INTER_ADDRESS_DELAY).await;
        }
    }
}

/// One-shot mDNS PTR probe targeted at a single newly-seen host.
pub async fn mdns_probe_once(link: LinkSender, own_mac: [u8; 6], own_ip: [u8; 4], target_ip: [u8; 4]) {
    let frame = mdns::build_query_frame(own_mac, own_ip, target_ip);
    link.send(frame);
}

/// One-shot NBNS NB_STAT probe targeted at a single newly-seen host.
/// The socket is bound on an ephemeral port and dropped immediately
/// after the write completes, even though this can elicit an ICMP
/// port-unreachable reply; that's an accepted trade-off against letting
/// open sockets accumulate.
pub async fn nbns_probe_once(target_ip: [u8; 4]) {
    let transaction_id = rand::thread_rng().next_u32() as u16;
    let query = nbns::build_query(transaction_id);

    let socket = match UdpSocket::bind(("0.0.0.0", 0)).await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %DiscoverError::AuxIo(e), "failed to bind ephemeral nbns socket");
            return;
        }
    };

    let dest = (std::net::Ipv4Addr::from(target_ip), nbns::SERVICE_PORT);
    if let Err(e) = socket.send_to(&query, dest).await {
        tracing::warn!(error = %DiscoverError::AuxIo(e), ip = ?target_ip, "nbns probe send failed");
    }
}
