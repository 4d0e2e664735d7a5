//! Event loop and host table (C10) — the sole writer of host state.
//!
//! Every other task talks to the outside world through the `Event`
//! channel; nothing else ever touches the map directly. A
//! `SnapshotRequest` gets a deep clone of the table and must ack
//! promptly so it never starves listeners waiting behind it.

use std::time::Instant;

use tokio::sync::mpsc;

use crate::events::{Event, Host, HostKey, HostSnapshot};
use crate::link::LinkSender;
use crate::probers;
use crate::resolve;

pub struct EventLoop {
    events: mpsc::Receiver<Event>,
    events_tx: mpsc::Sender<Event>,
    link: LinkSender,
    own_mac: [u8; 6],
    own_ip: [u8; 4],
    passive: bool,
    table: HostSnapshot,
}

impl EventLoop {
    pub fn new(events: mpsc::Receiver<Event>, events_tx: mpsc::Sender<Event>, link: LinkSender, own_mac: [u8; 6], own_ip: [u8; 4], passive: bool) -> Self {
        Self {
            events,
            events_tx,
            link,
            own_mac,
            own_ip,
            passive,
            table: HostSnapshot::new(),
        }
    }

    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            match event {
                Event::Terminate => break,
                other => self.apply(other).await,
            }
        }
        self.drain().await;
    }

    /// After `Terminate`, keep consuming events (so senders never block
    /// forever) but answer every snapshot request with an empty map.
    async fn drain(mut self) {
        while let Some(event) = self.events.recv().await {
            if let Event::SnapshotRequest { reply, ack } = event {
                let _ = reply.send(HostSnapshot::new());
                let _ = ack.await;
            }
            // All other event kinds are simply discarded post-shutdown.
        }
    }

    async fn apply(&mut self, event: Event) {
        match event {
            Event::ArpSeen { src_mac, src_ip } => self.on_arp_seen(src_mac, src_ip).await,
            Event::NbnsSeen { src_mac, src_ip, name } => self.on_named_seen(src_mac, src_ip, |h| &mut h.nbns, name),
            Event::MdnsSeen { src_mac, src_ip, domain } => self.on_named_seen(src_mac, src_ip, |h| &mut h.mdns, domain),
            Event::DnsResolved { key, name } => {
                if let Some(host) = self.table.get_mut(&key) {
                    host.dns = name;
                }
            }
            Event::SnapshotRequest { reply, ack } => {
                let _ = reply.send(self.table.clone());
                let _ = ack.await;
            }
            Event::Terminate => unreachable!("handled by caller before dispatch"),
        }
    }

    async fn on_arp_seen(&mut self, src_mac: [u8; 6], src_ip: [u8; 4]) {
        let key = HostKey::new(src_mac, src_ip);
        let now = Instant::now();

        let is_new = !self.table.contains_key(&key);
        if is_new {
            self.table.insert(key, Host::new(key, now));
        } else if let Some(host) = self.table.get_mut(&key) {
            host.last_seen = now;
        }

        if is_new && !self.passive {
            self.spawn_new_host_probes(key);
        }
    }

    fn on_named_seen(&mut self, src_mac: [u8; 6], src_ip: [u8; 4], field: impl Fn(&mut Host) -> &mut String, value: String) {
        let key = HostKey::new(src_mac, src_ip);
        let now = Instant::now();

        let host = self.table.entry(key).or_insert_with(|| Host::new(key, now));
        host.last_seen = now;
        let slot = field(host);
        if *slot != value {
            *slot = value;
        }
    }

    fn spawn_new_host_probes(&self, key: HostKey) {
        let events_tx = self.events_tx.clone();
        tokio::spawn(resolve::resolve_one(key, events_tx));

        let link = self.link.clone();
        let own_mac = self.own_mac;
        let own_ip = self.own_ip;
        let target_ip = key.ip;
        tokio::spawn(async move {
            probers::mdns_probe_once(link, own_mac, own_ip, target_ip).await;
        });

        tokio::spawn(probers::nbns_probe_once(key.ip));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::{mpsc, oneshot};
    use tokio::time::timeout;

    use super::*;
    use crate::link::LinkSender;

    const MAC: [u8; 6] = [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff];
    const IP: [u8; 4] = [192, 168, 1, 42];

    fn new_loop(passive: bool) -> (EventLoop, mpsc::Sender<Event>, mpsc::Receiver<crate::link::Frame>) {
        let (events_tx, events_rx) = mpsc::channel(8);
        let (link_tx, link_rx) = mpsc::channel(8);
        let event_loop = EventLoop::new(events_rx, events_tx.clone(), LinkSender::from_channel(link_tx), MAC, IP, passive);
        (event_loop, events_tx, link_rx)
    }

    /// S1: a fresh ARP sighting creates exactly one host with the
    /// expected key, a non-zero `last_seen`, and empty name fields.
    #[tokio::test]
    async fn arp_seen_creates_host_with_empty_names() {
        let (mut event_loop, _events_tx, _link_rx) = new_loop(true);
        let before = Instant::now();

        event_loop.on_arp_seen(MAC, IP).await;

        let key = HostKey::new(MAC, IP);
        let host = event_loop.table.get(&key).expect("host recorded");
        assert!(host.last_seen >= before);
        assert_eq!(host.dns, "");
        assert_eq!(host.nbns, "");
        assert_eq!(host.mdns, "");
        assert_eq!(event_loop.table.len(), 1);
    }

    /// Seeing the same host again only refreshes `last_seen`, it never
    /// inserts a second entry.
    #[tokio::test]
    async fn repeated_arp_seen_updates_last_seen_without_duplicating() {
        let (mut event_loop, _events_tx, _link_rx) = new_loop(true);

        event_loop.on_arp_seen(MAC, IP).await;
        let first_seen = event_loop.table.get(&HostKey::new(MAC, IP)).unwrap().last_seen;

        tokio::time::sleep(Duration::from_millis(5)).await;
        event_loop.on_arp_seen(MAC, IP).await;

        assert_eq!(event_loop.table.len(), 1);
        let second_seen = event_loop.table.get(&HostKey::new(MAC, IP)).unwrap().last_seen;
        assert!(second_seen >= first_seen);
    }

    /// S2 (active mode): a newly-seen host triggers a probe that writes
    /// an mDNS query frame to the link socket.
    #[tokio::test]
    async fn new_host_spawns_probes_in_active_mode() {
        let (mut event_loop, _events_tx, mut link_rx) = new_loop(false);

        event_loop.on_arp_seen(MAC, IP).await;

        let frame = timeout(Duration::from_secs(1), link_rx.recv())
            .await
            .expect("mdns probe frame arrives")
            .expect("link channel open");
        assert!(!frame.is_empty());
    }

    /// S2 (passive mode): no probe of any kind writes to the link socket.
    #[tokio::test]
    async fn new_host_spawns_no_probes_in_passive_mode() {
        let (mut event_loop, _events_tx, mut link_rx) = new_loop(true);

        event_loop.on_arp_seen(MAC, IP).await;

        let result = timeout(Duration::from_millis(200), link_rx.recv()).await;
        assert!(result.is_err(), "expected no frame to be queued in passive mode");
    }

    /// After `Terminate`, the loop keeps answering `SnapshotRequest`s
    /// but with an empty table.
    #[tokio::test]
    async fn drain_phase_answers_snapshots_with_empty_table() {
        let (mut event_loop, events_tx, _link_rx) = new_loop(true);
        event_loop.on_arp_seen(MAC, IP).await;
        assert_eq!(event_loop.table.len(), 1);

        events_tx.send(Event::Terminate).await.unwrap();
        tokio::spawn(event_loop.run());

        let (reply_tx, reply_rx) = oneshot::channel();
        let (ack_tx, ack_rx) = oneshot::channel();
        events_tx.send(Event::SnapshotRequest { reply: reply_tx, ack: ack_rx }).await.unwrap();

        let snapshot = timeout(Duration::from_secs(1), reply_rx).await.expect("reply arrives").expect("reply sent");
        assert!(snapshot.is_empty());
        let _ = ack_tx.send(());
    }
}
