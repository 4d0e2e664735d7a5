//! Per-protocol listener tasks (C7). Each owns one decoding pipeline and
//! is fed frames one at a time by the dispatcher, signalling `done` on
//! the shared channel once it has extracted (or failed to extract) an
//! event from the current frame.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::events::Event;
use crate::net::{arp, mdns, nbns, strip_udp};

pub type SharedFrame = Arc<Vec<u8>>;

/// ARP listener: on a valid decode, emits `ArpSeen`.
pub async fn arp_listener(mut frames: mpsc::Receiver<SharedFrame>, done: mpsc::Sender<()>, events: mpsc::Sender<Event>) {
    while let Some(frame) = frames.recv().await {
        if let Some(obs) = arp::parse(&frame) {
            let _ = events
                .send(Event::ArpSeen {
                    src_mac: obs.src_mac,
                    src_ip: obs.src_ip,
                })
                .await;
        }
        let _ = done.send(()).await;
    }
}

/// NBNS listener: on a single, fully-decoded NB_STAT answer, emits
/// `NbnsSeen`. Anything else (multi-answer, no usable name) is dropped.
pub async fn nbns_listener(mut frames: mpsc::Receiver<SharedFrame>, done: mpsc::Sender<()>, events: mpsc::Sender<Event>) {
    while let Some(frame) = frames.recv().await {
        if let Some(envelope) = strip_udp(&frame) {
            if envelope.src_port == nbns::SERVICE_PORT || envelope.dst_port == nbns::SERVICE_PORT {
                if let Some(name) = nbns::parse_response(envelope.payload) {
                    let _ = events
                        .send(Event::NbnsSeen {
                            src_mac: mac_from_frame(&frame),
                            src_ip: envelope.src_ip,
                            name,
                        })
                        .await;
                }
            }
        }
        let _ = done.send(()).await;
    }
}

/// mDNS listener: on a PTR answer whose owner name matches the source
/// IPv4's reverse-lookup name, emits `MdnsSeen` with the `.local`
/// suffix already stripped.
pub async fn mdns_listener(mut frames: mpsc::Receiver<SharedFrame>, done: mpsc::Sender<()>, events: mpsc::Sender<Event>) {
    while let Some(frame) = frames.recv().await {
        if let Some(envelope) = strip_udp(&frame) {
            if envelope.src_port == mdns::SERVICE_PORT || envelope.dst_port == mdns::SERVICE_PORT {
                let expected_question = mdns::reverse_name(envelope.src_ip);
                if let Some(domain) = mdns::parse_ptr_answer(envelope.payload, &expected_question) {
                    let _ = events
                        .send(Event::MdnsSeen {
                            src_mac: mac_from_frame(&frame),
                            src_ip: envelope.src_ip,
                            domain,
                        })
                        .await;
                }
            }
        }
        let _ = done.send(()).await;
    }
}

fn mac_from_frame(frame: &[u8]) -> [u8; 6] {
    let mut mac = [0u8; 6];
    if frame.len() >= 12 {
        mac.copy_from_slice(&frame[6..12]);
    }
    mac
}
