//! Raw link-layer capture/inject socket.
//!
//! `pnet::datalink::channel` gives a single blocking reader/writer pair
//! bound to one interface, replacing the split pcap-reader/AF_PACKET-writer
//! socket pair used elsewhere — one interface, one channel, read and
//! write both go through it.
//!
//! The channel itself is blocking, so it's driven from a dedicated OS
//! thread and bridged into the async world with bounded channels: inbound
//! frames flow out over an mpsc channel, outbound frames flow in over
//! another. This keeps every `tokio::select!` loop elsewhere in the
//! crate free of blocking calls.

use pnet::datalink::{self, Channel, NetworkInterface};
use tokio::sync::{mpsc, oneshot};

use crate::error::{DiscoverError, Result};

/// Frames read off the wire are handed to listeners as owned buffers —
/// the capture thread's internal buffer is reused after each send.
pub type Frame = Vec<u8>;

/// Cloneable handle for queuing outbound frames, held by probers so
/// they don't need a reference to the whole `LinkSocket`.
#[derive(Clone)]
pub struct LinkSender(mpsc::Sender<Frame>);

impl LinkSender {
    pub fn send(&self, frame: Frame) {
        if self.0.try_send(frame).is_err() {
            tracing::debug!("outbound link queue full, dropping frame");
        }
    }

    /// Build a sender directly from a channel half, bypassing a real
    /// capture thread. Used by other modules' tests to observe what
    /// gets queued for transmission without opening an interface.
    #[cfg(test)]
    pub(crate) fn from_channel(tx: mpsc::Sender<Frame>) -> Self {
        Self(tx)
    }
}

/// Handle to a running link-layer capture/inject thread.
pub struct LinkSocket {
    pub inbound: mpsc::Receiver<Frame>,
    /// Fires exactly once, with the I/O error that ended the capture
    /// thread. A read or write failure on the raw link socket is fatal
    /// to the whole process (unlike the auxiliary UDP probe sockets).
    pub fatal: oneshot::Receiver<DiscoverError>,
    outbound: mpsc::Sender<Frame>,
    join: std::thread::JoinHandle<()>,
}

impl LinkSocket {
    /// Open a raw Ethernet channel on `interface` and spawn the capture
    /// thread. `inbound_capacity` bounds how many unread frames may
    /// queue before the capture thread starts dropping the oldest ones
    /// (back-pressure is handled by the dispatcher, not here).
    pub fn open(interface: &NetworkInterface, inbound_capacity: usize) -> Result<Self> {
        let (mut tx, mut rx) = match datalink::channel(interface, Default::default()) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => {
                return Err(DiscoverError::Config(format!(
                    "interface {} did not produce an ethernet channel",
                    interface.name
                )))
            }
            Err(e) => return Err(DiscoverError::LinkIo(e)),
        };

        let (inbound_tx, inbound_rx) = mpsc::channel(inbound_capacity);
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<Frame>(64);
        let (fatal_tx, fatal_rx) = oneshot::channel();

        let join = std::thread::Builder::new()
            .name("lanwatch-link".to_string())
            .spawn(move || {
                let fatal_io_error = 'capture: loop {
                    while let Ok(frame) = outbound_rx.try_recv() {
                        if let Some(Err(e)) = tx.send_to(&frame, None) {
                            break 'capture Some(e);
                        }
                    }

                    match rx.next() {
                        Ok(packet) => {
                            if inbound_tx.blocking_send(packet.to_vec()).is_err() {
                                break 'capture None; // receiving half dropped, shut down quietly
                            }
                        }
                        Err(e) => break 'capture Some(e),
                    }
                };

                if let Some(e) = fatal_io_error {
                    tracing::error!(error = %e, "link socket I/O failed; aborting capture");
                    let _ = fatal_tx.send(DiscoverError::LinkIo(e));
                }
            })
            .expect("failed to spawn link capture thread");

        Ok(Self {
            inbound: inbound_rx,
            fatal: fatal_rx,
            outbound: outbound_tx,
            join,
        })
    }

    /// Queue a frame for transmission. Never blocks the async caller;
    /// if the capture thread's outbound queue is full the frame is
    /// dropped and logged, matching the log-and-continue policy probers
    /// use for transient send failures.
    pub fn send(&self, frame: Frame) {
        if self.outbound.try_send(frame).is_err() {
            tracing::debug!("outbound link queue full, dropping frame");
        }
    }

    /// A cloneable handle probers can use to queue frames without
    /// borrowing the whole socket.
    pub fn sender(&self) -> LinkSender {
        LinkSender(self.outbound.clone())
    }

    pub fn join(self) {
        drop(self.outbound);
        let _ = self.join.join();
    }
}
