//! Frame dispatcher (C6): owns the link socket, fans each captured
//! frame out to the three listeners, and waits for all three to signal
//! done before reading the next one. This is the back-pressure point —
//! the capture loop never runs ahead of the slowest listener.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::DiscoverError;
use crate::link::LinkSocket;
use crate::listeners::SharedFrame;

/// Channel endpoints for one listener: where it receives frames, and
/// where it signals completion.
pub struct ListenerChannels {
    pub frames: mpsc::Sender<SharedFrame>,
    pub done: mpsc::Receiver<()>,
}

/// Run the dispatch loop until the link socket's inbound channel closes
/// (which only happens on a fatal link-socket read or write failure),
/// and return that failure so the caller can abort the process.
pub async fn run(mut link: LinkSocket, mut arp_ch: ListenerChannels, mut nbns_ch: ListenerChannels, mut mdns_ch: ListenerChannels) -> DiscoverError {
    while let Some(frame) = link.inbound.recv().await {
        let shared: SharedFrame = Arc::new(frame);

        // Delivery order doesn't matter; only that all three see it
        // before the next read and that we wait for every done signal.
        let _ = arp_ch.frames.send(shared.clone()).await;
        let _ = nbns_ch.frames.send(shared.clone()).await;
        let _ = mdns_ch.frames.send(shared).await;

        let _ = arp_ch.done.recv().await;
        let _ = nbns_ch.done.recv().await;
        let _ = mdns_ch.done.recv().await;
    }

    let error = match link.fatal.await {
        Ok(e) => e,
        Err(_) => DiscoverError::LinkIo(std::io::Error::other("link capture thread exited unexpectedly")),
    };
    tracing::error!(error = %error, "link socket closed; capture dispatch loop exiting");
    error
}
