use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};

use lanwatch::cli::Cli;
use lanwatch::dispatch::{self, ListenerChannels};
use lanwatch::events::Event;
use lanwatch::hosts::EventLoop;
use lanwatch::iface;
use lanwatch::link::LinkSocket;
use lanwatch::listeners;
use lanwatch::probers;
use lanwatch::tui;
use lanwatch::web::server::WebServer;

const LINK_INBOUND_CAPACITY: usize = 256;
const LISTENER_QUEUE_DEPTH: usize = 1;
const EVENT_QUEUE_DEPTH: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "lanwatch=info".into()))
        .init();

    if !is_root() {
        error!("lanwatch must run as root (or with equivalent raw-socket capability)");
        std::process::exit(1);
    }

    let cli = Cli::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "lanwatch starting");

    let selected = match iface::select(cli.interface.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "interface selection failed");
            std::process::exit(1);
        }
    };
    let interface_name = selected.interface.name.clone();
    info!(interface = %interface_name, ip = ?selected.own_ip, passive = cli.passive, "interface selected");

    let link = LinkSocket::open(&selected.interface, LINK_INBOUND_CAPACITY)?;
    let link_sender = link.sender();

    let (events_tx, events_rx) = mpsc::channel::<Event>(EVENT_QUEUE_DEPTH);

    let (arp_tx, arp_rx) = mpsc::channel(LISTENER_QUEUE_DEPTH);
    let (arp_done_tx, arp_done_rx) = mpsc::channel(1);
    let (nbns_tx, nbns_rx) = mpsc::channel(LISTENER_QUEUE_DEPTH);
    let (nbns_done_tx, nbns_done_rx) = mpsc::channel(1);
    let (mdns_tx, mdns_rx) = mpsc::channel(LISTENER_QUEUE_DEPTH);
    let (mdns_done_tx, mdns_done_rx) = mpsc::channel(1);

    tokio::spawn(listeners::arp_listener(arp_rx, arp_done_tx, events_tx.clone()));
    tokio::spawn(listeners::nbns_listener(nbns_rx, nbns_done_tx, events_tx.clone()));
    tokio::spawn(listeners::mdns_listener(mdns_rx, mdns_done_tx, events_tx.clone()));

    let dispatch_handle = tokio::spawn(dispatch::run(
        link,
        ListenerChannels { frames: arp_tx, done: arp_done_rx },
        ListenerChannels { frames: nbns_tx, done: nbns_done_rx },
        ListenerChannels { frames: mdns_tx, done: mdns_done_rx },
    ));

    if !cli.passive {
        tokio::spawn(probers::arp_prober(link_sender.clone(), selected.own_mac, selected.own_ip));
        tokio::spawn(probers::mdns_prober(link_sender.clone(), selected.own_mac, selected.own_ip));
    }

    let event_loop = EventLoop::new(events_rx, events_tx.clone(), link_sender, selected.own_mac, selected.own_ip, cli.passive);
    tokio::spawn(event_loop.run());

    let web_events = events_tx.clone();
    tokio::spawn(async move {
        let web = WebServer::new(web_events);
        if let Err(e) = web.run().await {
            error!(error = %e, "web server error");
        }
    });

    // The capture dispatch loop only ever exits on a fatal link-socket
    // I/O error; treat that the same way an up-front config error is
    // treated, rather than letting the TUI/HTTP surface run on with a
    // permanently-dead capture path.
    tokio::select! {
        result = tui::run(events_tx, interface_name, cli.passive) => {
            result?;
        }
        dispatch_result = dispatch_handle => {
            match dispatch_result {
                Ok(error) => error!(error = %error, "fatal link I/O error; aborting"),
                Err(join_error) => error!(error = %join_error, "capture dispatch task failed"),
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

#[cfg(unix)]
fn is_root() -> bool {
    // SAFETY: geteuid() takes no arguments and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}
