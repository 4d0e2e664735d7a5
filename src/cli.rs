use clap::Parser;

/// Passive/active LAN discovery over ARP, NBNS, and mDNS.
#[derive(Debug, Parser)]
#[command(name = "lanwatch", version, about)]
pub struct Cli {
    /// Interface to run on. Defaults to the first up, non-loopback
    /// interface carrying a /24 IPv4 address.
    pub interface: Option<String>,

    /// Suppress all packet transmission; only listen.
    #[arg(long, default_value_t = false)]
    pub passive: bool,
}
