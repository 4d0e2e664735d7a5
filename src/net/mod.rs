pub mod arp;
pub mod checksum;
pub mod labels;
pub mod mdns;
pub mod nbns;

use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::udp::UdpPacket;
use pnet::packet::Packet;

/// Sentinel "read count" returned by label decoding on any failure —
/// mirrors the original decoder's `-1` convention so callers can write
/// `if read <= 0 { return None }` style checks where that idiom fits.
pub const DECODE_FAILED: isize = -1;

/// A captured frame's UDP/IPv4 envelope, shared by the NBNS and mDNS
/// listeners so each only has to deal with its own payload format.
#[derive(Debug, Clone, Copy)]
pub struct UdpEnvelope<'a> {
    pub src_ip: [u8; 4],
    pub dst_ip: [u8; 4],
    pub src_port: u16,
    pub dst_port: u16,
    pub payload: &'a [u8],
}

/// Strip Ethernet/IPv4/UDP headers off a captured frame. Returns `None`
/// for anything that isn't an Ethernet+IPv4+UDP frame, or is too short
/// to hold one.
pub fn strip_udp(frame: &[u8]) -> Option<UdpEnvelope<'_>> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Ipv4 {
        return None;
    }
    let ipv4 = Ipv4Packet::new(eth.payload())?;
    if ipv4.get_next_level_protocol() != pnet::packet::ip::IpNextHeaderProtocols::Udp {
        return None;
    }
    let udp = UdpPacket::new(ipv4.payload())?;
    Some(UdpEnvelope {
        src_ip: ipv4.get_source().octets(),
        dst_ip: ipv4.get_destination().octets(),
        src_port: udp.get_source(),
        dst_port: udp.get_destination(),
        payload: udp.payload(),
    })
}
