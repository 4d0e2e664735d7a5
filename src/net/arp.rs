//! ARP frame parsing and construction (RFC 826), built directly on pnet's
//! Ethernet/ARP packet views rather than a higher-level ARP crate.

use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::packet::Packet;
use pnet::util::MacAddr;

pub const ETHERNET_HEADER_LEN: usize = 14;
pub const ARP_PACKET_LEN: usize = 28;

/// A validated ARP observation extracted from a captured frame: the
/// sender's hardware and protocol addresses, already checked for the
/// consistency rules below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpObservation {
    pub src_mac: [u8; 6],
    pub src_ip: [u8; 4],
}

/// Parse a captured Ethernet frame as an ARP packet, applying the same
/// validation an ARP listener needs before trusting the sender fields:
///
/// - hardware type is Ethernet, protocol type is IPv4
/// - hardware address length is 6, protocol address length is 4
/// - the sender protocol address is not `0.0.0.0` (ARP probes)
/// - the sender hardware address matches the Ethernet source address
///   (guards against spoofed ARP payloads riding on someone else's frame)
///
/// Returns `None` if the frame is too short, isn't ARP, or fails any of
/// the checks above. Malformed ARP is simply dropped by the caller.
pub fn parse(frame: &[u8]) -> Option<ArpObservation> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return None;
    }
    let arp = ArpPacket::new(eth.payload())?;

    if arp.get_hardware_type() != ArpHardwareTypes::Ethernet {
        return None;
    }
    if arp.get_protocol_type() != EtherTypes::Ipv4 {
        return None;
    }
    if arp.get_hw_addr_len() != 6 || arp.get_proto_addr_len() != 4 {
        return None;
    }

    let src_ip = arp.get_sender_proto_addr().octets();
    if src_ip == [0, 0, 0, 0] {
        return None;
    }

    let src_mac = arp.get_sender_hw_addr().octets();
    if src_mac != eth.get_source().octets() {
        return None;
    }

    Some(ArpObservation { src_mac, src_ip })
}

/// Build a broadcast ARP request frame asking "who has `target_ip`",
/// sent from `src_mac`/`src_ip`. Destination hardware address in the ARP
/// payload is all-zero (unknown), and the Ethernet destination is the
/// broadcast address.
pub fn build_request(src_mac: [u8; 6], src_ip: [u8; 4], target_ip: [u8; 4]) -> Vec<u8> {
    let mut buf = vec![0u8; ETHERNET_HEADER_LEN + ARP_PACKET_LEN];

    {
        let mut eth = MutableEthernetPacket::new(&mut buf[..ETHERNET_HEADER_LEN]).expect("buffer sized for ethernet header");
        eth.set_destination(MacAddr::broadcast());
        eth.set_source(MacAddr::from(src_mac));
        eth.set_ethertype(EtherTypes::Arp);
    }
    {
        let mut arp = MutableArpPacket::new(&mut buf[ETHERNET_HEADER_LEN..]).expect("buffer sized for arp packet");
        arp.set_hardware_type(ArpHardwareTypes::Ethernet);
        arp.set_protocol_type(EtherTypes::Ipv4);
        arp.set_hw_addr_len(6);
        arp.set_proto_addr_len(4);
        arp.set_operation(ArpOperations::Request);
        arp.set_sender_hw_addr(MacAddr::from(src_mac));
        arp.set_sender_proto_addr(src_ip.into());
        arp.set_target_hw_addr(MacAddr::zero());
        arp.set_target_proto_addr(target_ip.into());
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(src_mac: [u8; 6], sender_hw: [u8; 6], sender_ip: [u8; 4]) -> Vec<u8> {
        let mut buf = vec![0u8; ETHERNET_HEADER_LEN + ARP_PACKET_LEN];
        {
            let mut eth = MutableEthernetPacket::new(&mut buf[..ETHERNET_HEADER_LEN]).unwrap();
            eth.set_destination(MacAddr::broadcast());
            eth.set_source(MacAddr::from(src_mac));
            eth.set_ethertype(EtherTypes::Arp);
        }
        {
            let mut arp = MutableArpPacket::new(&mut buf[ETHERNET_HEADER_LEN..]).unwrap();
            arp.set_hardware_type(ArpHardwareTypes::Ethernet);
            arp.set_protocol_type(EtherTypes::Ipv4);
            arp.set_hw_addr_len(6);
            arp.set_proto_addr_len(4);
            arp.set_operation(ArpOperations::Reply);
            arp.set_sender_hw_addr(MacAddr::from(sender_hw));
            arp.set_sender_proto_addr(sender_ip.into());
            arp.set_target_hw_addr(MacAddr::zero());
            arp.set_target_proto_addr([0, 0, 0, 0].into());
        }
        buf
    }

    #[test]
    fn parses_well_formed_reply() {
        let mac = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
        let frame = sample_frame(mac, mac, [192, 168, 1, 42]);
        let obs = parse(&frame).expect("valid arp frame");
        assert_eq!(obs.src_mac, mac);
        assert_eq!(obs.src_ip, [192, 168, 1, 42]);
    }

    #[test]
    fn rejects_mismatched_sender_hw_and_ethernet_src() {
        let eth_mac = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
        let sender_hw = [0x02, 0x00, 0x00, 0x00, 0x00, 0x02];
        let frame = sample_frame(eth_mac, sender_hw, [192, 168, 1, 42]);
        assert!(parse(&frame).is_none());
    }

    #[test]
    fn rejects_zero_sender_ip() {
        let mac = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
        let frame = sample_frame(mac, mac, [0, 0, 0, 0]);
        assert!(parse(&frame).is_none());
    }

    #[test]
    fn rejects_non_arp_ethertype() {
        let mut buf = vec![0u8; ETHERNET_HEADER_LEN + ARP_PACKET_LEN];
        let mut eth = MutableEthernetPacket::new(&mut buf[..ETHERNET_HEADER_LEN]).unwrap();
        eth.set_ethertype(EtherTypes::Ipv4);
        drop(eth);
        assert!(parse(&buf).is_none());
    }

    #[test]
    fn build_request_targets_broadcast_destination() {
        let src_mac = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
        let frame = build_request(src_mac, [192, 168, 1, 1], [192, 168, 1, 99]);
        let eth = EthernetPacket::new(&frame).unwrap();
        assert_eq!(eth.get_destination(), MacAddr::broadcast());
        let arp = ArpPacket::new(eth.payload()).unwrap();
        assert_eq!(arp.get_operation(), ArpOperations::Request);
        assert_eq!(arp.get_target_proto_addr().octets(), [192, 168, 1, 99]);
    }
}
