//! Multicast DNS (RFC 6762) query construction and PTR-answer parsing.
//!
//! Only reverse (`in-addr.arpa` → `*.local`) PTR lookups are handled —
//! enough to turn "who is at this IP" into a `.local` hostname. General
//! mDNS service discovery (`_services._dns-sd._udp.local` browsing) is
//! out of scope.

use pnet::packet::ethernet::{EtherTypes, MutableEthernetPacket};
use pnet::packet::ipv4::MutableIpv4Packet;
use pnet::packet::udp::MutableUdpPacket;
use pnet::packet::Packet;
use pnet::util::MacAddr;

use rand::RngCore;

use super::checksum::udp_checksum;
use super::labels;

pub const MULTICAST_ADDR: [u8; 4] = [224, 0, 0, 251];
pub const MULTICAST_MAC: [u8; 6] = [0x01, 0x00, 0x5e, 0x00, 0x00, 0xfb];
pub const SERVICE_PORT: u16 = 5353;

const PTR_QTYPE: u16 = 12;
const IN_QCLASS: u16 = 1;

/// The reverse-lookup question name for an IPv4 address, e.g.
/// `1.2.168.192.in-addr.arpa` for `192.168.2.1`.
pub fn reverse_name(ip: [u8; 4]) -> String {
    format!("{}.{}.{}.{}.in-addr.arpa", ip[3], ip[2], ip[1], ip[0])
}

fn build_dns_query(question: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&0u16.to_be_bytes()); // transaction id: mDNS ignores it
    buf.extend_from_slice(&0u16.to_be_bytes()); // flags: standard query
    buf.extend_from_slice(&1u16.to_be_bytes()); // qdcount
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&labels::encode(question));
    buf.extend_from_slice(&PTR_QTYPE.to_be_bytes());
    buf.extend_from_slice(&IN_QCLASS.to_be_bytes());
    buf
}

/// Build a full Ethernet/IPv4/UDP frame carrying a PTR query for
/// `target_ip`'s reverse name, addressed to the mDNS multicast group.
pub fn build_query_frame(src_mac: [u8; 6], src_ip: [u8; 4], target_ip: [u8; 4]) -> Vec<u8> {
    let dns_payload = build_dns_query(&reverse_name(target_ip));

    let udp_len = 8 + dns_payload.len();
    let mut udp_segment = vec![0u8; udp_len];
    {
        let mut udp = MutableUdpPacket::new(&mut udp_segment).expect("buffer sized for udp header");
        udp.set_source(SERVICE_PORT);
        udp.set_destination(SERVICE_PORT);
        udp.set_length(udp_len as u16);
        udp.set_payload(&dns_payload);
    }
    let udp_csum = udp_checksum(src_ip, MULTICAST_ADDR, &udp_segment);
    udp_segment[6] = (udp_csum >> 8) as u8;
    udp_segment[7] = (udp_csum & 0xFF) as u8;

    let ip_len = 20 + udp_len;
    let mut ip_packet = vec![0u8; ip_len];
    {
        let mut ipv4 = MutableIpv4Packet::new(&mut ip_packet).expect("buffer sized for ipv4 header");
        ipv4.set_version(4);
        ipv4.set_header_length(5);
        ipv4.set_total_length(ip_len as u16);
        ipv4.set_ttl(255);
        ipv4.set_identification(rand::thread_rng().next_u32() as u16);
        ipv4.set_next_level_protocol(pnet::packet::ip::IpNextHeaderProtocols::Udp);
        ipv4.set_source(src_ip.into());
        ipv4.set_destination(MULTICAST_ADDR.into());
        ipv4.set_payload(&udp_segment);
        let csum = pnet::packet::ipv4::checksum(&ipv4.to_immutable());
        ipv4.set_checksum(csum);
    }

    let mut frame = vec![0u8; 14 + ip_len];
    {
        let mut eth = MutableEthernetPacket::new(&mut frame[..14]).expect("buffer sized for ethernet header");
        eth.set_destination(MacAddr::from(MULTICAST_MAC));
        eth.set_source(MacAddr::from(src_mac));
        eth.set_ethertype(EtherTypes::Ipv4);
    }
    frame[14..].copy_from_slice(&ip_packet);
    frame
}

/// Scan a raw DNS (question+answer) payload for a PTR answer matching
/// `expected_question`, returning the target name with a trailing
/// `.local` suffix stripped.
///
/// Mirrors the listener's validation: the answer's owner name must be
/// the exact reverse-lookup name we'd have asked for this source IP,
/// and the resolved name must actually live under `.local` — PTR
/// answers pointing elsewhere are not host names we care about.
pub fn parse_ptr_answer(data: &[u8], expected_question: &str) -> Option<String> {
    if data.len() < 12 {
        return None;
    }
    let qdcount = u16::from_be_bytes([data[4], data[5]]);
    let ancount = u16::from_be_bytes([data[6], data[7]]);
    if qdcount > 0 {
        return None; // we decode only responses, never queries
    }

    let mut pos = 12;
    for _ in 0..ancount {
        let (owner, owner_len) = labels::decode(data, pos)?;
        pos += owner_len;
        if pos + 10 > data.len() {
            return None;
        }
        let rtype = u16::from_be_bytes([data[pos], data[pos + 1]]);
        let rdlength = u16::from_be_bytes([data[pos + 8], data[pos + 9]]) as usize;
        pos += 10;
        if pos + rdlength > data.len() {
            return None;
        }
        let rdata_start = pos;
        pos += rdlength;

        if rtype != PTR_QTYPE || !owner.eq_ignore_ascii_case(expected_question) {
            continue;
        }
        let (target, decoded_len) = labels::decode(data, rdata_start)?;
        if decoded_len != rdlength {
            continue; // rdata didn't cleanly contain a single name
        }
        if let Some(stripped) = strip_local_suffix(&target) {
            return Some(stripped);
        }
    }
    None
}

fn strip_local_suffix(name: &str) -> Option<String> {
    const SUFFIX: &str = ".local";
    if name.len() > SUFFIX.len() && name[name.len() - SUFFIX.len()..].eq_ignore_ascii_case(SUFFIX) {
        Some(name[..name.len() - SUFFIX.len()].to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_name_orders_octets_descending() {
        assert_eq!(reverse_name([192, 168, 1, 42]), "42.1.168.192.in-addr.arpa");
    }

    #[test]
    fn strips_local_suffix_case_insensitively() {
        assert_eq!(strip_local_suffix("desktop.LOCAL"), Some("desktop".to_string()));
        assert_eq!(strip_local_suffix("example.com"), None);
    }

    fn answer_payload(question: &str, target: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&0x8400u16.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes()); // qdcount
        buf.extend_from_slice(&1u16.to_be_bytes()); // ancount
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());

        buf.extend_from_slice(&labels::encode(question));
        buf.extend_from_slice(&PTR_QTYPE.to_be_bytes());
        buf.extend_from_slice(&IN_QCLASS.to_be_bytes());
        buf.extend_from_slice(&120u32.to_be_bytes()); // ttl

        let rdata = labels::encode(target);
        buf.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        buf.extend_from_slice(&rdata);
        buf
    }

    #[test]
    fn parses_ptr_answer_matching_question_and_local_suffix() {
        let question = reverse_name([192, 168, 1, 42]);
        let payload = answer_payload(&question, "desktop.local");
        let name = parse_ptr_answer(&payload, &question).expect("matching ptr answer");
        assert_eq!(name, "desktop");
    }

    #[test]
    fn ignores_answer_for_different_question() {
        let question = reverse_name([192, 168, 1, 42]);
        let other_question = reverse_name([192, 168, 1, 99]);
        let payload = answer_payload(&other_question, "desktop.local");
        assert!(parse_ptr_answer(&payload, &question).is_none());
    }

    #[test]
    fn ignores_answer_not_under_local() {
        let question = reverse_name([192, 168, 1, 42]);
        let payload = answer_payload(&question, "example.com");
        assert!(parse_ptr_answer(&payload, &question).is_none());
    }

    #[test]
    fn rejects_nonzero_question_count() {
        let question = reverse_name([192, 168, 1, 42]);
        let mut payload = answer_payload(&question, "desktop.local");
        payload[4] = 0x00; // qdcount
        payload[5] = 0x01;
        assert!(parse_ptr_answer(&payload, &question).is_none());
    }

    #[test]
    fn build_query_frame_targets_multicast_group() {
        let frame = build_query_frame([2, 0, 0, 0, 0, 1], [192, 168, 1, 1], [192, 168, 1, 42]);
        assert!(frame.len() > 14 + 20 + 8);
        assert_eq!(&frame[0..6], &MULTICAST_MAC);
    }
}
