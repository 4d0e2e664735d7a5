//! Random permutation of the /24 host addresses reachable from a given
//! own address, used by the ARP and mDNS probers to pick a sweep order.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;

/// Every `own_ip.{1..254}` address except `own_ip` itself, in a
/// uniformly random order. Seeded from the OS entropy source rather
/// than wall-clock time so sweep order isn't predictable from outside.
pub fn available_targets(own_ip: [u8; 4]) -> Vec<[u8; 4]> {
    let mut targets: Vec<[u8; 4]> = (1u8..=254)
        .filter(|&last| last != own_ip[3])
        .map(|last| [own_ip[0], own_ip[1], own_ip[2], last])
        .collect();
    targets.shuffle(&mut OsRng);
    targets
}
