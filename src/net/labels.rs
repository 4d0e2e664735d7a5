//! DNS-style length-prefixed label encoding/decoding with 14-bit pointer
//! compression (RFC 1035 §4.1.4), used identically by the NBNS and mDNS
//! codecs. No external DNS library is used — this is hand-parsed from
//! `&[u8]`, matching the wire format directly.

/// Maximum number of compression-pointer hops followed while decoding a
/// single name. Crafted pointer loops are rejected once exceeded.
const MAX_POINTER_HOPS: usize = 32;

/// Decode a dotted name starting at `start` within `data`.
///
/// Returns `(name, consumed)` where `consumed` is the number of bytes
/// read at `start` itself — a pointer jump costs exactly 2 bytes at the
/// site it occurs, regardless of how much is read at the jump target.
/// Returns `None` on any malformed input (truncation, dangling pointer,
/// unterminated name, or a pointer loop deeper than `MAX_POINTER_HOPS`).
pub fn decode(data: &[u8], start: usize) -> Option<(String, usize)> {
    decode_inner(data, start, 0)
}

fn decode_inner(data: &[u8], start: usize, hops: usize) -> Option<(String, usize)> {
    let mut labels: Vec<String> = Vec::new();
    let mut pos = start;

    loop {
        if pos >= data.len() {
            return None; // truncated before a null terminator
        }
        let len_byte = data[pos];

        if len_byte == 0 {
            let consumed = pos + 1 - start;
            return Some((labels.join("."), consumed));
        }

        if (len_byte & 0xC0) == 0xC0 {
            if pos + 1 >= data.len() {
                return None; // dangling pointer byte
            }
            if hops + 1 > MAX_POINTER_HOPS {
                return None; // probable loop
            }
            let pointer = (u16::from_be_bytes([data[pos], data[pos + 1]]) & 0x3FFF) as usize;
            let (tail, tail_read) = decode_inner(data, pointer, hops + 1)?;
            let _ = tail_read; // bytes consumed past the pointer site do not count here
            if !tail.is_empty() {
                labels.push(tail);
            }
            let consumed = pos + 2 - start;
            return Some((labels.join("."), consumed));
        }

        // ordinary length-prefixed label
        let label_len = len_byte as usize;
        pos += 1;
        if pos + label_len > data.len() {
            return None; // label extends past the buffer
        }
        labels.push(String::from_utf8_lossy(&data[pos..pos + label_len]).into_owned());
        pos += label_len;
    }
}

/// Encode a dotted name into wire format: `len(part) || part` per
/// dot-separated component, terminated by a single `0x00`. No
/// compression is ever produced.
pub fn encode(name: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(name.len() + 2);
    for part in name.split('.') {
        out.push(part.len() as u8);
        out.extend_from_slice(part.as_bytes());
    }
    out.push(0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_simple_name() {
        let encoded = encode("_services._dns-sd._udp.local");
        let (decoded, consumed) = decode(&encoded, 0).unwrap();
        assert_eq!(decoded, "_services._dns-sd._udp.local");
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn encode_two_labels() {
        assert_eq!(encode("a.b"), vec![1, b'a', 1, b'b', 0]);
    }

    #[test]
    fn encode_length_matches_law() {
        let name = "foo.bar.example";
        let encoded = encode(name);
        let expected: usize = name.split('.').map(|p| p.len() + 1).sum::<usize>() + 1;
        assert_eq!(encoded.len(), expected);
    }

    #[test]
    fn decode_follows_pointer() {
        // "example.com" at offset 0, then a second name at offset 13 that
        // is just a pointer back to offset 0.
        let mut data = encode("example.com");
        let base = data.len();
        data.push(0xC0);
        data.push(0x00);
        let (decoded, consumed) = decode(&data, base).unwrap();
        assert_eq!(decoded, "example.com");
        assert_eq!(consumed, 2);
    }

    #[test]
    fn decode_partial_pointer_compound_name() {
        // "mail" + pointer to "example.com" -> "mail.example.com"
        let mut data = encode("example.com");
        let ptr_offset = data.len();
        data.push(4);
        data.extend_from_slice(b"mail");
        data.push(0xC0);
        data.push(0x00);
        let (decoded, consumed) = decode(&data, ptr_offset).unwrap();
        assert_eq!(decoded, "mail.example.com");
        assert_eq!(consumed, 1 + 4 + 2);
    }

    #[test]
    fn decode_missing_null_terminator_fails() {
        let data = vec![3, b'f', b'o', b'o']; // no terminator
        assert!(decode(&data, 0).is_none());
    }

    #[test]
    fn decode_out_of_range_pointer_fails() {
        let data = vec![0xC0, 0xFF]; // points far beyond the 2-byte buffer
        assert!(decode(&data, 0).is_none());
    }

    #[test]
    fn decode_label_extending_past_buffer_fails() {
        let data = vec![10, b'a', b'b']; // claims 10 bytes, only has 2
        assert!(decode(&data, 0).is_none());
    }

    #[test]
    fn decode_rejects_pointer_loop() {
        // offset 0 points to offset 0 -- an infinite loop if not capped.
        let data = vec![0xC0, 0x00];
        assert!(decode(&data, 0).is_none());
    }
}
