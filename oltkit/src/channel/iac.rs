//! Telnet IAC negotiation stripping.

use memchr::memchr;

/// Telnet "Interpret As Command" escape byte.
pub const IAC: u8 = 0xFF;

/// Remove telnet negotiation triplets (`IAC <verb> <option>`) from a chunk.
///
/// Every complete 3-byte sequence starting at an IAC byte is dropped. An IAC
/// too close to the end of the chunk to form a full triplet ends the chunk:
/// the incomplete sequence is discarded, never emitted.
pub fn strip_iac(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut rest = data;

    while let Some(pos) = memchr(IAC, rest) {
        out.extend_from_slice(&rest[..pos]);
        if pos + 2 >= rest.len() {
            return out;
        }
        rest = &rest[pos + 3..];
    }

    out.extend_from_slice(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_bytes_untouched() {
        assert_eq!(strip_iac(b"zxan# show run\r\n"), b"zxan# show run\r\n");
        assert!(strip_iac(b"").is_empty());
    }

    #[test]
    fn test_complete_triplets_removed() {
        // IAC WILL ECHO, IAC DO SUPPRESS-GO-AHEAD around text
        let data = [0xFF, 0xFB, 0x01, b'o', b'k', 0xFF, 0xFD, 0x03, b'!'];
        assert_eq!(strip_iac(&data), b"ok!");
    }

    #[test]
    fn test_back_to_back_triplets() {
        let data = [0xFF, 0xFB, 0x01, 0xFF, 0xFB, 0x03, b'U'];
        assert_eq!(strip_iac(&data), b"U");
    }

    #[test]
    fn test_trailing_incomplete_triplet_dropped() {
        assert_eq!(strip_iac(&[b'a', b'b', 0xFF, 0xFB]), b"ab");
        assert_eq!(strip_iac(&[b'a', 0xFF]), b"a");
    }

    #[test]
    fn test_other_bytes_never_change() {
        let data: Vec<u8> = (0u8..=254).collect();
        assert_eq!(strip_iac(&data), data);
    }
}
