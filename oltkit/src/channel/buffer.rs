//! Accumulation buffer for the telnet read loop.
//!
//! Inbound chunks are IAC-stripped before they are appended, so pattern
//! matching and returned output only ever see device text. Unlike a tail
//! search, the whole accumulated buffer is tested: OLT prompts follow output
//! that is rarely large, and the login handshake needs to see every line.

use bytes::BytesMut;
use regex::bytes::Regex;

use super::iac::strip_iac;

/// Buffer for accumulating session output and testing it against patterns.
#[derive(Debug)]
pub struct PatternBuffer {
    /// The accumulated, IAC-free output.
    buffer: BytesMut,
}

impl PatternBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Extend the buffer with a raw chunk, stripping telnet negotiation.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_iac(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Index of the first pattern that matches the accumulated text.
    pub fn first_match(&self, patterns: &[&Regex]) -> Option<usize> {
        patterns.iter().position(|p| p.is_match(&self.buffer))
    }

    /// Take the buffer contents as text and reset.
    pub fn take_string(&mut self) -> String {
        let data = self.buffer.split();
        String::from_utf8_lossy(&data).into_owned()
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_strips_iac() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(&[0xFF, 0xFB, 0x01, b'U', b's', b'e', b'r']);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.take_string(), "User");
    }

    #[test]
    fn test_match_spans_chunks() {
        let mut buffer = PatternBuffer::new();
        let prompt = Regex::new(r"zxan#\s?$").unwrap();

        buffer.extend(b"output\r\nzx");
        assert_eq!(buffer.first_match(&[&prompt]), None);

        buffer.extend(b"an#");
        assert_eq!(buffer.first_match(&[&prompt]), Some(0));
    }

    #[test]
    fn test_first_match_reports_pattern_order() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(b"Password: ");
        let user = Regex::new(r"(?i)username\s*:\s*$").unwrap();
        let pass = Regex::new(r"(?i)password\s*:\s*$").unwrap();
        assert_eq!(buffer.first_match(&[&user, &pass]), Some(1));
    }

    #[test]
    fn test_take_string_clears_buffer() {
        let mut buffer = PatternBuffer::new();
        buffer.extend(b"test data");
        assert_eq!(buffer.take_string(), "test data");
        assert!(buffer.is_empty());
    }
}
