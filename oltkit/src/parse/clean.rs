//! Transcript cleanup.

use vte::{Parser, Perform};

/// Collects printable text and line control, dropping escape sequences.
struct TextCollector {
    out: String,
}

impl Perform for TextCollector {
    fn print(&mut self, c: char) {
        self.out.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' | b'\r' | b'\t' => self.out.push(byte as char),
            _ => {}
        }
    }
}

/// Remove ANSI escape sequences.
pub fn strip_ansi(text: &str) -> String {
    let mut collector = TextCollector {
        out: String::with_capacity(text.len()),
    };
    let mut parser = Parser::new();
    parser.advance(&mut collector, text.as_bytes());
    collector.out
}

/// Strip escapes and carriage returns, trim every line, drop blank lines.
pub fn clean_output(text: &str) -> String {
    strip_ansi(text)
        .split('\n')
        .map(|line| line.replace('\r', ""))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1;32mOnline\x1b[0m"), "Online");
        assert_eq!(strip_ansi("plain text"), "plain text");
    }

    #[test]
    fn test_clean_output() {
        let raw = "\x1b[2K  OltIndex   Model \r\n\r\n  ----\r\n gpon-olt_1/1/1  F660  ZTE1 \r\n";
        assert_eq!(
            clean_output(raw),
            "OltIndex   Model\n----\ngpon-olt_1/1/1  F660  ZTE1"
        );
    }
}
