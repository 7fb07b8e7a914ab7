//! Pattern buffer with efficient tail-search optimization.
//!
//! Only the last N bytes of the buffer are searched for prompt patterns,
//! rather than the entire output. Large outputs such as a full
//! ethernet-switching table stay cheap to scan.

use std::fmt;

use bytes::BytesMut;
use regex::bytes::Regex;
use vte::{Parser, Perform};

/// Junos prompts with a `{master:0}` line stay well inside this.
const PROMPT_SEARCH_DEPTH: usize = 1000;

/// Buffer for accumulating output and efficiently searching for patterns.
///
/// Incoming bytes are fed through a `vte` parser so ANSI escape sequences
/// are dropped even when a sequence is split across two reads.
pub struct PatternBuffer {
    /// The accumulated, escape-free output.
    buffer: BytesMut,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    /// Terminal parser state carried between reads.
    parser: Parser,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            search_depth,
            parser: Parser::new(),
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let mut sink = Printable {
            out: &mut self.buffer,
        };
        self.parser.advance(&mut sink, data);
    }

    /// Whether `pattern` matches within the last `search_depth` bytes.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern.is_match(&self.buffer[start..])
    }

    /// Take the buffered output, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<u8> {
        self.buffer.split().to_vec()
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(PROMPT_SEARCH_DEPTH)
    }
}

impl fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}

/// `vte` performer that keeps printable text and line control characters.
struct Printable<'a> {
    out: &'a mut BytesMut,
}

impl Perform for Printable<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.extend_from_slice(&[byte]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"\x1b[32mGreen text\x1b[0m");
        assert_eq!(buffer.take(), b"Green text");
    }

    #[test]
    fn test_ansi_split_across_reads() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"user@sw1\x1b[");
        buffer.extend(b"0m> ");
        assert_eq!(buffer.take(), b"user@sw1> ");
    }

    #[test]
    fn test_line_endings_kept() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"line one\r\nline two\n\x07");
        assert_eq!(buffer.take(), b"line one\r\nline two\n");
    }

    #[test]
    fn test_tail_search() {
        let pattern = Regex::new(r"user@sw1>").unwrap();

        let mut buffer = PatternBuffer::new(20);
        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"\nuser@sw1>");
        assert!(buffer.tail_contains(&pattern));

        let mut buffer = PatternBuffer::new(10);
        buffer.extend(b"user@sw1>");
        buffer.extend(&[b'x'; 100]);
        assert!(!buffer.tail_contains(&pattern));
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = PatternBuffer::default();
        buffer.extend(b"Hostname: sw1");
        assert_eq!(buffer.take(), b"Hostname: sw1");
        assert!(buffer.take().is_empty());
    }
}
