//! Operator-facing console output.
//!
//! Diagnostics go through `log`; everything the operator is meant to read
//! goes through [`Console`].

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use log::debug;
use owo_colors::OwoColorize;

/// Line-oriented writer with optional color.
pub struct Console {
    out: Box<dyn Write + Send>,
    color: bool,
}

impl Console {
    /// Write to `out`.
    pub fn new(out: impl Write + Send + 'static, color: bool) -> Self {
        Self {
            out: Box::new(out),
            color,
        }
    }

    /// Write to stdout.
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }

    /// Plain line.
    pub fn line(&mut self, message: impl Display) {
        self.emit(message.to_string());
    }

    /// Green line.
    pub fn success(&mut self, message: impl Display) {
        let text = if self.color {
            message.green().to_string()
        } else {
            message.to_string()
        };
        self.emit(text);
    }

    /// Yellow line.
    pub fn warn(&mut self, message: impl Display) {
        let text = if self.color {
            message.yellow().to_string()
        } else {
            message.to_string()
        };
        self.emit(text);
    }

    /// Red line.
    pub fn error(&mut self, message: impl Display) {
        let text = if self.color {
            message.red().to_string()
        } else {
            message.to_string()
        };
        self.emit(text);
    }

    fn emit(&mut self, text: String) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            debug!("console write failed: {e}");
        }
    }
}

/// In-memory sink that stays readable after being handed to a [`Console`].
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        self.0
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::other("console buffer poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_output() {
        let buffer = SharedBuffer::new();
        let mut console = Console::new(buffer.clone(), false);

        console.line("192.0.2.10");
        console.success("Commit successfull");
        console.error("commit failed");

        assert_eq!(buffer.contents(), "192.0.2.10\nCommit successfull\ncommit failed\n");
    }

    #[test]
    fn test_colored_output() {
        let buffer = SharedBuffer::new();
        let mut console = Console::new(buffer.clone(), true);

        console.warn("careful");

        let text = buffer.contents();
        assert!(text.contains("\x1b[33m"));
        assert!(text.contains("careful"));
    }
}
