//! Interactive command support for commands that read further input.
//!
//! Junos `load replace terminal` prints a banner and then reads configuration
//! text until Ctrl-D on a new line. `send_interactive` handles this by
//! sending a sequence of inputs, each waiting for a pattern (or the device
//! prompt) before proceeding.

use std::time::Duration;

use regex::bytes::Regex;

/// An event in an interactive command sequence.
///
/// # Example
///
/// ```rust
/// use netsnake::driver::InteractiveEvent;
///
/// let events = vec![
///     InteractiveEvent::try_new("load replace terminal", r"\[Type \^D at a new line to end input\]")
///         .unwrap(),
///     InteractiveEvent::until_prompt("system { host-name sw1; }\n\x04").with_raw(),
/// ];
/// ```
#[derive(Debug, Clone)]
pub struct InteractiveEvent {
    /// The input to send (command or response).
    pub input: String,

    /// Pattern to wait for after sending input; `None` waits for the prompt.
    pub pattern: Option<Regex>,

    /// Send the input as-is instead of appending a newline.
    pub raw: bool,
}

impl InteractiveEvent {
    /// Create an event that waits for `pattern` after sending `input`.
    pub fn try_new(input: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            input: input.into(),
            pattern: Some(Regex::new(pattern)?),
            raw: false,
        })
    }

    /// Create an event that waits for the device prompt after sending `input`.
    pub fn until_prompt(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            pattern: None,
            raw: false,
        }
    }

    /// Send the input without a trailing newline.
    pub fn with_raw(mut self) -> Self {
        self.raw = true;
        self
    }
}

/// Result of an interactive command sequence.
#[derive(Debug, Clone)]
pub struct InteractiveResult {
    /// Results from each step in the sequence.
    pub steps: Vec<InteractiveStep>,

    /// Total time for the entire sequence.
    pub elapsed: Duration,
}

impl InteractiveResult {
    /// Create a new interactive result.
    pub fn new(steps: Vec<InteractiveStep>, elapsed: Duration) -> Self {
        Self { steps, elapsed }
    }

    /// First failure message in the sequence.
    pub fn failure_message(&self) -> Option<&str> {
        self.steps.iter().find_map(|s| s.failure_message.as_deref())
    }
}

/// Result of a single step in an interactive sequence.
#[derive(Debug, Clone)]
pub struct InteractiveStep {
    /// The input that was sent.
    pub input: String,

    /// The output received after sending input.
    pub output: String,

    /// Time taken for this step.
    pub elapsed: Duration,

    /// Failure message if the output matched a failure pattern.
    pub failure_message: Option<String>,
}
