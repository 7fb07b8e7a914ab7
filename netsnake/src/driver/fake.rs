//! In-memory driver that records what it is sent.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::interactive::{InteractiveEvent, InteractiveResult, InteractiveStep};
use super::response::Response;
use super::Driver;
use crate::error::{DriverError, Result};
use crate::platform::junos::{Privilege, detect_failure};

/// What a [`FakeDriver`] was sent, readable after the driver is moved.
#[derive(Debug, Clone, Default)]
pub(crate) struct Transcript {
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl Transcript {
    /// Every line sent, mode changes included.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn push(&self, line: &str) {
        self.sent.lock().unwrap().push(line.to_string());
    }
}

/// Replies to each input with a canned output, empty when none is set.
#[derive(Debug)]
pub(crate) struct FakeDriver {
    transcript: Transcript,
    replies: HashMap<String, String>,
    privilege: Option<Privilege>,
}

impl FakeDriver {
    /// A driver sitting at the exec prompt.
    pub fn new() -> Self {
        Self {
            transcript: Transcript::default(),
            replies: HashMap::new(),
            privilege: Some(Privilege::Exec),
        }
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.transcript.sent()
    }

    pub fn reply(mut self, input: &str, output: &str) -> Self {
        self.replies.insert(input.to_string(), output.to_string());
        self
    }

    pub fn in_privilege(mut self, privilege: Privilege) -> Self {
        self.privilege = Some(privilege);
        self
    }

    fn answer(&mut self, input: &str) -> String {
        self.transcript.push(input);
        self.replies.get(input).cloned().unwrap_or_default()
    }
}

impl Driver for FakeDriver {
    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.transcript.closed.store(true, Ordering::SeqCst);
        self.privilege = None;
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        let output = self.answer(command);
        let response = Response::new(command, output, "user@sw1>", Duration::ZERO);
        Ok(match detect_failure(&response.result) {
            Some(failure) => response.with_failure(failure),
            None => response,
        })
    }

    async fn send_interactive(&mut self, events: &[InteractiveEvent]) -> Result<InteractiveResult> {
        let steps = events
            .iter()
            .map(|event| {
                let output = self.answer(&event.input);
                InteractiveStep {
                    input: event.input.clone(),
                    failure_message: detect_failure(&output),
                    output,
                    elapsed: Duration::ZERO,
                }
            })
            .collect();
        Ok(InteractiveResult::new(steps, Duration::ZERO))
    }

    async fn acquire_privilege(&mut self, target: Privilege) -> Result<()> {
        let current = self.privilege.ok_or(DriverError::NotConnected)?;
        for (command, reached) in current.route(target) {
            self.transcript.push(command);
            self.privilege = Some(reached);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.transcript.is_closed()
    }

    fn current_privilege(&self) -> Option<Privilege> {
        self.privilege
    }
}
