//! Driver for the Junos CLI over an SSH shell.

use std::time::{Duration, Instant};

use log::{debug, warn};
use regex::bytes::Regex;

use super::Driver;
use super::interactive::{InteractiveEvent, InteractiveResult, InteractiveStep};
use super::response::Response;
use crate::channel::PtyChannel;
use crate::error::{DriverError, Result};
use crate::platform::junos::{
    ON_OPEN_COMMANDS, Privilege, TERMINAL_HEIGHT, TERMINAL_WIDTH, detect_failure,
    post_process_output,
};
use crate::transport::SshTransport;
use crate::transport::config::SshConfig;

/// One CLI session on a Junos switch.
///
/// Tracks the mode shown by the most recent prompt and moves between
/// exec, configuration and shell on request.
pub struct JunosDriver {
    ssh_config: SshConfig,

    /// SSH transport (None when disconnected).
    transport: Option<SshTransport>,

    /// Interactive shell channel (None when disconnected).
    channel: Option<PtyChannel>,

    /// Mode of the last prompt seen.
    privilege: Option<Privilege>,

    /// How long a single command may take to return a prompt.
    timeout: Duration,
}

impl JunosDriver {
    pub fn new(ssh_config: SshConfig, timeout: Duration) -> Self {
        Self {
            ssh_config,
            transport: None,
            channel: None,
            privilege: None,
            timeout,
        }
    }

    /// Read up to the next prompt and record the mode it shows.
    async fn read_until_prompt(&mut self) -> Result<Vec<u8>> {
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
        let data = channel
            .read_until_pattern(Privilege::any_prompt(), self.timeout)
            .await?;
        let (_, prompt) = split_prompt(Privilege::any_prompt(), &data);
        self.record_prompt(&prompt);
        Ok(data)
    }

    fn record_prompt(&mut self, prompt: &str) {
        match Privilege::from_prompt(prompt) {
            Some(privilege) => self.privilege = Some(privilege),
            None => debug!("prompt {prompt:?} shows no known mode"),
        }
    }
}

/// Split channel output into the body and the trailing prompt.
///
/// The last prompt match wins, so prompt-like lines inside the output are
/// kept in the body.
fn split_prompt<'a>(pattern: &Regex, data: &'a [u8]) -> (&'a [u8], String) {
    match pattern.find_iter(data).last() {
        Some(m) => (
            &data[..m.start()],
            String::from_utf8_lossy(m.as_bytes()).trim().to_string(),
        ),
        None => (data, String::new()),
    }
}

/// Drop the echoed first line of `input` from the front of `body`.
fn strip_echo<'a>(input: &str, body: &'a [u8]) -> &'a [u8] {
    let echoed = input.lines().next().unwrap_or("").trim();
    let (first, rest) = match memchr::memchr(b'\n', body) {
        Some(pos) => (&body[..pos], &body[pos + 1..]),
        None => (body, &body[body.len()..]),
    };
    let first = String::from_utf8_lossy(first);
    if first.trim_end().ends_with(echoed) { rest } else { body }
}

/// Raw channel bytes to the text a command printed.
fn clean_output(input: &str, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(strip_echo(input, body))
        .replace("\r\n", "\n")
        .replace('\r', "");
    post_process_output(&text)
}

impl Driver for JunosDriver {
    async fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        let transport = SshTransport::connect(&self.ssh_config).await?;
        let channel = transport.open_shell(TERMINAL_WIDTH, TERMINAL_HEIGHT).await?;
        self.channel = Some(PtyChannel::new(channel));
        self.transport = Some(transport);

        // Login banner, then the first prompt
        self.read_until_prompt().await?;
        debug!("{} opened in {:?} mode", self.ssh_config.host, self.privilege);

        for command in ON_OPEN_COMMANDS {
            let response = self.send_command(command).await?;
            if let Some(failure) = response.failure_message {
                warn!("'{command}' failed on {}: {failure}", self.ssh_config.host);
            }
        }

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.privilege = None;
        let channel_result = match self.channel.take() {
            Some(channel) => channel.close().await,
            None => Ok(()),
        };
        if let Some(transport) = self.transport.take() {
            transport.close().await?;
            debug!("closed connection to {}", self.ssh_config.host);
        }
        channel_result
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        let start = Instant::now();
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;

        debug!("send_command: {command}");
        channel.send(command).await?;
        let data = channel
            .read_until_pattern(Privilege::any_prompt(), self.timeout)
            .await?;

        let (body, prompt) = split_prompt(Privilege::any_prompt(), &data);
        let result = clean_output(command, body);
        self.record_prompt(&prompt);

        let response = Response::new(command, result, prompt, start.elapsed());
        Ok(match detect_failure(&response.result) {
            Some(failure) => response.with_failure(failure),
            None => response,
        })
    }

    async fn send_interactive(&mut self, events: &[InteractiveEvent]) -> Result<InteractiveResult> {
        let start = Instant::now();
        let mut steps = Vec::with_capacity(events.len());

        for event in events {
            let step_start = Instant::now();
            let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;

            debug!("send_interactive: {} bytes", event.input.len());
            if event.raw {
                channel.send_raw(event.input.as_bytes()).await?;
            } else {
                channel.send(&event.input).await?;
            }

            let pattern = event.pattern.as_ref().unwrap_or(Privilege::any_prompt());
            let data = channel.read_until_pattern(pattern, self.timeout).await?;

            let output = match event.pattern {
                Some(_) => clean_output(&event.input, &data),
                None => {
                    let (body, prompt) = split_prompt(Privilege::any_prompt(), &data);
                    self.record_prompt(&prompt);
                    clean_output(&event.input, body)
                }
            };

            steps.push(InteractiveStep {
                input: event.input.clone(),
                failure_message: detect_failure(&output),
                output,
                elapsed: step_start.elapsed(),
            });
        }

        Ok(InteractiveResult::new(steps, start.elapsed()))
    }

    async fn acquire_privilege(&mut self, target: Privilege) -> Result<()> {
        let current = self.privilege.ok_or(DriverError::NotConnected)?;

        for (command, expected) in current.route(target) {
            debug!("{current} -> {target} via '{command}'");
            let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
            channel.send(command).await?;
            self.read_until_prompt().await?;

            if self.privilege != Some(expected) {
                return Err(DriverError::PrivilegeAcquisitionFailed { target: expected }.into());
            }
        }

        Ok(())
    }

    fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    fn current_privilege(&self) -> Option<Privilege> {
        self.privilege
    }
}
