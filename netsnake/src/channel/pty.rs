//! PTY channel abstraction for interactive sessions.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

/// Shell channel to a switch, read until a prompt pattern shows up.
pub struct PtyChannel {
    channel: Channel<Msg>,
    buffer: PatternBuffer,
}

impl PtyChannel {
    /// Wrap an open shell channel.
    pub fn new(channel: Channel<Msg>) -> Self {
        Self {
            channel,
            buffer: PatternBuffer::default(),
        }
    }

    /// Send a line of input, terminated with a newline.
    pub async fn send(&mut self, input: &str) -> Result<()> {
        let mut line = Vec::with_capacity(input.len() + 1);
        line.extend_from_slice(input.as_bytes());
        line.push(b'\n');
        self.send_raw(&line).await
    }

    /// Send bytes exactly as given.
    pub async fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        trace!("channel send {} bytes", data.len());
        self.channel
            .data(data)
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `pattern` matches the tail of the output, returning
    /// everything read so far.
    pub async fn read_until_pattern(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.buffer.tail_contains(pattern) {
                return Ok(self.buffer.take());
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PatternTimeout(timeout))?;

            match msg {
                Some(ChannelMsg::Data { data }) => self.buffer.extend(&data),
                Some(ChannelMsg::ExtendedData { data, .. }) => self.buffer.extend(&data),
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                    return Err(ChannelError::Closed.into());
                }
                Some(_) => {}
            }
        }
    }

    /// Close the channel.
    pub async fn close(self) -> Result<()> {
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}
