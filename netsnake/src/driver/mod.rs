//! Command execution on a Junos CLI session.
//!
//! The driver layer sends commands, waits for the prompt and moves the
//! session between CLI modes.

mod builder;
#[cfg(test)]
pub(crate) mod fake;
mod interactive;
mod junos;
pub(crate) mod response;

pub use builder::DriverBuilder;
pub use interactive::{InteractiveEvent, InteractiveResult, InteractiveStep};
pub use junos::JunosDriver;
pub use response::Response;

use std::future::Future;

use crate::error::Result;
use crate::platform::junos::Privilege;

/// A CLI session on one device.
pub trait Driver: Send {
    /// Open the connection to the device.
    fn open(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Close the connection.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send a command and wait for the prompt.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Send an interactive command sequence.
    ///
    /// This handles commands that read further input after being issued,
    /// such as `load replace terminal`.
    fn send_interactive(
        &mut self,
        events: &[InteractiveEvent],
    ) -> impl Future<Output = Result<InteractiveResult>> + Send;

    /// Move the session into `privilege` mode.
    fn acquire_privilege(&mut self, privilege: Privilege) -> impl Future<Output = Result<()>> + Send;

    /// Check if the driver is connected.
    fn is_open(&self) -> bool;

    /// Mode shown by the last prompt, `None` before the first one.
    fn current_privilege(&self) -> Option<Privilege>;
}
