//! # netsnake
//!
//! Push configuration templates to Junos switches over SSH, confirm or roll
//! back staged commits, find MAC addresses and collect device facts.
//!
//! ## Layers
//!
//! - [`transport`], [`channel`], [`driver`] and [`platform`] drive the Junos
//!   CLI over an interactive SSH shell: tail-searched prompts, the
//!   exec/configuration/shell modes and the configuration mode guard
//! - [`session`] wraps them in the [`DeviceSession`] operations the
//!   workflow needs
//! - [`workflow`] is the per-device commit/confirm/rollback state machine
//! - [`commands`] resolves devices and runs a subcommand across them
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netsnake::driver::{Driver, DriverBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netsnake::Error> {
//!     let mut driver = DriverBuilder::new("192.0.2.10")
//!         .username("netops")
//!         .private_key("/home/netops/.ssh/id_ed25519")
//!         .build()?;
//!
//!     driver.open().await?;
//!
//!     let response = driver.send_command("show version").await?;
//!     println!("{}", response.result);
//!
//!     driver.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod cli;
pub mod commands;
pub mod driver;
pub mod error;
pub mod inventory;
pub mod output;
pub mod platform;
pub mod prompt;
pub mod session;
pub mod settings;
pub mod template;
pub mod transport;
pub mod validate;
pub mod workflow;

pub use commands::{RunSummary, Runner};
pub use driver::{Driver, DriverBuilder, JunosDriver, Response};
pub use error::{Error, Result};
pub use inventory::{DeviceTarget, Target};
pub use output::Console;
pub use prompt::{ConsolePrompt, Decision, OperatorPrompt, ScriptedPrompt};
pub use session::{DeviceSession, JunosProvider, JunosSession, SessionProvider};
pub use settings::Settings;
