//! Junos candidate configuration session.
//!
//! Junos keeps a single shared candidate configuration, entered with
//! `configure`. [`JunosConfigSession`] is an RAII guard over that mode: it
//! holds the driver mutably so nothing else can talk to the device while
//! the candidate is being edited.
//!
//! # Example
//!
//! ```rust,no_run
//! use netsnake::driver::{Driver, DriverBuilder};
//! use netsnake::platform::junos::{CommitMode, JunosConfigSession, LoadFormat};
//!
//! # async fn example() -> Result<(), netsnake::Error> {
//! let mut driver = DriverBuilder::new("192.0.2.10")
//!     .username("netops")
//!     .private_key("/home/netops/.ssh/id_ed25519")
//!     .build()?;
//! driver.open().await?;
//!
//! let mut session = JunosConfigSession::new(&mut driver).await?;
//! session.load("system { host-name sw1; }", LoadFormat::Text).await?;
//!
//! if let Some(diff) = session.diff(None).await? {
//!     println!("{diff}");
//!     let result = session.commit(CommitMode::Confirmed { minutes: 10 }).await?;
//!     if result.complete {
//!         session.exit().await?;
//!     } else {
//!         session.abort().await?;
//!     }
//! } else {
//!     session.abort().await?;
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;

use log::{debug, warn};

use super::privilege::Privilege;
use crate::driver::{Driver, InteractiveEvent};
use crate::error::{DriverError, Result};

const LOAD_BANNER: &str = r"\[Type \^D at a new line to end input\]";
const CHECK_SUCCEEDS: &str = "configuration check succeeds";
const COMMIT_COMPLETE: &str = "commit complete";
const MAX_CONFIRM_MINUTES: u32 = 65535;

/// Format of configuration text handed to [`JunosConfigSession::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LoadFormat {
    /// Curly-brace hierarchy loaded with `load replace`: statements tagged
    /// `replace:` swap out the matching hierarchy, the rest is merged.
    #[default]
    Text,
    /// Curly-brace hierarchy merged into the candidate; `replace:` tags are
    /// ignored.
    Merge,
    /// A list of `set` / `delete` statements.
    Set,
}

impl LoadFormat {
    fn command(self) -> &'static str {
        match self {
            Self::Text => "load replace terminal",
            Self::Merge => "load merge terminal",
            Self::Set => "load set terminal",
        }
    }

    /// Command and body that load `text` at the `load ... terminal` banner.
    fn events(self, text: &str) -> Result<[InteractiveEvent; 2]> {
        let banner = InteractiveEvent::try_new(self.command(), LOAD_BANNER).map_err(|e| {
            DriverError::InvalidConfig {
                message: format!("load banner pattern: {e}"),
            }
        })?;
        Ok([banner, InteractiveEvent::until_prompt(load_body(text)).with_raw()])
    }
}

/// Configuration text terminated for the device: a final newline, then ^D.
fn load_body(text: &str) -> String {
    let mut body = text.to_string();
    if !body.ends_with('\n') {
        body.push('\n');
    }
    body.push('\x04');
    body
}

fn diff_command(against: Option<u32>) -> String {
    match against {
        Some(id) => format!("show | compare rollback {id}"),
        None => "show | compare".to_string(),
    }
}

/// How a commit is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// `commit confirmed N`: the device rolls back after `minutes` unless a
    /// second commit confirms the change.
    Confirmed { minutes: u32 },
    /// Plain `commit`. Also confirms a pending confirmed commit.
    Unconditional,
}

impl CommitMode {
    /// Rollback window used when none is given.
    pub const DEFAULT_CONFIRM_MINUTES: u32 = 10;

    /// The CLI command for this mode.
    pub fn command(self) -> Result<String> {
        match self {
            Self::Unconditional => Ok("commit".to_string()),
            Self::Confirmed { minutes } if (1..=MAX_CONFIRM_MINUTES).contains(&minutes) => {
                Ok(format!("commit confirmed {minutes}"))
            }
            Self::Confirmed { minutes } => Err(DriverError::InvalidConfig {
                message: format!(
                    "commit confirmed takes 1 to {MAX_CONFIRM_MINUTES} minutes, got {minutes}"
                ),
            }
            .into()),
        }
    }
}

impl Default for CommitMode {
    fn default() -> Self {
        Self::Confirmed {
            minutes: Self::DEFAULT_CONFIRM_MINUTES,
        }
    }
}

impl fmt::Display for CommitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed { minutes } => write!(f, "confirmed ({minutes} min)"),
            Self::Unconditional => f.write_str("unconditional"),
        }
    }
}

/// Result of a `commit check`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the candidate passed the check.
    pub valid: bool,
    /// Error lines reported by the device.
    pub errors: Vec<String>,
    /// Warning lines reported by the device.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn from_output(output: &str) -> Self {
        let mut result = Self {
            valid: output.contains(CHECK_SUCCEEDS),
            ..Self::default()
        };
        for line in output.lines().map(str::trim) {
            if line.is_empty() || line.contains(CHECK_SUCCEEDS) {
                continue;
            }
            if line.starts_with("warning:") {
                result.warnings.push(line.to_string());
            } else if !result.valid {
                result.errors.push(line.to_string());
            }
        }
        result
    }
}

/// Outcome of a commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    /// The device reported `commit complete`.
    pub complete: bool,
    /// Raw device output.
    pub output: String,
}

impl CommitResult {
    fn from_output(output: String) -> Self {
        Self {
            complete: output.lines().any(|line| line.trim() == COMMIT_COMPLETE),
            output,
        }
    }
}

/// Junos configuration mode guard.
///
/// # Re-attach
///
/// After [`detach()`](Self::detach) the driver stays in configuration mode.
/// Calling `JunosConfigSession::new()` again re-attaches, since acquiring
/// configuration mode is a no-op when the device is already there.
pub struct JunosConfigSession<'a, D: Driver> {
    driver: &'a mut D,
    original_privilege: Privilege,
    consumed: bool,
}

impl<'a, D: Driver> JunosConfigSession<'a, D> {
    /// Enter configuration mode.
    pub async fn new(driver: &'a mut D) -> Result<Self> {
        // A re-attached session returns to exec, not to configuration
        let original_privilege = match driver.current_privilege() {
            Some(Privilege::Configuration) | None => Privilege::Exec,
            Some(privilege) => privilege,
        };

        debug!("entering config session (from {original_privilege})");
        driver.acquire_privilege(Privilege::Configuration).await?;

        Ok(Self {
            driver,
            original_privilege,
            consumed: false,
        })
    }

    /// Stage configuration text in the candidate.
    ///
    /// Fails with [`DriverError::CommandFailed`] when the device reports
    /// load errors. Whatever did load stays in the candidate.
    pub async fn load(&mut self, text: &str, format: LoadFormat) -> Result<()> {
        debug!("config session: {} ({} bytes)", format.command(), text.len());

        let events = format.events(text)?;
        let result = self.driver.send_interactive(&events).await?;
        match result.failure_message() {
            Some(failure) => Err(DriverError::CommandFailed {
                message: format!("'{}': {}", format.command(), failure),
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Diff the candidate against the running configuration, or against
    /// rollback `id` when given. `None` means nothing differs.
    pub async fn diff(&mut self, against: Option<u32>) -> Result<Option<String>> {
        let command = diff_command(against);
        debug!("config session: {command}");

        let response = self.driver.send_command(&command).await?.into_result()?;
        let diff = response.result.trim();
        Ok((!diff.is_empty()).then(|| diff.to_string()))
    }

    /// Run `commit check` against the candidate.
    pub async fn validate(&mut self) -> Result<ValidationResult> {
        debug!("config session: commit check");
        let response = self.driver.send_command("commit check").await?;
        Ok(ValidationResult::from_output(&response.result))
    }

    /// Commit the candidate. The session stays in configuration mode.
    pub async fn commit(&mut self, mode: CommitMode) -> Result<CommitResult> {
        let command = mode.command()?;
        debug!("config session: {command}");

        let response = self.driver.send_command(&command).await?;
        let result = CommitResult::from_output(response.result);
        if !result.complete {
            warn!("'{command}' did not complete: {}", result.output);
        }
        Ok(result)
    }

    /// Load rollback `id` into the candidate. `0` discards uncommitted
    /// changes.
    pub async fn rollback(&mut self, id: u32) -> Result<()> {
        debug!("config session: rollback {id}");
        self.driver
            .send_command(&format!("rollback {id}"))
            .await?
            .into_result()?;
        Ok(())
    }

    /// Leave configuration mode, keeping nothing uncommitted behind.
    pub async fn exit(mut self) -> Result<()> {
        debug!("config session: exit");
        self.consumed = true;
        self.driver.acquire_privilege(self.original_privilege).await
    }

    /// Discard the candidate and leave configuration mode.
    pub async fn abort(mut self) -> Result<()> {
        debug!("config session: abort");
        self.rollback(0).await?;
        self.exit().await
    }

    /// Release the guard without leaving configuration mode.
    pub fn detach(mut self) {
        debug!("config session: detach");
        self.consumed = true;
    }
}

impl<D: Driver> Drop for JunosConfigSession<'_, D> {
    fn drop(&mut self) {
        if !self.consumed {
            warn!("JunosConfigSession dropped without exit/abort/detach");
        }
    }
}
