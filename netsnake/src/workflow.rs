//! Commit, confirm and rollback workflow for one device.
//!
//! `config` runs:
//!
//! ```text
//! Connected -> TemplateLoaded -> NoChange
//!                             -> CheckPending -> AwaitingConfirmation -> Committed
//!                                                                     -> CommitFailed
//!                                                                     -> RolledBack
//! ```
//!
//! `confirm` runs `Connected -> AwaitingReconfirmation -> Confirmed | RolledBack`.
//!
//! Any answer other than `yes` ends in a rollback.

use std::path::PathBuf;

use log::{debug, info};

use crate::error::{Result, TemplateError};
use crate::inventory::DeviceTarget;
use crate::output::Console;
use crate::platform::junos::{CommitMode, LoadFormat};
use crate::prompt::{Decision, OperatorPrompt};
use crate::session::DeviceSession;
use crate::template::{self, Template};
use crate::validate::valid_conf;

pub const COMMIT_PROMPT: &str = "Commit? yes/no";
pub const CONFIRM_PROMPT: &str = "Confirm? yes/no";
const INVALID_ANSWER: &str = "Please use yes or no. Operation canceled";

/// Rollback id holding the configuration from before the pending
/// confirmed commit.
pub const PENDING_ROLLBACK_ID: u32 = 1;

/// Everything `config` needs besides the device.
#[derive(Debug, Clone)]
pub struct ConfigJob {
    pub template: Template,
    /// Directory holding `<hostname>.yml` variables files.
    pub config_dir: PathBuf,
    pub mode: CommitMode,
    pub format: LoadFormat,
}

/// How `config` ended for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOutcome {
    /// The rendered template matched the running configuration.
    NoChange,
    Committed(CommitMode),
    /// The device refused the commit; the candidate was discarded.
    CommitFailed,
    /// The operator gave an answer other than yes or no.
    RolledBack,
    /// The operator answered no. Later devices are not processed.
    Cancelled,
}

impl ConfigOutcome {
    /// Whether the rest of the batch should be skipped.
    pub fn stops_batch(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Self::CommitFailed)
    }
}

/// How `confirm` ended for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    /// The confirming commit failed and the change was rolled back.
    ConfirmFailed,
    /// The operator declined; the change was rolled back.
    RolledBack,
}

impl ConfirmOutcome {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::ConfirmFailed)
    }
}

/// One `config` pass over one device.
#[derive(Debug, Clone)]
pub struct CommitAttempt {
    pub device: DeviceTarget,
    pub mode: CommitMode,
    pub diff: Option<String>,
    pub check_passed: bool,
    pub user_decision: Option<Decision>,
    pub outcome: ConfigOutcome,
}

/// One `confirm` pass over one device.
#[derive(Debug, Clone)]
pub struct ConfirmationState {
    pub device: DeviceTarget,
    pub rollback_id: u32,
    pub user_decision: Decision,
    pub outcome: ConfirmOutcome,
}

/// Render, stage, diff, check and, if the operator agrees, commit.
pub async fn configure_device<S, P>(
    session: &mut S,
    device: &DeviceTarget,
    job: &ConfigJob,
    prompt: &mut P,
    console: &mut Console,
) -> Result<CommitAttempt>
where
    S: DeviceSession,
    P: OperatorPrompt,
{
    let facts = session.facts().await?;
    let hostname = facts.hostname().ok_or(TemplateError::MissingHostname)?;
    let vars_path = job.config_dir.join(format!("{hostname}.yml"));
    valid_conf(&vars_path)?;
    let vars = template::load_vars(&vars_path)?;

    console.line(format!("Device model: {}", facts.model().unwrap_or("unknown")));
    console.line(format!(
        "Device software version: {}",
        facts.version().unwrap_or("unknown")
    ));

    console.line("Loading configuration template file");
    let text = job.template.render(&vars)?;
    session.load_config(&text, job.format).await?;

    let mut attempt = CommitAttempt {
        device: device.clone(),
        mode: job.mode,
        diff: session.diff(None).await?,
        check_passed: false,
        user_decision: None,
        outcome: ConfigOutcome::NoChange,
    };

    let Some(diff) = &attempt.diff else {
        console.error("No changes to commit.");
        return Ok(attempt);
    };
    console.line(diff);

    console.line("Starting commit check. Please wait");
    let check = session.commit_check().await?;
    attempt.check_passed = check.valid;
    if check.valid {
        console.success("Commit check passed.");
    } else {
        console.warn(format!("Commit check failed: {}", check.errors.join("; ")));
    }
    for warning in &check.warnings {
        console.warn(warning);
    }

    let decision = prompt.confirm(COMMIT_PROMPT)?;
    attempt.user_decision = Some(decision.clone());
    attempt.outcome = match decision {
        Decision::Yes => commit(session, job.mode, console).await?,
        Decision::No => {
            console.error("Operation canceled");
            session.rollback(0).await?;
            ConfigOutcome::Cancelled
        }
        Decision::Invalid(answer) => {
            debug!("{}: unrecognised answer {answer:?}", device.address());
            console.error(INVALID_ANSWER);
            session.rollback(0).await?;
            ConfigOutcome::RolledBack
        }
    };

    info!("{}: config {:?}", device.address(), attempt.outcome);
    Ok(attempt)
}

/// Commit once and branch on what the device reported.
async fn commit<S: DeviceSession>(
    session: &mut S,
    mode: CommitMode,
    console: &mut Console,
) -> Result<ConfigOutcome> {
    if !session.commit(mode).await? {
        console.error("commit failed");
        session.rollback(0).await?;
        return Ok(ConfigOutcome::CommitFailed);
    }

    console.success("Commit successfull");
    match mode {
        CommitMode::Confirmed { minutes } => {
            console.warn(format!(
                "Warning: Configuration will rollback to previous in {minutes} minutes."
            ));
            console.warn("To confirm new configuration run netsnake confirm");
        }
        CommitMode::Unconditional => {
            console.warn("Warning: --no-confirm option detected.");
            console.warn("Mistakes in configuration can break connection to switch");
        }
    }
    Ok(ConfigOutcome::Committed(mode))
}

/// Show the pending change and confirm or revert it.
pub async fn confirm_device<S, P>(
    session: &mut S,
    device: &DeviceTarget,
    prompt: &mut P,
    console: &mut Console,
) -> Result<ConfirmationState>
where
    S: DeviceSession,
    P: OperatorPrompt,
{
    console.line("changes to confirm");
    if let Some(diff) = session.diff(Some(PENDING_ROLLBACK_ID)).await? {
        console.line(diff);
    }

    console.line("Commit confirmation");
    let decision = prompt.confirm(CONFIRM_PROMPT)?;

    let outcome = match &decision {
        Decision::Yes => {
            if session.commit(CommitMode::Unconditional).await? {
                console.success("Commit confirmed");
                ConfirmOutcome::Confirmed
            } else {
                console.error("Commit confirmation failed");
                session.rollback(PENDING_ROLLBACK_ID).await?;
                ConfirmOutcome::ConfirmFailed
            }
        }
        Decision::No => {
            console.line("Operation canceled");
            session.rollback(PENDING_ROLLBACK_ID).await?;
            ConfirmOutcome::RolledBack
        }
        Decision::Invalid(_) => {
            console.warn(INVALID_ANSWER);
            session.rollback(PENDING_ROLLBACK_ID).await?;
            ConfirmOutcome::RolledBack
        }
    };

    info!("{}: confirm {:?}", device.address(), outcome);
    Ok(ConfirmationState {
        device: device.clone(),
        rollback_id: PENDING_ROLLBACK_ID,
        user_decision: decision,
        outcome,
    })
}
