//! Subcommand dispatch across the resolved devices.
//!
//! Devices are handled one at a time. Each gets its own session, which is
//! closed whatever happens, and a failure on one device does not stop the
//! others.

use log::warn;

use crate::cli::Command;
use crate::error::{Error, Result};
use crate::inventory::{self, DeviceTarget, Target};
use crate::output::Console;
use crate::platform::junos::Facts;
use crate::prompt::OperatorPrompt;
use crate::session::{DeviceSession, SessionProvider};
use crate::settings::Settings;
use crate::template::Template;
use crate::validate::{valid_ip, valid_j2, valid_mac};
use crate::workflow::{self, CommitAttempt, ConfigJob, ConfirmationState};

const VARS_NOTICE: &str =
    "To config devices, you must create device config file 'config/switches/*device_hostname*.yml'";

/// Build the shell command that looks up `mac` in the switching table.
pub fn mac_find_command(mac: &str) -> String {
    format!("cli -c 'show ethernet-switching table {mac} brief'")
}

/// What happened on one device that did not fail.
#[derive(Debug, Clone)]
pub enum DeviceOutcome {
    Config(CommitAttempt),
    Confirm(ConfirmationState),
    /// mac-find or get-info printed their output.
    Reported,
}

impl DeviceOutcome {
    fn stops_batch(&self) -> bool {
        matches!(self, Self::Config(attempt) if attempt.outcome.stops_batch())
    }

    /// The device answered, but refused the commit.
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Config(attempt) => attempt.outcome.is_failure(),
            Self::Confirm(state) => state.outcome.is_failure(),
            Self::Reported => false,
        }
    }
}

/// Per-device results of one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: Vec<(String, DeviceOutcome)>,
    pub failed: Vec<(String, Error)>,
    /// Devices left untouched after the operator cancelled.
    pub skipped: Vec<String>,
}

impl RunSummary {
    /// 0 when every device succeeded or the operator cancelled the batch,
    /// 1 when every failure was a validation failure, 2 otherwise.
    ///
    /// A cancel wins over failures on devices handled before it; those are
    /// still listed by [`Runner::report`].
    pub fn exit_code(&self) -> u8 {
        if self.cancelled() {
            return 0;
        }
        let refused = self.processed.iter().any(|(_, outcome)| outcome.is_failure());
        if refused {
            return 2;
        }
        self.failed
            .iter()
            .map(|(_, error)| error.exit_code())
            .max()
            .unwrap_or(0)
    }

    pub fn cancelled(&self) -> bool {
        self.processed.iter().any(|(_, outcome)| outcome.stops_batch())
    }
}

enum Job<'a> {
    Config(&'a ConfigJob),
    Confirm,
    MacFind(&'a str),
    GetInfo { verbose: bool },
}

/// Runs subcommands against devices.
pub struct Runner<V, P> {
    provider: V,
    prompt: P,
    console: Console,
    settings: Settings,
}

impl<V, P> Runner<V, P>
where
    V: SessionProvider,
    P: OperatorPrompt,
{
    pub fn new(provider: V, prompt: P, console: Console, settings: Settings) -> Self {
        Self {
            provider,
            prompt,
            console,
            settings,
        }
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Run `command` against `target`.
    ///
    /// Errors returned here are top-level: bad arguments or an unreadable
    /// device list. Device failures are collected in the summary.
    pub async fn execute(&mut self, target: Option<Target>, command: &Command) -> Result<RunSummary> {
        match command {
            Command::Config(args) => {
                valid_j2(&args.template)?;
                let job = ConfigJob {
                    template: Template::load(&args.template)?,
                    config_dir: self.settings.config_dir.clone(),
                    mode: args.commit_mode(),
                    format: args.format,
                };
                let devices = inventory::resolve(target, &mut self.prompt)?;
                Ok(self.run(&devices, Job::Config(&job)).await)
            }
            Command::Confirm => {
                let devices = inventory::resolve(target, &mut self.prompt)?;
                Ok(self.run(&devices, Job::Confirm).await)
            }
            Command::MacFind { macaddr } => {
                let mac = valid_mac(macaddr)?;
                let devices = inventory::resolve(target, &mut self.prompt)?;
                self.console.line("mac-find");
                Ok(self.run(&devices, Job::MacFind(&mac)).await)
            }
            Command::GetInfo { verbose } => {
                let devices = inventory::resolve(target, &mut self.prompt)?;
                self.console.line("get-info");
                Ok(self.run(&devices, Job::GetInfo { verbose: *verbose }).await)
            }
            Command::Debug => {
                for device in inventory::resolve(target, &mut self.prompt)? {
                    self.console.line(device.address());
                }
                Ok(RunSummary::default())
            }
        }
    }

    /// Print the failures of a run.
    pub fn report(&mut self, summary: &RunSummary) {
        if !summary.skipped.is_empty() {
            self.console.warn(format!(
                "Skipped after cancel: {}",
                summary.skipped.join(", ")
            ));
        }
        if summary.failed.is_empty() {
            return;
        }
        self.console
            .error(format!("{} device(s) failed:", summary.failed.len()));
        for (address, error) in &summary.failed {
            self.console.error(format!("  {address}: {error}"));
        }
    }

    async fn run(&mut self, devices: &[DeviceTarget], job: Job<'_>) -> RunSummary {
        let mut summary = RunSummary::default();

        for (index, device) in devices.iter().enumerate() {
            self.console.line(device.address());
            match self.process(device, &job).await {
                Ok(outcome) => {
                    let stop = outcome.stops_batch();
                    summary.processed.push((device.address().to_string(), outcome));
                    if stop {
                        summary.skipped = devices[index + 1..]
                            .iter()
                            .map(|d| d.address().to_string())
                            .collect();
                        break;
                    }
                }
                Err(error) => {
                    self.console.error(&error);
                    summary.failed.push((device.address().to_string(), error));
                }
            }
        }

        summary
    }

    async fn process(&mut self, device: &DeviceTarget, job: &Job<'_>) -> Result<DeviceOutcome> {
        if let Job::Config(_) = job {
            self.console.warn(VARS_NOTICE);
            self.console.line("Loading switch variables file");
        }
        valid_ip(Some(device.address()))?;

        let mut session = self.provider.connect(device).await?;
        let result = self.handle(&mut session, device, job).await;
        if let Err(e) = session.close().await {
            warn!("closing session to {}: {e}", device.address());
        }
        result
    }

    async fn handle(
        &mut self,
        session: &mut V::Session,
        device: &DeviceTarget,
        job: &Job<'_>,
    ) -> Result<DeviceOutcome> {
        match job {
            Job::Config(job) => {
                workflow::configure_device(session, device, job, &mut self.prompt, &mut self.console)
                    .await
                    .map(DeviceOutcome::Config)
            }
            Job::Confirm => {
                workflow::confirm_device(session, device, &mut self.prompt, &mut self.console)
                    .await
                    .map(DeviceOutcome::Confirm)
            }
            Job::MacFind(mac) => {
                let output = session.run_shell(&mac_find_command(mac)).await?;
                self.console.line(output);
                Ok(DeviceOutcome::Reported)
            }
            Job::GetInfo { verbose } => {
                let facts = session.facts().await?;
                self.print_facts(&facts, *verbose);
                Ok(DeviceOutcome::Reported)
            }
        }
    }

    fn print_facts(&mut self, facts: &Facts, verbose: bool) {
        if verbose {
            match serde_json::to_string_pretty(facts) {
                Ok(json) => self.console.line(json),
                Err(e) => warn!("cannot format facts: {e}"),
            }
            return;
        }

        let field = |value: Option<&str>| value.unwrap_or("unknown").to_string();
        self.console
            .line(format!("Device hostname: {}", field(facts.hostname())));
        self.console
            .line(format!("Device model: {}", field(facts.model())));
        self.console
            .line(format!("OS version: {}", field(facts.version())));
        self.console
            .line(format!("Serial number: {}", field(facts.serial_number())));
        self.console
            .line(format!("VC State: {}", field(facts.vc_mode())));
        self.console
            .line(format!("VC Master: {}", field(facts.vc_master())));
    }
}
