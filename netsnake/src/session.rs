//! Device sessions as seen by the workflow.
//!
//! [`DeviceSession`] is the seam between the commit workflow and the
//! device. [`JunosSession`] drives a real switch over SSH; tests swap in
//! their own implementation.

use std::future::Future;

use log::{debug, warn};

use crate::driver::{Driver, DriverBuilder, JunosDriver};
use crate::error::{DriverError, Result};
use crate::inventory::{Auth, DeviceTarget};
use crate::platform::junos::{
    CommitMode, Facts, JunosConfigSession, LoadFormat, Privilege, ValidationResult, facts,
};
use crate::settings::Settings;

/// One open connection to a device.
pub trait DeviceSession: Send {
    /// Collect device facts.
    fn facts(&mut self) -> impl Future<Output = Result<Facts>> + Send;

    /// Stage configuration text without committing it.
    fn load_config(&mut self, text: &str, format: LoadFormat) -> impl Future<Output = Result<()>> + Send;

    /// Diff the candidate against the running configuration, or against
    /// rollback `against`. `None` when nothing differs.
    fn diff(&mut self, against: Option<u32>) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Check the candidate without committing.
    fn commit_check(&mut self) -> impl Future<Output = Result<ValidationResult>> + Send;

    /// Commit the candidate. `Ok(false)` means the device refused.
    fn commit(&mut self, mode: CommitMode) -> impl Future<Output = Result<bool>> + Send;

    /// `0` discards the candidate. Any other id restores and commits that
    /// rollback.
    fn rollback(&mut self, id: u32) -> impl Future<Output = Result<()>> + Send;

    /// Run a command from the device's Unix shell.
    fn run_shell(&mut self, command: &str) -> impl Future<Output = Result<String>> + Send;

    /// Disconnect, discarding anything left uncommitted.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// Opens sessions to devices.
pub trait SessionProvider {
    type Session: DeviceSession;

    fn connect(&self, target: &DeviceTarget) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// Opens [`JunosSession`]s over SSH.
#[derive(Debug, Clone)]
pub struct JunosProvider {
    settings: Settings,
}

impl JunosProvider {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    fn builder(&self, target: &DeviceTarget) -> DriverBuilder {
        let mut builder = DriverBuilder::new(target.address())
            .port(self.settings.port)
            .username(target.user())
            .timeout(self.settings.connect_timeout)
            .command_timeout(self.settings.command_timeout)
            .host_key_verification(self.settings.host_key_verification);

        if let Some(path) = &self.settings.known_hosts {
            builder = builder.known_hosts_path(path);
        }

        match target.auth() {
            Auth::Key(path) => builder.private_key(path),
            Auth::Password(password) => builder.password(password.clone()),
        }
    }
}

impl SessionProvider for JunosProvider {
    type Session = JunosSession;

    async fn connect(&self, target: &DeviceTarget) -> Result<JunosSession> {
        let mut driver = self.builder(target).build()?;
        driver.open().await?;
        Ok(JunosSession::new(driver))
    }
}

/// A Junos switch driven through its CLI.
pub struct JunosSession<D: Driver = JunosDriver> {
    driver: D,
}

impl<D: Driver> JunosSession<D> {
    /// Wrap an opened driver.
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// Restore rollback `id` and commit it straight away.
    async fn restore(&mut self, id: u32) -> Result<()> {
        let mut config = JunosConfigSession::new(&mut self.driver).await?;
        let committed = match config.rollback(id).await {
            Ok(()) => config.commit(CommitMode::Unconditional).await,
            Err(e) => Err(e),
        };
        match committed {
            Ok(result) if result.complete => config.exit().await,
            Ok(result) => {
                config.abort().await?;
                Err(DriverError::CommandFailed {
                    message: format!("rollback {id} did not commit: {}", result.output),
                }
                .into())
            }
            Err(e) => {
                config.detach();
                Err(e)
            }
        }
    }
}

impl<D: Driver> DeviceSession for JunosSession<D> {
    async fn facts(&mut self) -> Result<Facts> {
        self.driver.acquire_privilege(Privilege::Exec).await?;

        let version = self.driver.send_command(facts::SHOW_VERSION).await?.into_result()?;
        let hardware = self
            .driver
            .send_command(facts::SHOW_CHASSIS_HARDWARE)
            .await?
            .into_result()?;
        let virtual_chassis = self.driver.send_command(facts::SHOW_VIRTUAL_CHASSIS).await?;
        let virtual_chassis = if virtual_chassis.is_success() {
            Some(virtual_chassis.result)
        } else {
            debug!("no virtual chassis: {:?}", virtual_chassis.failure_message);
            None
        };

        Ok(Facts::from_outputs(
            &version.result,
            &hardware.result,
            virtual_chassis.as_deref(),
        ))
    }

    async fn load_config(&mut self, text: &str, format: LoadFormat) -> Result<()> {
        let mut config = JunosConfigSession::new(&mut self.driver).await?;
        let result = config.load(text, format).await;
        config.detach();
        result
    }

    async fn diff(&mut self, against: Option<u32>) -> Result<Option<String>> {
        let mut config = JunosConfigSession::new(&mut self.driver).await?;
        let result = config.diff(against).await;
        config.detach();
        result
    }

    async fn commit_check(&mut self) -> Result<ValidationResult> {
        let mut config = JunosConfigSession::new(&mut self.driver).await?;
        let result = config.validate().await;
        config.detach();
        result
    }

    async fn commit(&mut self, mode: CommitMode) -> Result<bool> {
        let mut config = JunosConfigSession::new(&mut self.driver).await?;
        match config.commit(mode).await {
            Ok(result) if result.complete => {
                config.exit().await?;
                Ok(true)
            }
            Ok(_) => {
                config.detach();
                Ok(false)
            }
            Err(e) => {
                config.detach();
                Err(e)
            }
        }
    }

    async fn rollback(&mut self, id: u32) -> Result<()> {
        if id > 0 {
            return self.restore(id).await;
        }
        JunosConfigSession::new(&mut self.driver).await?.abort().await
    }

    async fn run_shell(&mut self, command: &str) -> Result<String> {
        self.driver.acquire_privilege(Privilege::Shell).await?;
        let response = self.driver.send_command(command).await;
        self.driver.acquire_privilege(Privilege::Exec).await?;
        Ok(response?.result)
    }

    async fn close(mut self) -> Result<()> {
        if self.driver.current_privilege() == Some(Privilege::Configuration) {
            let discarded = match JunosConfigSession::new(&mut self.driver).await {
                Ok(config) => config.abort().await,
                Err(e) => Err(e),
            };
            if let Err(e) = discarded {
                warn!("discarding candidate before close: {e}");
            }
        }
        self.driver.close().await
    }
}
