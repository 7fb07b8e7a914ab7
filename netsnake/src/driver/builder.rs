//! Builder for creating device drivers.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::junos::JunosDriver;
use crate::error::{DriverError, Result};
use crate::transport::config::{AuthMethod, HostKeyVerification, SshConfig};

/// Builder for a [`JunosDriver`].
///
/// # Example
///
/// ```rust,no_run
/// use netsnake::driver::{Driver, DriverBuilder};
///
/// # async fn example() -> Result<(), netsnake::Error> {
/// let mut driver = DriverBuilder::new("192.0.2.10")
///     .username("netops")
///     .private_key("/home/netops/.ssh/id_ed25519")
///     .build()?;
/// driver.open().await?;
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: Option<AuthMethod>,
    connect_timeout: Duration,
    command_timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
}

impl DriverBuilder {
    /// Create a new driver builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: None,
            connect_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(120),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: SecretString) -> Self {
        self.auth = Some(AuthMethod::Password(password));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = Some(AuthMethod::Key(key_path.into()));
        self
    }

    /// Set the connection timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set how long a single command may take to return a prompt.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a specific known_hosts file instead of the OpenSSH default.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Build the driver.
    ///
    /// This creates the driver but does not connect. Call `open()` on the
    /// returned driver to establish the connection.
    pub fn build(self) -> Result<JunosDriver> {
        let username = self.username.ok_or_else(|| DriverError::InvalidConfig {
            message: "Username is required".to_string(),
        })?;

        let auth = self.auth.ok_or_else(|| DriverError::InvalidConfig {
            message: "A password or private key is required".to_string(),
        })?;

        let ssh_config = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth,
            connect_timeout: self.connect_timeout,
            host_key_verification: self.host_key_verification,
            known_hosts: self.known_hosts_path,
        };

        Ok(JunosDriver::new(ssh_config, self.command_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;
    use crate::error::Error;

    #[test]
    fn test_build_requires_username() {
        let result = DriverBuilder::new("192.0.2.1").private_key("/tmp/id").build();
        assert!(matches!(
            result,
            Err(Error::Driver(DriverError::InvalidConfig { .. }))
        ));
    }

    #[test]
    fn test_build_requires_auth() {
        let result = DriverBuilder::new("192.0.2.1").username("netops").build();
        assert!(matches!(
            result,
            Err(Error::Driver(DriverError::InvalidConfig { .. }))
        ));
    }

    #[test]
    fn test_build_unopened_driver() {
        let driver = DriverBuilder::new("192.0.2.1")
            .username("netops")
            .password(SecretString::from("secret".to_string()))
            .port(2222)
            .build()
            .unwrap();

        assert!(!driver.is_open());
        assert_eq!(driver.current_privilege(), None);
    }
}
