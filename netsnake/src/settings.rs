//! Run-wide settings collected from the command line.

use std::path::PathBuf;
use std::time::Duration;

use crate::transport::HostKeyVerification;

/// Connection and workflow settings shared by every device in a run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub host_key_verification: HostKeyVerification,
    pub known_hosts: Option<PathBuf>,
    /// Directory holding `<hostname>.yml` variables files.
    pub config_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 22,
            connect_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(120),
            host_key_verification: HostKeyVerification::default(),
            known_hosts: None,
            config_dir: PathBuf::from("./config/switches"),
        }
    }
}
