//! Error types for netsnake.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::platform::junos::Privilege;

/// Main error type for netsnake operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Operator input failed validation
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Device list could not be read
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Template or variables file problem
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Reading operator input failed
    #[error("Prompt failed: {0}")]
    Prompt(#[source] io::Error),
}

impl Error {
    /// Process exit code for this error class.
    ///
    /// Validation failures exit with 1, everything else with 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Validation(_) => 1,
            _ => 2,
        }
    }

    /// Whether this error came from input validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host is not present in known_hosts and verification is strict
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key does not match the known_hosts entry
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Channel layer errors (pattern matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(std::time::Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// Driver layer errors (command execution, privilege navigation).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Driver already connected
    #[error("Driver already connected")]
    AlreadyConnected,

    /// Command execution failed
    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    /// The prompt after a mode change did not show the expected mode
    #[error("Failed to enter {target} mode")]
    PrivilegeAcquisitionFailed { target: Privilege },

    /// Invalid configuration in the driver builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Operator input that failed a syntax or naming check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Neither an address nor a device list was supplied
    #[error("No ip address or device list given.")]
    MissingAddress,

    /// Address does not parse as IPv4 or IPv6
    #[error("Ip validation failed for {address}")]
    InvalidAddress { address: String },

    /// MAC address is not six hex octets
    #[error("Mac address verification failed for {mac}. Desired address format: xx:xx:xx:xx:xx:xx")]
    InvalidMac { mac: String },

    /// Template file is not a `.j2` file
    #[error("Bad template file type {path:?}. Example: template.j2")]
    TemplateExtension { path: PathBuf },

    /// Config or inventory file is not a `.yml`/`.yaml` file
    #[error("Bad config file type {path:?}. Example: config/switch_addr.yml")]
    ConfigExtension { path: PathBuf },
}

/// Device list loading errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The file could not be read
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not a valid inventory document
    #[error("cannot parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Template rendering and variables file errors.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template or variables file could not be read
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Variables file is not valid YAML
    #[error("cannot parse variables file {path:?}: {source}")]
    Vars {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Variables file is YAML but not a mapping
    #[error("variables file {path:?} must contain a mapping at the top level")]
    VarsNotMapping { path: PathBuf },

    /// Facts did not report a hostname, so no variables file can be chosen
    #[error("device did not report a hostname")]
    MissingHostname,

    /// Rendering failed
    #[error("cannot render {path:?}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },
}

/// Result type alias using netsnake's Error.
pub type Result<T> = std::result::Result<T, Error>;
