//! SSH connection to a switch: russh session setup, password or key
//! login, and the known_hosts policy applied to the switch's host key.

pub mod config;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
