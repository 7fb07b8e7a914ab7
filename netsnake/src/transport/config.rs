//! Connection settings and host key policy.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::TransportError;

/// How an unknown or changed host key is handled, after OpenSSH's
/// `StrictHostKeyChecking`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum HostKeyVerification {
    /// Only hosts already in known_hosts are accepted.
    Strict,

    /// Unknown hosts are learned; changed keys are refused.
    #[default]
    AcceptNew,

    /// Every key is accepted. Lab switches only.
    #[value(name = "off")]
    Disabled,
}

/// What known_hosts says about the key a device presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnownHostsLookup {
    Match,
    Unknown,
    Changed { line: usize },
    Unreadable(String),
}

/// What to do with a presented host key.
#[derive(Debug)]
pub enum HostKeyVerdict {
    Accept,
    /// Accept and record the key in known_hosts.
    Learn,
    Reject(TransportError),
}

impl HostKeyVerification {
    /// Decide on a host key given the known_hosts lookup for it.
    pub fn verdict(self, lookup: KnownHostsLookup, host: &str, port: u16) -> HostKeyVerdict {
        match (self, lookup) {
            (Self::Disabled, _) | (_, KnownHostsLookup::Match) => HostKeyVerdict::Accept,
            (Self::AcceptNew, KnownHostsLookup::Unknown) => HostKeyVerdict::Learn,
            (Self::Strict, KnownHostsLookup::Unknown) => {
                HostKeyVerdict::Reject(TransportError::HostKeyUnknown {
                    host: host.to_string(),
                    port,
                })
            }
            (_, KnownHostsLookup::Changed { line }) => {
                HostKeyVerdict::Reject(TransportError::HostKeyChanged {
                    host: host.to_string(),
                    port,
                    line,
                })
            }
            (_, KnownHostsLookup::Unreadable(message)) => {
                HostKeyVerdict::Reject(TransportError::KnownHosts(message))
            }
        }
    }
}

/// How the SSH user proves who they are.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    Password(SecretString),
    /// Unencrypted private key file.
    Key(PathBuf),
}

/// Everything needed to open one SSH connection.
#[derive(Debug, Clone)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: AuthMethod,
    /// Limit on TCP connect plus key exchange.
    pub connect_timeout: Duration,
    pub host_key_verification: HostKeyVerification,
    /// known_hosts file; OpenSSH's default location when `None`.
    pub known_hosts: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_host_accepted_in_every_mode() {
        for mode in [
            HostKeyVerification::Strict,
            HostKeyVerification::AcceptNew,
            HostKeyVerification::Disabled,
        ] {
            assert!(matches!(
                mode.verdict(KnownHostsLookup::Match, "192.0.2.10", 22),
                HostKeyVerdict::Accept
            ));
        }
    }

    #[test]
    fn test_unknown_host() {
        assert!(matches!(
            HostKeyVerification::AcceptNew.verdict(KnownHostsLookup::Unknown, "192.0.2.10", 22),
            HostKeyVerdict::Learn
        ));
        assert!(matches!(
            HostKeyVerification::Strict.verdict(KnownHostsLookup::Unknown, "192.0.2.10", 22),
            HostKeyVerdict::Reject(TransportError::HostKeyUnknown { port: 22, .. })
        ));
        assert!(matches!(
            HostKeyVerification::Disabled.verdict(KnownHostsLookup::Unknown, "192.0.2.10", 22),
            HostKeyVerdict::Accept
        ));
    }

    #[test]
    fn test_changed_key_rejected_unless_disabled() {
        let changed = || KnownHostsLookup::Changed { line: 7 };
        for mode in [HostKeyVerification::Strict, HostKeyVerification::AcceptNew] {
            assert!(matches!(
                mode.verdict(changed(), "192.0.2.10", 2222),
                HostKeyVerdict::Reject(TransportError::HostKeyChanged { line: 7, port: 2222, .. })
            ));
        }
        assert!(matches!(
            HostKeyVerification::Disabled.verdict(changed(), "192.0.2.10", 22),
            HostKeyVerdict::Accept
        ));
    }

    #[test]
    fn test_unreadable_known_hosts_rejected() {
        let verdict = HostKeyVerification::AcceptNew.verdict(
            KnownHostsLookup::Unreadable("permission denied".to_string()),
            "192.0.2.10",
            22,
        );
        assert!(matches!(
            verdict,
            HostKeyVerdict::Reject(TransportError::KnownHosts(ref message)) if message == "permission denied"
        ));
    }
}
