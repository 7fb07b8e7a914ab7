//! russh client session: connect, authenticate, open a shell.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use russh::Channel;
use russh::client::{self, AuthResult, Handle, Msg};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use secrecy::ExposeSecret;

use super::config::{AuthMethod, HostKeyVerdict, HostKeyVerification, KnownHostsLookup, SshConfig};
use crate::error::{Result, TransportError};

/// Rejection recorded by the host key check, surfaced by `connect` in
/// place of russh's generic error.
type Rejection = Arc<Mutex<Option<TransportError>>>;

/// An authenticated SSH connection to one device.
pub struct SshTransport {
    handle: Handle<KnownHostsCheck>,
}

impl SshTransport {
    /// Connect, verify the host key and authenticate.
    pub async fn connect(config: &SshConfig) -> Result<Self> {
        let rejection = Rejection::default();
        let check = KnownHostsCheck {
            host: config.host.clone(),
            port: config.port,
            mode: config.host_key_verification,
            known_hosts: config.known_hosts.clone(),
            rejection: Arc::clone(&rejection),
        };
        let client_config = Arc::new(client::Config {
            inactivity_timeout: None,
            ..Default::default()
        });

        debug!("connecting to {}:{}", config.host, config.port);
        let connecting = client::connect(client_config, (config.host.as_str(), config.port), check);
        let mut handle = match tokio::time::timeout(config.connect_timeout, connecting).await {
            Err(_) => return Err(TransportError::Timeout(config.connect_timeout).into()),
            Ok(Err(e)) => {
                let rejected = rejection.lock().ok().and_then(|mut slot| slot.take());
                return Err(rejected.unwrap_or(TransportError::Ssh(e)).into());
            }
            Ok(Ok(handle)) => handle,
        };

        let outcome = match &config.auth {
            AuthMethod::Password(password) => handle
                .authenticate_password(&config.username, password.expose_secret())
                .await
                .map_err(TransportError::Ssh)?,
            AuthMethod::Key(path) => authenticate_key(&mut handle, &config.username, path).await?,
        };
        if !outcome.success() {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }

        debug!("authenticated to {} as {}", config.host, config.username);
        Ok(Self { handle })
    }

    /// Open a session channel with a PTY and an interactive shell.
    pub async fn open_shell(&self, width: u32, height: u32) -> Result<Channel<Msg>> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_pty(true, "xterm", width, height, 0, 0, &[])
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;
        Ok(channel)
    }

    /// Disconnect.
    pub async fn close(self) -> Result<()> {
        self.handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

async fn authenticate_key(
    handle: &mut Handle<KnownHostsCheck>,
    username: &str,
    path: &Path,
) -> Result<AuthResult> {
    let key = load_secret_key(path, None)
        .map_err(|e| TransportError::Key(format!("{}: {e}", path.display())))?;
    let hash = handle
        .best_supported_rsa_hash()
        .await
        .map_err(TransportError::Ssh)?
        .flatten();
    let outcome = handle
        .authenticate_publickey(username, PrivateKeyWithHashAlg::new(Arc::new(key), hash))
        .await
        .map_err(TransportError::Ssh)?;
    Ok(outcome)
}

/// russh handler that checks the server key against known_hosts.
struct KnownHostsCheck {
    host: String,
    port: u16,
    mode: HostKeyVerification,
    known_hosts: Option<PathBuf>,
    rejection: Rejection,
}

impl KnownHostsCheck {
    fn lookup(&self, key: &PublicKey) -> KnownHostsLookup {
        let found = match &self.known_hosts {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, key),
        };
        match found {
            Ok(true) => KnownHostsLookup::Match,
            Ok(false) => KnownHostsLookup::Unknown,
            Err(russh::keys::Error::KeyChanged { line }) => KnownHostsLookup::Changed { line },
            Err(e) => KnownHostsLookup::Unreadable(e.to_string()),
        }
    }

    fn learn(&self, key: &PublicKey) -> std::result::Result<(), russh::keys::Error> {
        match &self.known_hosts {
            Some(path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, key, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, key),
        }
    }
}

impl client::Handler for KnownHostsCheck {
    type Error = russh::Error;

    async fn check_server_key(&mut self, key: &PublicKey) -> std::result::Result<bool, Self::Error> {
        if self.mode == HostKeyVerification::Disabled {
            return Ok(true);
        }
        match self.mode.verdict(self.lookup(key), &self.host, self.port) {
            HostKeyVerdict::Accept => Ok(true),
            HostKeyVerdict::Learn => {
                debug!("learning host key for {}:{}", self.host, self.port);
                if let Err(e) = self.learn(key) {
                    warn!("cannot save host key for {}: {e}", self.host);
                }
                Ok(true)
            }
            HostKeyVerdict::Reject(error) => {
                if let Ok(mut slot) = self.rejection.lock() {
                    *slot = Some(error);
                }
                Ok(false)
            }
        }
    }
}
