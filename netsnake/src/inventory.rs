//! Device targets from a single address or a YAML device list.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{InventoryError, Result, ValidationError};
use crate::prompt::OperatorPrompt;
use crate::validate::valid_conf;

const USER_PROMPT: &str = "User";
const KEY_PROMPT: &str = "Path to ssh key file. Leave blank to use password instead";
const PASSWORD_PROMPT: &str = "Password";

/// Where devices come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// One device; credentials are collected from the operator.
    Single {
        address: String,
        credentials: Credentials,
    },
    /// Every entry of a device list file.
    FromList(PathBuf),
}

/// Credentials supplied up front for single-address mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: Option<String>,
    pub key: Option<PathBuf>,
}

/// How to authenticate to a device.
#[derive(Debug, Clone)]
pub enum Auth {
    Key(PathBuf),
    Password(SecretString),
}

/// One device to contact, fixed once resolved.
#[derive(Debug, Clone)]
pub struct DeviceTarget {
    address: String,
    user: String,
    auth: Auth,
    is_list_entry: bool,
}

impl DeviceTarget {
    pub fn new(address: impl Into<String>, user: impl Into<String>, auth: Auth, is_list_entry: bool) -> Self {
        Self {
            address: address.into(),
            user: user.into(),
            auth,
            is_list_entry,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Whether this target came from a device list.
    pub fn is_list_entry(&self) -> bool {
        self.is_list_entry
    }
}

impl fmt::Display for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// Device list document.
#[derive(Debug, Clone, Deserialize)]
pub struct Inventory {
    pub switches: Vec<SwitchEntry>,
}

/// One device list entry. Device lists only support key authentication.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchEntry {
    pub address: String,
    pub ssh_user: String,
    pub ssh_key: PathBuf,
}

impl Inventory {
    /// Read and parse a device list file.
    pub fn load(path: &Path) -> Result<Self> {
        valid_conf(path)?;
        let text = fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(path, &text)?)
    }

    fn parse(path: &Path, text: &str) -> std::result::Result<Self, InventoryError> {
        serde_yaml::from_str(text).map_err(|source| InventoryError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Turn every entry into a [`DeviceTarget`], keeping file order.
    pub fn into_targets(self) -> Vec<DeviceTarget> {
        self.switches
            .into_iter()
            .map(|entry| DeviceTarget::new(entry.address, entry.ssh_user, Auth::Key(entry.ssh_key), true))
            .collect()
    }
}

/// Resolve the devices for this run.
///
/// With no target at all this fails with [`ValidationError::MissingAddress`].
pub fn resolve(target: Option<Target>, prompt: &mut impl OperatorPrompt) -> Result<Vec<DeviceTarget>> {
    match target.ok_or(ValidationError::MissingAddress)? {
        Target::Single {
            address,
            credentials,
        } => {
            let user = match credentials.user {
                Some(user) => user,
                None => prompt.ask(USER_PROMPT)?.trim().to_string(),
            };
            let key = match credentials.key {
                Some(key) => Some(key),
                None => {
                    let answer = prompt.ask(KEY_PROMPT)?;
                    let answer = answer.trim();
                    (!answer.is_empty()).then(|| PathBuf::from(answer))
                }
            };
            let auth = match key {
                Some(key) => Auth::Key(key),
                None => Auth::Password(prompt.ask_secret(PASSWORD_PROMPT)?),
            };
            Ok(vec![DeviceTarget::new(address, user, auth, false)])
        }
        Target::FromList(path) => {
            let targets = Inventory::load(&path)?.into_targets();
            debug!("{} devices in {:?}", targets.len(), path);
            Ok(targets)
        }
    }
}
