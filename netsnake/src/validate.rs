//! Syntax and naming checks for operator input.
//!
//! None of these touch the network or the filesystem.

use std::net::IpAddr;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

static MAC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$").expect("static MAC regex")
});

/// Check that `address` is an IPv4 or IPv6 address.
pub fn valid_ip(address: Option<&str>) -> Result<IpAddr, ValidationError> {
    let address = address.ok_or(ValidationError::MissingAddress)?;
    address
        .parse()
        .map_err(|_| ValidationError::InvalidAddress {
            address: address.to_string(),
        })
}

/// Normalize `-` separators to `:` and check for six hex octets.
///
/// Letter case is left as given.
pub fn valid_mac(mac: &str) -> Result<String, ValidationError> {
    let normalized = mac.replace('-', ":");
    if MAC.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ValidationError::InvalidMac {
            mac: mac.to_string(),
        })
    }
}

/// Templates must be `.j2` files.
pub fn valid_j2(path: &Path) -> Result<(), ValidationError> {
    match extension(path) {
        Some("j2") => Ok(()),
        _ => Err(ValidationError::TemplateExtension {
            path: path.to_path_buf(),
        }),
    }
}

/// Variables and inventory files must be `.yml` or `.yaml` files.
pub fn valid_conf(path: &Path) -> Result<(), ValidationError> {
    match extension(path) {
        Some("yml" | "yaml") => Ok(()),
        _ => Err(ValidationError::ConfigExtension {
            path: path.to_path_buf(),
        }),
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}
