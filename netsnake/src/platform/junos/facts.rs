//! Device facts parsed from JUNOS operational command output.

use indexmap::IndexMap;
use serde::Serialize;

/// Commands whose output feeds [`Facts`].
pub const SHOW_VERSION: &str = "show version";
pub const SHOW_CHASSIS_HARDWARE: &str = "show chassis hardware";
pub const SHOW_VIRTUAL_CHASSIS: &str = "show virtual-chassis status";

/// Self-reported device identity, kept in the order it was collected.
///
/// Well-known keys are `hostname`, `model`, `version`, `serialnumber`,
/// `vc_mode` and `vc_master`. Any other `Key: value` line from
/// `show version` is kept under a snake_case key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Facts {
    entries: IndexMap<String, String>,
}

impl Facts {
    /// Build facts from the raw output of the three fact commands.
    ///
    /// `virtual_chassis` is `None` when the command failed, which JUNOS
    /// does on platforms without Virtual Chassis support.
    pub fn from_outputs(version: &str, hardware: &str, virtual_chassis: Option<&str>) -> Self {
        let mut facts = Self::default();

        for (key, value) in parse_key_values(version) {
            facts.entries.entry(key).or_insert(value);
        }
        if let Some(version) = facts
            .entries
            .get("junos")
            .cloned()
            .or_else(|| bracketed_release(version))
        {
            facts.entries.insert("version".to_string(), version);
        }

        if let Some(serial) = chassis_serial(hardware) {
            facts.entries.insert("serialnumber".to_string(), serial);
        }

        let (mode, master) = match virtual_chassis {
            Some(output) => virtual_chassis_state(output),
            None => ("Disabled".to_string(), None),
        };
        facts.entries.insert("vc_mode".to_string(), mode);
        if let Some(master) = master {
            facts.entries.insert("vc_master".to_string(), master);
        }

        facts
    }

    /// Look up a fact by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn hostname(&self) -> Option<&str> {
        self.get("hostname")
    }

    pub fn model(&self) -> Option<&str> {
        self.get("model")
    }

    pub fn version(&self) -> Option<&str> {
        self.get("version")
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.get("serialnumber")
    }

    pub fn vc_mode(&self) -> Option<&str> {
        self.get("vc_mode")
    }

    pub fn vc_master(&self) -> Option<&str> {
        self.get("vc_master")
    }

    /// Iterate over all facts in collection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Insert or replace a fact.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

/// `Key: value` lines, with keys lowercased and spaces turned into `_`.
fn parse_key_values(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() || key.contains('[') {
                return None;
            }
            Some((key.to_lowercase().replace([' ', '-'], "_"), value.to_string()))
        })
        .collect()
}

/// Older releases print `JUNOS Base OS boot [15.1R7.9]` instead of `Junos:`.
fn bracketed_release(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| {
            line.starts_with("JUNOS Base OS boot") || line.starts_with("JUNOS Software Release")
        })
        .and_then(|line| {
            let start = line.find('[')? + 1;
            let end = line[start..].find(']')? + start;
            Some(line[start..end].to_string())
        })
}

/// Serial number from the `Chassis` row of `show chassis hardware`.
fn chassis_serial(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("Chassis"))
        .and_then(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
}

/// `(vc_mode, vc_master)` from `show virtual-chassis status`.
fn virtual_chassis_state(output: &str) -> (String, Option<String>) {
    let mut mode = None;
    let mut enabled = false;
    let mut master = None;

    for line in output.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("Virtual Chassis Mode:") {
            mode = Some(value.trim().to_string());
        } else if line.starts_with("Virtual Chassis ID:") {
            enabled = true;
        } else if master.is_none()
            && line
                .split_whitespace()
                .any(|token| token.trim_end_matches('*') == "Master")
        {
            master = line.split_whitespace().next().map(str::to_string);
        }
    }

    let mode = mode.unwrap_or_else(|| {
        let mode = if enabled { "Enabled" } else { "Disabled" };
        mode.to_string()
    });
    (mode, master)
}
