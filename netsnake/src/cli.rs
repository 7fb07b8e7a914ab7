//! Command-line interface.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::inventory::{Credentials, Target};
use crate::platform::junos::{CommitMode, LoadFormat};
use crate::settings::Settings;
use crate::transport::HostKeyVerification;

/// Push configuration templates to Junos switches, confirm or roll back
/// staged commits, find MAC addresses and collect device facts.
#[derive(Debug, Parser)]
#[command(name = "netsnake", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

/// Which devices to contact.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Target IP address
    #[arg(short, long, env = "NETSNAKE_ADDRESS", conflicts_with = "device_list", global = true)]
    pub address: Option<String>,

    /// YAML file listing target devices
    #[arg(short = 'l', long, env = "NETSNAKE_DEVICE_LIST", global = true)]
    pub device_list: Option<PathBuf>,

    /// SSH user for --address (skips the prompt)
    #[arg(short, long, env = "NETSNAKE_USER", global = true)]
    pub user: Option<String>,

    /// SSH private key for --address (skips the prompt)
    #[arg(short, long, env = "NETSNAKE_SSH_KEY", global = true)]
    pub key: Option<PathBuf>,
}

impl TargetArgs {
    /// `None` when neither an address nor a device list was given.
    pub fn target(&self) -> Option<Target> {
        if let Some(address) = &self.address {
            return Some(Target::Single {
                address: address.clone(),
                credentials: Credentials {
                    user: self.user.clone(),
                    key: self.key.clone(),
                },
            });
        }
        self.device_list.clone().map(Target::FromList)
    }
}

/// Connection, output and logging options.
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// SSH port
    #[arg(long, env = "NETSNAKE_PORT", default_value_t = 22, global = true)]
    pub port: u16,

    /// Seconds to wait for the SSH connection
    #[arg(long, env = "NETSNAKE_CONNECT_TIMEOUT", default_value_t = 30, global = true)]
    pub connect_timeout: u64,

    /// Seconds to wait for each device command
    #[arg(long, env = "NETSNAKE_TIMEOUT", default_value_t = 120, global = true)]
    pub timeout: u64,

    /// Directory with per-device `<hostname>.yml` variables files
    #[arg(long, env = "NETSNAKE_CONFIG_DIR", default_value = "./config/switches", global = true)]
    pub config_dir: PathBuf,

    /// Host key checking
    #[arg(long, env = "NETSNAKE_HOST_KEY_CHECK", value_enum, default_value_t = HostKeyVerification::AcceptNew, global = true)]
    pub host_key_check: HostKeyVerification,

    /// known_hosts file (default: ~/.ssh/known_hosts)
    #[arg(long, env = "NETSNAKE_KNOWN_HOSTS", global = true)]
    pub known_hosts: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug diagnostics to stderr
    #[arg(short = 'd', long, global = true)]
    pub debug_log: bool,
}

impl GlobalOpts {
    pub fn settings(&self) -> Settings {
        Settings {
            port: self.port,
            connect_timeout: Duration::from_secs(self.connect_timeout),
            command_timeout: Duration::from_secs(self.timeout),
            host_key_verification: self.host_key_check,
            known_hosts: self.known_hosts.clone(),
            config_dir: self.config_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render a template, load it and commit it after review
    Config(ConfigArgs),

    /// Confirm or roll back a pending confirmed commit
    Confirm,

    /// Find a MAC address in the switching table
    MacFind {
        /// MAC address, xx:xx:xx:xx:xx:xx or xx-xx-xx-xx-xx-xx
        macaddr: String,
    },

    /// Show device facts
    GetInfo {
        /// Print every collected fact
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the address of every resolved device
    Debug,
}

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Configuration template, e.g. template.j2
    pub template: PathBuf,

    /// Commit without a rollback timer. Use only after double checking the configuration
    #[arg(long, conflicts_with = "rollback_minutes")]
    pub no_confirm: bool,

    /// Minutes before an unconfirmed commit rolls back
    #[arg(long, default_value_t = CommitMode::DEFAULT_CONFIRM_MINUTES, value_parser = clap::value_parser!(u32).range(1..=65535))]
    pub rollback_minutes: u32,

    /// How the rendered template is loaded: text (load replace), merge or set
    #[arg(long, value_enum, default_value_t = LoadFormat::Text)]
    pub format: LoadFormat,
}

impl ConfigArgs {
    pub fn commit_mode(&self) -> CommitMode {
        if self.no_confirm {
            CommitMode::Unconditional
        } else {
            CommitMode::Confirmed {
                minutes: self.rollback_minutes,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_defaults() {
        let cli = Cli::try_parse_from(["netsnake", "-a", "192.0.2.10", "config", "uplink.j2"]).unwrap();
        let Command::Config(args) = &cli.command else {
            panic!("expected config, got {:?}", cli.command);
        };
        assert_eq!(args.commit_mode(), CommitMode::Confirmed { minutes: 10 });
        assert_eq!(args.format, LoadFormat::Text);
        assert_eq!(
            cli.target.target(),
            Some(Target::Single {
                address: "192.0.2.10".to_string(),
                credentials: Credentials::default(),
            })
        );
    }

    #[test]
    fn test_config_no_confirm() {
        let cli = Cli::try_parse_from([
            "netsnake", "-l", "devices.yml", "config", "uplink.j2", "--no-confirm", "--format", "set",
        ])
        .unwrap();
        let Command::Config(args) = &cli.command else {
            panic!("expected config");
        };
        assert_eq!(args.commit_mode(), CommitMode::Unconditional);
        assert_eq!(args.format, LoadFormat::Set);
        assert_eq!(cli.target.target(), Some(Target::FromList("devices.yml".into())));
    }

    #[test]
    fn test_config_merge_format() {
        let cli = Cli::try_parse_from([
            "netsnake", "-a", "192.0.2.10", "config", "uplink.j2", "--format", "merge",
        ])
        .unwrap();
        let Command::Config(args) = &cli.command else {
            panic!("expected config");
        };
        assert_eq!(args.format, LoadFormat::Merge);
    }

    #[test]
    fn test_address_conflicts_with_list() {
        let result = Cli::try_parse_from(["netsnake", "-a", "192.0.2.10", "-l", "devices.yml", "debug"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rollback_minutes_range() {
        let result = Cli::try_parse_from([
            "netsnake", "-a", "192.0.2.10", "config", "x.j2", "--rollback-minutes", "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_settings() {
        let cli = Cli::try_parse_from([
            "netsnake", "get-info", "-v", "--port", "2222", "--host-key-check", "off", "-a", "192.0.2.10",
        ])
        .unwrap();
        let settings = cli.global.settings();
        assert_eq!(settings.port, 2222);
        assert_eq!(settings.host_key_verification, HostKeyVerification::Disabled);
        assert_eq!(settings.command_timeout, Duration::from_secs(120));
        assert!(matches!(cli.command, Command::GetInfo { verbose: true }));
    }
}
