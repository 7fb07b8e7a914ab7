//! Binary-level checks that need no device.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn netsnake() -> Command {
    let mut cmd = Command::cargo_bin("netsnake").unwrap();
    for var in [
        "NETSNAKE_ADDRESS",
        "NETSNAKE_DEVICE_LIST",
        "NETSNAKE_USER",
        "NETSNAKE_SSH_KEY",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn device_list(suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    writeln!(
        file,
        "switches:
  - address: 192.0.2.11
    ssh_user: netops
    ssh_key: /home/netops/.ssh/id_ed25519
  - address: 192.0.2.12
    ssh_user: netops
    ssh_key: /home/netops/.ssh/id_ed25519"
    )
    .unwrap();
    file
}

#[test]
fn test_debug_lists_addresses() {
    let list = device_list(".yml");
    netsnake()
        .arg("-l")
        .arg(list.path())
        .arg("debug")
        .assert()
        .success()
        .stdout(predicate::str::contains("192.0.2.11\n192.0.2.12"));
}

#[test]
fn test_bad_mac_exits_1() {
    netsnake()
        .args(["--no-color", "-a", "192.0.2.11", "mac-find", "00:1a:2b:3c:4d"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Mac address verification failed"));
}

#[test]
fn test_missing_address_exits_1() {
    netsnake()
        .args(["--no-color", "get-info"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No ip address or device list given."));
}

#[test]
fn test_json_device_list_exits_1() {
    let list = device_list(".json");
    netsnake()
        .arg("--no-color")
        .arg("-l")
        .arg(list.path())
        .arg("debug")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Bad config file type"));
}

#[test]
fn test_bad_template_extension_exits_1() {
    let list = device_list(".yml");
    netsnake()
        .arg("--no-color")
        .arg("-l")
        .arg(list.path())
        .args(["config", "template.txt"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Bad template file type"));
}

#[test]
fn test_unreadable_device_list_exits_2() {
    netsnake()
        .args(["-l", "/nonexistent/devices.yml", "debug"])
        .assert()
        .code(2);
}

#[test]
fn test_address_and_list_conflict() {
    netsnake()
        .args(["-a", "192.0.2.11", "-l", "devices.yml", "debug"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_help_lists_subcommands() {
    netsnake()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("config")
                .and(predicate::str::contains("confirm"))
                .and(predicate::str::contains("mac-find"))
                .and(predicate::str::contains("get-info")),
        );
}

#[test]
fn test_piped_credentials_without_terminal() {
    netsnake()
        .args(["-a", "192.0.2.11", "debug"])
        .write_stdin("netops\n\nhunter2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("192.0.2.11"))
        .stderr(predicate::str::contains("User: ").and(predicate::str::contains("Password: ")));
}

#[test]
fn test_closed_stdin_exits_2() {
    netsnake()
        .args(["--no-color", "-a", "192.0.2.11", "debug"])
        .write_stdin("")
        .assert()
        .code(2);
}
