//! Junos CLI modes and the prompts that identify them.
//!
//! ```text
//! user@switch>              exec
//! {master:0}                routing-engine line above any prompt
//! user@switch#              configuration, usually under an [edit] banner
//! user@switch:RE:0%         shell
//! ```
//!
//! Configuration and shell are both entered from exec, so moving between
//! them always passes through exec:
//!
//! ```text
//!   configuration  --exit configuration-mode-->  exec  --start shell-->  shell
//!                  <--------configure---------         <-----exit------
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::bytes::Regex;

const EXEC_PROMPT: &str = r"(?mi)^(\{\w+(:(\w+)?\d)?\}\r?\n)?[\w\-@()/:\.]{1,63}>\s?$";
const CONFIG_PROMPT: &str = r"(?mi)^(\{\w+(:(\w+)?\d)?\}\[edit\]\r?\n)?[\w\-@()/:\.]{1,63}#\s?$";
const SHELL_PROMPT: &str = r"(?m)^[\w\-@.:~/]*[%$]\s?$";

static EXEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EXEC_PROMPT).expect("static exec prompt regex"));
static CONFIG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CONFIG_PROMPT).expect("static configuration prompt regex"));
static SHELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SHELL_PROMPT).expect("static shell prompt regex"));
static ANY: LazyLock<Regex> = LazyLock::new(|| {
    let combined = format!("(?:{EXEC_PROMPT})|(?:{CONFIG_PROMPT})|(?:{SHELL_PROMPT})");
    Regex::new(&combined).expect("static combined prompt regex")
});

/// The CLI mode a session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Privilege {
    /// Operational mode.
    Exec,
    /// Candidate configuration editing.
    Configuration,
    /// FreeBSD shell below the CLI.
    Shell,
}

impl Privilege {
    const ALL: [Self; 3] = [Self::Exec, Self::Configuration, Self::Shell];

    pub fn name(self) -> &'static str {
        match self {
            Self::Exec => "exec",
            Self::Configuration => "configuration",
            Self::Shell => "shell",
        }
    }

    /// Prompt pattern of this mode alone.
    pub fn pattern(self) -> &'static Regex {
        match self {
            Self::Exec => &EXEC,
            Self::Configuration => &CONFIG,
            Self::Shell => &SHELL,
        }
    }

    /// Pattern matching the prompt of any mode.
    pub fn any_prompt() -> &'static Regex {
        &ANY
    }

    /// Mode shown by `prompt`, or `None` if it is not a Junos prompt.
    pub fn from_prompt(prompt: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.pattern().is_match(prompt.as_bytes()))
    }

    fn enter_command(self) -> Option<&'static str> {
        match self {
            Self::Exec => None,
            Self::Configuration => Some("configure"),
            Self::Shell => Some("start shell"),
        }
    }

    fn leave_command(self) -> Option<&'static str> {
        match self {
            Self::Exec => None,
            Self::Configuration => Some("exit configuration-mode"),
            Self::Shell => Some("exit"),
        }
    }

    /// Commands that take a session from `self` to `target`, each paired
    /// with the mode its prompt should show.
    pub fn route(self, target: Self) -> Vec<(&'static str, Self)> {
        if self == target {
            return Vec::new();
        }
        self.leave_command()
            .map(|command| (command, Self::Exec))
            .into_iter()
            .chain(target.enter_command().map(|command| (command, target)))
            .collect()
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
