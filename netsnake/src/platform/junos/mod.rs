//! Juniper Junos platform support.

pub mod config_session;
pub mod facts;
mod platform;
mod privilege;

pub use config_session::{CommitMode, CommitResult, JunosConfigSession, LoadFormat, ValidationResult};
pub use facts::Facts;
pub use platform::{
    ON_OPEN_COMMANDS, TERMINAL_HEIGHT, TERMINAL_WIDTH, detect_failure, post_process_output,
};
pub use privilege::Privilege;
