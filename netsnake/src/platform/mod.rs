//! Device platforms.
//!
//! Junos is the only platform netsnake talks to: its prompts and modes,
//! output cleanup, configuration mode and facts live in [`junos`].

pub mod junos;
