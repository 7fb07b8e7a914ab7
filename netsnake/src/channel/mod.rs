//! Shell channel reads: output is buffered with escape sequences removed
//! until a Junos prompt shows up at its tail.

mod buffer;
mod pty;

pub use buffer::PatternBuffer;
pub use pty::PtyChannel;
