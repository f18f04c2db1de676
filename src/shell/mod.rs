//! Child process execution.
//!
//! - [`command`] - Spawning, tracking, and reaping child processes
//! - [`quote`] - Shell quoting for echoed commands
//! - [`signal`] - User interrupt tracking

pub mod command;
pub mod quote;
pub mod signal;

pub use command::{CommandOptions, CommandResult, ProcessId, ProcessTracker};
pub use quote::{command_line, quote};
pub use signal::{install_interrupt_handler, interrupted};
