//! Application layer - use cases and services

pub mod commands;
pub mod session;

pub use commands::{Cli, Commands, CommandExecutor};
pub use session::SwapSession;
