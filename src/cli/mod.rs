//! CLI command handlers
//!
//! - Argument parsing structures
//! - Command implementations
//! - Verbosity helpers

pub mod args;
pub mod commands;
pub mod help;
pub mod router;

pub use args::{Cli, Commands, VariablesCommands};
pub use help::get_log_level;
pub use router::execute_command;
