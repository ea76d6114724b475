//! Application module
//!
//! Process-level concerns of the binary:
//! - Application configuration from the command line
//! - Logging setup
//! - Runtime initialization (`.env`, Ctrl-C)
//! - Fatal error reporting

pub mod config;
pub mod error_handling;
pub mod logging;
pub mod runtime;

pub use config::AppConfig;
pub use error_handling::{exit_code_for, handle_fatal_error};
pub use logging::init_logging;
pub use runtime::{initialize_app, install_interrupt_handler};
