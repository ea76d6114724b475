//! Error handling utilities
//!
//! Fatal errors reach the binary as `anyhow::Error`. When one wraps a
//! `ComposeError`, its user message and exit code are used.

use tracing::error;

use crate::error::{describe_error_code, ComposeError};

/// Exit code for an error that escaped to the binary
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<ComposeError>()
        .map(ComposeError::exit_code)
        .unwrap_or(1)
}

/// Report a fatal error and exit.
///
/// - `verbose = 0`: user-facing message only
/// - `verbose >= 1`: also the full error chain
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    if let Some(compose_err) = error.downcast_ref::<ComposeError>() {
        eprintln!("{}", compose_err.user_message());
        if verbose >= 1 {
            let code = compose_err.code();
            eprintln!("\nError code E{:04}: {}", code, describe_error_code(code));
        }
    } else {
        eprintln!("Error: {error}");
    }

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code_for(&error))
}
