//! Runtime initialization and setup

use crate::app::{config::AppConfig, logging::init_logging};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Load `.env`, then initialize logging
pub fn initialize_app(config: &AppConfig) {
    // .env must be read before logging so RUST_LOG in it is honoured.
    let dotenv = dotenvy::dotenv();

    init_logging(config);

    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }
}

/// Cancel the token on the first Ctrl-C so pending waits stop cleanly
pub fn install_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            cancel.cancel();
        }
    });
}
