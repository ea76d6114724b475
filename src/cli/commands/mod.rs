//! Command implementation modules
//!
//! Each CLI command is implemented in its own module.

pub mod environment;
pub mod passthrough;
pub mod variables;

pub use dag_test::run_dag_tests;
pub use environment::{run_reset, run_start, run_up};
pub use passthrough::run_passthrough;
pub use variables::run_variables_load;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::display::ConsoleDisplay;
use crate::orchestrator::EnvironmentOrchestrator;
use crate::subprocess::SubprocessManager;

/// Load pyproject.toml and wire an orchestrator to the real docker CLIs
pub(crate) async fn production_orchestrator(
    app: &AppConfig,
    env: &str,
) -> crate::error::Result<EnvironmentOrchestrator> {
    let config = app.load_project().await?;
    let subprocess = SubprocessManager::production();

    Ok(
        EnvironmentOrchestrator::with_subprocess(config, env, &subprocess, Arc::new(ConsoleDisplay))
            .with_cancellation(app.cancel.clone()),
    )
}
