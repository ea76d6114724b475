//! `run`: raw docker-compose passthrough

use anyhow::Result;

use super::production_orchestrator;
use crate::app::AppConfig;

/// Run `docker-compose -f tmp-docker-compose.yml COMMAND ARGS..` attached to the terminal
pub async fn run_passthrough(app: &AppConfig, command: String, args: Vec<String>) -> Result<i32> {
    // Environment name only matters when the compose file is generated.
    let orchestrator = production_orchestrator(app, "prod").await?;

    let mut full = Vec::with_capacity(args.len() + 1);
    full.push(command);
    full.extend(args);

    let code = orchestrator.passthrough(&full).await?;
    if code != 0 {
        tracing::debug!("docker-compose {} exited with {}", full.join(" "), code);
    }
    Ok(code)
}
