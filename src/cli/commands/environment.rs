//! `up`, `start` and `reset`

use anyhow::Result;
use tracing::info;

use super::production_orchestrator;
use crate::app::AppConfig;

pub async fn run_up(app: &AppConfig, service: Option<String>, env: &str) -> Result<()> {
    let orchestrator = production_orchestrator(app, env).await?;
    let services: Vec<String> = service.into_iter().collect();

    orchestrator.up(&services).await?;
    info!("Services are up ({} environment)", env);
    Ok(())
}

pub async fn run_start(app: &AppConfig, env: &str) -> Result<()> {
    let orchestrator = production_orchestrator(app, env).await?;
    orchestrator.start().await?;
    Ok(())
}

pub async fn run_reset(app: &AppConfig, env: &str) -> Result<()> {
    let orchestrator = production_orchestrator(app, env).await?;
    orchestrator.reset().await?;
    Ok(())
}
