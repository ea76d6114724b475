//! `variables load`

use anyhow::Result;
use std::path::Path;

use super::production_orchestrator;
use crate::app::AppConfig;

pub async fn run_variables_load(app: &AppConfig, file: &Path) -> Result<()> {
    let orchestrator = production_orchestrator(app, "prod").await?;
    orchestrator.load_variables(file).await?;
    Ok(())
}
