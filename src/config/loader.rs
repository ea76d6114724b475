use super::ComposeConfig;
use crate::error::{common, ComposeError, ErrorCode, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const CONFIG_FILE: &str = "pyproject.toml";
pub const CONFIG_SECTION: &str = "tool.airflow-docker-compose";

/// Reads `[tool.airflow-docker-compose]` out of a project's pyproject.toml
pub struct ConfigLoader {
    project_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.project_dir.join(CONFIG_FILE)
    }

    /// Load the config and apply environment overrides
    pub async fn load(&self) -> Result<ComposeConfig> {
        let mut config = self.load_without_env().await?;
        config.merge_env_vars();
        Ok(config)
    }

    pub async fn load_without_env(&self) -> Result<ComposeConfig> {
        let path = self.config_path();
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(common::config_not_found(&path));
        }

        let content = fs::read_to_string(&path).await?;
        let mut config = parse_section(&content, &path)?;
        config.project_dir = self.project_dir.clone();

        tracing::debug!(
            "Loaded {} from {} (network: {})",
            CONFIG_SECTION,
            path.display(),
            config.docker_network
        );
        Ok(config)
    }
}

/// Extract and deserialize the tool section from pyproject.toml content
pub fn parse_section(content: &str, path: &Path) -> Result<ComposeConfig> {
    let document: toml::Table = toml::from_str(content)
        .map_err(|e| ComposeError::from(e).with_path(path))?;

    let section = document
        .get("tool")
        .and_then(|tool| tool.as_table())
        .and_then(|tool| tool.get("airflow-docker-compose"))
        .and_then(|section| section.as_table())
        .ok_or_else(|| common::config_missing_section(path, CONFIG_SECTION))?;

    if !section.contains_key("docker-network") {
        return Err(common::missing_required_field("docker-network").with_path(path));
    }

    let config = toml::Value::Table(section.clone())
        .try_into::<ComposeConfig>()
        .map_err(|e| {
            ComposeError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!("Invalid [{}] section: {}", CONFIG_SECTION, e),
            )
            .with_path(path)
        })?;

    if config.poll_interval_ms == Some(0) {
        return Err(ComposeError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            "poll-interval-ms must be greater than zero",
        )
        .with_path(path));
    }

    Ok(config)
}
