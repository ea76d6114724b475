//! Application configuration
//!
//! Settings that come from the command line rather than pyproject.toml.

use anyhow::Result;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::cli::get_log_level;
use crate::config::{ComposeConfig, ConfigLoader};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Directory holding pyproject.toml
    pub working_dir: PathBuf,
    /// `--poll-timeout`, overriding `poll-timeout-secs`
    pub poll_timeout_secs: Option<u64>,
    /// Cancelled on Ctrl-C
    pub cancel: CancellationToken,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Result<Self> {
        let working_dir = std::env::current_dir()
            .map_err(|e| anyhow::anyhow!("Failed to get current directory: {}", e))?;

        Ok(Self {
            verbose,
            working_dir,
            poll_timeout_secs: None,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn with_poll_timeout(mut self, secs: Option<u64>) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    pub fn log_level(&self) -> &'static str {
        get_log_level(self.verbose)
    }

    /// Load the project configuration with command line overrides applied
    pub async fn load_project(&self) -> crate::error::Result<ComposeConfig> {
        let mut config = ConfigLoader::new(&self.working_dir).load().await?;
        if let Some(secs) = self.poll_timeout_secs {
            config.poll_timeout_secs = Some(secs);
        }
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            working_dir: PathBuf::from("."),
            poll_timeout_secs: None,
            cancel: CancellationToken::new(),
        }
    }
}
