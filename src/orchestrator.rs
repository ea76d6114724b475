//! High level operations behind the CLI commands
//!
//! [`EnvironmentOrchestrator`] owns the project configuration and the
//! collaborators (container runtime, compose lifecycle, display) and exposes
//! `up`, `start`, `reset`, variable loading and passthrough.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::abstractions::{ComposeLifecycle, ContainerRuntime};
use crate::compose;
use crate::config::ComposeConfig;
use crate::display::ProgressDisplay;
use crate::error::{ComposeError, ErrorCode, Result};
use crate::readiness::{ReadinessPoller, WaitPolicy};
use crate::sequencer::{load_variables_step, startup_steps, ui_summary, Sequencer};
use crate::subprocess::SubprocessManager;
use crate::variables;

pub const BINARY_NAME: &str = "airflow-compose";

pub struct EnvironmentOrchestrator {
    config: ComposeConfig,
    env: String,
    runtime: Arc<dyn ContainerRuntime>,
    lifecycle: Arc<dyn ComposeLifecycle>,
    display: Arc<dyn ProgressDisplay>,
    cancel: CancellationToken,
}

impl EnvironmentOrchestrator {
    pub fn new(
        config: ComposeConfig,
        env: impl Into<String>,
        runtime: Arc<dyn ContainerRuntime>,
        lifecycle: Arc<dyn ComposeLifecycle>,
        display: Arc<dyn ProgressDisplay>,
    ) -> Self {
        Self {
            config,
            env: env.into(),
            runtime,
            lifecycle,
            display,
            cancel: CancellationToken::new(),
        }
    }

    /// Orchestrator driving the real `docker` and `docker-compose` CLIs
    pub fn with_subprocess(
        config: ComposeConfig,
        env: impl Into<String>,
        subprocess: &SubprocessManager,
        display: Arc<dyn ProgressDisplay>,
    ) -> Self {
        let runtime = Arc::new(subprocess.docker());
        let lifecycle = Arc::new(subprocess.compose(config.compose_file_path()));
        Self::new(config, env, runtime, lifecycle, display)
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        let mut policy = WaitPolicy::default().with_interval(self.config.poll_interval());
        if let Some(timeout) = self.config.poll_timeout() {
            policy = policy.with_timeout(timeout);
        }
        policy
    }

    fn sequencer(&self) -> Sequencer {
        let poller = ReadinessPoller::new(Arc::clone(&self.runtime), Arc::clone(&self.display))
            .with_policy(self.wait_policy())
            .with_cancellation(self.cancel.clone());
        Sequencer::new(
            Arc::clone(&self.lifecycle),
            poller,
            Arc::clone(&self.display),
        )
    }

    /// Create the external docker network unless it already exists
    pub async fn ensure_network(&self) -> Result<()> {
        let network = &self.config.docker_network;
        self.display
            .banner(&format!("Creating {} if it does not exist", network));

        let existing = self.runtime.list_networks().await?;
        if existing.iter().any(|name| name == network) {
            tracing::debug!("Network {} already exists", network);
            return Ok(());
        }

        tracing::info!("Creating docker network {}", network);
        self.runtime.create_network(network).await
    }

    /// Write the compose file and bundled airflow.cfg
    pub async fn prepare(&self) -> Result<PathBuf> {
        compose::write_environment_files(&self.config, &self.env).await
    }

    pub async fn up(&self, services: &[String]) -> Result<()> {
        self.ensure_network().await?;
        self.prepare().await?;
        self.lifecycle.up(services).await
    }

    /// Bootstrap the environment from an empty metadata database
    pub async fn start(&self) -> Result<()> {
        self.ensure_network().await?;
        self.prepare().await?;

        variables::write_variables_file(
            &self.config.variables_file_path(),
            &self.config.default_variables,
        )
        .await?;

        self.sequencer()
            .run(&startup_steps(&self.config))
            .await?;

        self.display.success("Airflow is up");
        for line in ui_summary(BINARY_NAME).lines() {
            self.display.info(line);
        }
        Ok(())
    }

    /// Tear everything down, then `start` again
    pub async fn reset(&self) -> Result<()> {
        self.ensure_network().await?;
        self.prepare().await?;

        self.display
            .banner("Bringing any existing airflow instance down and removing any volumes");
        self.lifecycle.down().await?;
        self.lifecycle.rm().await?;

        self.start().await
    }

    /// Import a variables JSON file into a running environment
    pub async fn load_variables(&self, file: &Path) -> Result<()> {
        if !file.is_file() {
            return Err(ComposeError::storage_with_code(
                ErrorCode::STORAGE_NOT_FOUND,
                "variables file does not exist",
                Some(file.to_path_buf()),
            ));
        }
        let file = std::path::absolute(file)?;

        self.prepare().await?;
        self.sequencer().run(&[load_variables_step(&file)]).await
    }

    /// Hand arbitrary arguments to docker-compose, returning its exit code
    pub async fn passthrough(&self, args: &[String]) -> Result<i32> {
        self.ensure_network().await?;
        self.lifecycle.passthrough(args).await
    }
}
