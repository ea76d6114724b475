//! Startup sequencing
//!
//! A [`Sequencer`] walks an ordered list of [`ProvisioningStep`]s. Each step
//! issues one lifecycle action and, if it declares an [`Expectation`], blocks
//! on the readiness poller before the next step may begin. The first failure
//! aborts the run; nothing is rolled back and a re-run starts from the top.

pub mod canonical;

pub use canonical::{load_variables_step, startup_steps, ui_summary};

use std::fmt;
use std::sync::Arc;

use crate::abstractions::{ComposeLifecycle, OneOffCommand};
use crate::display::ProgressDisplay;
use crate::error::Result;
use crate::readiness::{Expectation, ReadinessPoller};

/// What a step asks the container group manager to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleAction {
    /// `up`; an empty list brings up every declared service
    Up(Vec<String>),
    Run(OneOffCommand),
    Logs(Vec<String>),
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up(services) if services.is_empty() => write!(f, "up (all services)"),
            Self::Up(services) => write!(f, "up {}", services.join(" ")),
            Self::Run(command) => write!(f, "run {}", command),
            Self::Logs(services) => write!(f, "logs {}", services.join(" ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningStep {
    pub banner: String,
    pub action: LifecycleAction,
    pub readiness: Option<Expectation>,
}

impl ProvisioningStep {
    pub fn new(banner: impl Into<String>, action: LifecycleAction) -> Self {
        Self {
            banner: banner.into(),
            action,
            readiness: None,
        }
    }

    pub fn wait_until(mut self, expectation: Expectation) -> Self {
        self.readiness = Some(expectation);
        self
    }
}

pub struct Sequencer {
    lifecycle: Arc<dyn ComposeLifecycle>,
    poller: ReadinessPoller,
    display: Arc<dyn ProgressDisplay>,
}

impl Sequencer {
    pub fn new(
        lifecycle: Arc<dyn ComposeLifecycle>,
        poller: ReadinessPoller,
        display: Arc<dyn ProgressDisplay>,
    ) -> Self {
        Self {
            lifecycle,
            poller,
            display,
        }
    }

    /// Run the steps strictly in order, stopping at the first failure
    pub async fn run(&self, steps: &[ProvisioningStep]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            self.display.banner(&step.banner);
            tracing::debug!("Step {}/{}: {}", index + 1, steps.len(), step.action);

            self.execute(&step.action)
                .await
                .map_err(|e| e.with_context(format!("step {} '{}'", index + 1, step.banner)))?;

            if let Some(expectation) = &step.readiness {
                self.poller
                    .wait_for(expectation)
                    .await
                    .map_err(|e| e.with_context(format!("step {} '{}'", index + 1, step.banner)))?;
            }
        }
        Ok(())
    }

    async fn execute(&self, action: &LifecycleAction) -> Result<()> {
        match action {
            LifecycleAction::Up(services) => self.lifecycle.up(services).await,
            LifecycleAction::Run(command) => self.lifecycle.run_one_off(command).await,
            LifecycleAction::Logs(services) => self.lifecycle.logs(services).await,
        }
    }
}
