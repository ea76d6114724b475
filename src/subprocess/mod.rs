pub mod builder;
pub mod compose;
pub mod docker;
pub mod error;
pub mod mock;
pub mod runner;


pub use builder::ProcessCommandBuilder;
pub use compose::{ComposeRunnerImpl, COMPOSE_PROGRAM};
pub use docker::DockerRunnerImpl;
pub use error::ProcessError;
pub use mock::{MockCommandConfig, MockProcessRunner};
pub use runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner, ProcessStream};

use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct SubprocessManager {
    runner: Arc<dyn ProcessRunner>,
}

impl SubprocessManager {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    pub fn production() -> Self {
        Self::new(Arc::new(runner::TokioProcessRunner))
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        Arc::clone(&self.runner)
    }

    pub fn docker(&self) -> DockerRunnerImpl {
        DockerRunnerImpl::new(Arc::clone(&self.runner))
    }

    pub fn compose(&self, compose_file: impl Into<PathBuf>) -> ComposeRunnerImpl {
        ComposeRunnerImpl::new(Arc::clone(&self.runner), compose_file)
    }
}
