use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::builder::ProcessCommandBuilder;
use super::runner::ProcessRunner;
use crate::abstractions::{ComposeLifecycle, OneOffCommand};
use crate::error::{common, Result};

pub const COMPOSE_PROGRAM: &str = "docker-compose";

/// [`ComposeLifecycle`] backed by the `docker-compose` CLI and a generated compose file
pub struct ComposeRunnerImpl {
    runner: Arc<dyn ProcessRunner>,
    compose_file: PathBuf,
}

impl ComposeRunnerImpl {
    pub fn new(runner: Arc<dyn ProcessRunner>, compose_file: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            compose_file: compose_file.into(),
        }
    }

    pub fn compose_file(&self) -> &Path {
        &self.compose_file
    }

    fn base(&self) -> ProcessCommandBuilder {
        let file = self.compose_file.to_string_lossy();
        ProcessCommandBuilder::new(COMPOSE_PROGRAM)
            .arg("-f")
            .arg(&file)
    }

    async fn execute(&self, builder: ProcessCommandBuilder) -> Result<()> {
        let command = builder.build();
        let command_line = command.display();
        let output = self.runner.run(command).await?;

        if !output.status.success() {
            return Err(common::command_failed(
                &command_line,
                output.status.code().unwrap_or(1),
                &output.stderr,
            ));
        }
        Ok(())
    }
}

/// Arguments for `docker-compose run` of a one-off container
fn run_args(command: &OneOffCommand) -> Vec<String> {
    let mut args = vec!["run".to_string(), "-d".to_string(), "--rm".to_string()];

    for label in &command.labels {
        args.push("-l".to_string());
        args.push(label.clone());
    }
    for (key, value) in &command.env {
        args.push("-e".to_string());
        args.push(format!("{}={}", key, value));
    }
    for volume in &command.volumes {
        args.push("-v".to_string());
        args.push(volume.clone());
    }

    args.push(command.service.clone());
    args.push(command.command.clone());
    args.extend(command.args.iter().cloned());
    args
}

#[async_trait]
impl ComposeLifecycle for ComposeRunnerImpl {
    async fn up(&self, services: &[String]) -> Result<()> {
        self.execute(self.base().args(["up", "-d"]).args(services))
            .await
    }

    async fn run_one_off(&self, command: &OneOffCommand) -> Result<()> {
        tracing::debug!("Launching one-off container: {}", command);
        self.execute(self.base().args(run_args(command))).await
    }

    async fn logs(&self, services: &[String]) -> Result<()> {
        self.execute(self.base().arg("logs").args(services).inherit_stdio())
            .await
    }

    async fn down(&self) -> Result<()> {
        self.execute(self.base().args([
            "down",
            "--volumes",
            "--rmi",
            "local",
            "--remove-orphans",
        ]))
        .await
    }

    async fn rm(&self) -> Result<()> {
        self.execute(self.base().args(["rm", "-f"])).await
    }

    async fn passthrough(&self, args: &[String]) -> Result<i32> {
        let output = self
            .runner
            .run(self.base().args(args).inherit_stdio().build())
            .await?;
        Ok(output.status.code().unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::MockProcessRunner;

    fn compose(mock: &MockProcessRunner) -> ComposeRunnerImpl {
        ComposeRunnerImpl::new(Arc::new(mock.clone()), "/work/tmp-docker-compose.yml")
    }

    #[test]
    fn test_run_args_ordering() {
        let cmd = OneOffCommand::new("airflow-web", "variables")
            .args(["-i", "/tmp/variables.json"])
            .label("initvariables")
            .env("AIRFLOW__CORE__DAGS_FOLDER", "/tmp")
            .volume("/work/tmp-variables.json:/tmp/variables.json");

        assert_eq!(
            run_args(&cmd),
            vec![
                "run",
                "-d",
                "--rm",
                "-l",
                "initvariables",
                "-e",
                "AIRFLOW__CORE__DAGS_FOLDER=/tmp",
                "-v",
                "/work/tmp-variables.json:/tmp/variables.json",
                "airflow-web",
                "variables",
                "-i",
                "/tmp/variables.json",
            ]
        );
    }

    #[tokio::test]
    async fn test_up_uses_compose_file() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command(COMPOSE_PROGRAM).returns_success().finish();

        compose(&mock)
            .up(&["metadata-db".to_string()])
            .await
            .unwrap();

        let history = mock.get_call_history();
        assert_eq!(
            history[0].args,
            vec!["-f", "/work/tmp-docker-compose.yml", "up", "-d", "metadata-db"]
        );
    }

    #[tokio::test]
    async fn test_up_failure_propagates() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command(COMPOSE_PROGRAM)
            .returns_exit_code(1)
            .returns_stderr("ERROR: No such service: nope")
            .finish();

        let err = compose(&mock).up(&["nope".to_string()]).await.unwrap_err();
        assert!(err.user_message().contains("No such service"));
    }

    #[tokio::test]
    async fn test_down_flags() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command(COMPOSE_PROGRAM).returns_success().finish();

        compose(&mock).down().await.unwrap();

        let history = mock.get_call_history();
        assert_eq!(
            &history[0].args[2..],
            &["down", "--volumes", "--rmi", "local", "--remove-orphans"]
        );
    }

    #[tokio::test]
    async fn test_passthrough_returns_exit_code() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command(COMPOSE_PROGRAM).returns_exit_code(3).finish();

        let code = compose(&mock)
            .passthrough(&["ps".to_string()])
            .await
            .unwrap();
        assert_eq!(code, 3);
        assert!(mock.get_call_history()[0].inherit_stdio);
    }

    #[tokio::test]
    async fn test_logs_failure_aborts_sequence() {
        use crate::abstractions::MockContainerRuntime;
        use crate::display::RecordingDisplay;
        use crate::readiness::ReadinessPoller;
        use crate::sequencer::{LifecycleAction, ProvisioningStep, Sequencer};

        let mut mock = MockProcessRunner::new();
        mock.expect_command(COMPOSE_PROGRAM)
            .with_args(|args| args.iter().any(|a| a == "logs"))
            .returns_exit_code(1)
            .finish();
        mock.expect_command(COMPOSE_PROGRAM).returns_success().finish();

        let display = Arc::new(RecordingDisplay::new());
        let poller = ReadinessPoller::new(Arc::new(MockContainerRuntime::new()), display.clone());
        let sequencer = Sequencer::new(Arc::new(compose(&mock)), poller, display);

        let result = sequencer
            .run(&[
                ProvisioningStep::new(
                    "Webserver logs",
                    LifecycleAction::Logs(vec!["airflow-web".to_string()]),
                ),
                ProvisioningStep::new("Everything else", LifecycleAction::Up(Vec::new())),
            ])
            .await;

        assert!(result.is_err());
        let history = mock.get_call_history();
        assert_eq!(history.len(), 1);
        assert_eq!(&history[0].args[2..], &["logs", "airflow-web"]);
        assert!(history[0].inherit_stdio);
    }
}
