use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::builder::ProcessCommandBuilder;
use super::runner::{ProcessCommand, ProcessOutput, ProcessRunner};
use crate::abstractions::{ContainerFilter, ContainerObservation, ContainerRuntime};
use crate::error::{common, ComposeError, ErrorCode, Result};

const DOCKER: &str = "docker";

/// `docker ps` output format: one container per line, name then labels
const PS_FORMAT: &str = "{{.Names}}\t{{.Labels}}";

/// [`ContainerRuntime`] backed by the `docker` CLI
pub struct DockerRunnerImpl {
    runner: Arc<dyn ProcessRunner>,
}

impl DockerRunnerImpl {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    async fn docker(&self, command: ProcessCommand) -> Result<ProcessOutput> {
        let command_line = command.display();
        let output = self.runner.run(command).await?;
        check_command_success(&command_line, &output)?;
        Ok(output)
    }
}

/// Translate a non-zero exit into an execution error carrying stderr
fn check_command_success(command_line: &str, output: &ProcessOutput) -> Result<()> {
    if output.status.success() {
        Ok(())
    } else {
        Err(common::command_failed(
            command_line,
            output.status.code().unwrap_or(1),
            &output.stderr,
        ))
    }
}

/// Build the `docker ps` invocation for a filter
fn ps_command(filter: &ContainerFilter) -> ProcessCommand {
    let mut filters = Vec::new();
    if let Some(ref name) = filter.name {
        filters.push(format!("name={}", name));
    }
    if let Some(ref label) = filter.label {
        filters.push(format!("label={}", label));
    }

    ProcessCommandBuilder::new(DOCKER)
        .args(["ps", "--no-trunc"])
        .repeated("--filter", filters)
        .args(["--format", PS_FORMAT])
        .build()
}

/// Parse docker's `k=v,k2=v2` label rendering.
/// A fragment without `=` belongs to the previous value (a value containing a comma).
fn parse_labels(raw: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    let mut last_key: Option<String> = None;

    for fragment in raw.split(',').filter(|f| !f.is_empty()) {
        match fragment.split_once('=') {
            Some((key, value)) => {
                labels.insert(key.to_string(), value.to_string());
                last_key = Some(key.to_string());
            }
            None => match last_key.as_ref().and_then(|k| labels.get_mut(k)) {
                Some(value) => {
                    value.push(',');
                    value.push_str(fragment);
                }
                None => {
                    labels.insert(fragment.to_string(), String::new());
                }
            },
        }
    }

    labels
}

/// Parse `docker ps --format` output into observations
fn parse_ps_output(output: &str) -> Result<Vec<ContainerObservation>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (names, labels) = line.split_once('\t').unwrap_or((line, ""));
            let name = names.split(',').next().unwrap_or_default().trim();
            if name.is_empty() {
                return Err(ComposeError::runtime(
                    ErrorCode::RUNTIME_UNPARSEABLE_OUTPUT,
                    format!("docker ps line without a container name: {:?}", line),
                ));
            }
            Ok(ContainerObservation {
                name: name.to_string(),
                labels: parse_labels(labels.trim()),
            })
        })
        .collect()
}

#[async_trait]
impl ContainerRuntime for DockerRunnerImpl {
    async fn list_running(&self, filter: &ContainerFilter) -> Result<Vec<ContainerObservation>> {
        let output = self.docker(ps_command(filter)).await.map_err(|e| {
            ComposeError::runtime(ErrorCode::RUNTIME_LISTING_FAILED, "Failed to list containers")
                .with_source(e)
        })?;
        let containers = parse_ps_output(&output.stdout)?;
        tracing::trace!("{} container(s) match {}", containers.len(), filter);
        Ok(containers)
    }

    async fn list_networks(&self) -> Result<Vec<String>> {
        let output = self
            .docker(
                ProcessCommandBuilder::new(DOCKER)
                    .args(["network", "ls", "--format", "{{.Name}}"])
                    .build(),
            )
            .await?;

        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn create_network(&self, name: &str) -> Result<()> {
        self.docker(
            ProcessCommandBuilder::new(DOCKER)
                .args(["network", "create", name])
                .build(),
        )
        .await
        .map_err(|e| {
            ComposeError::runtime(
                ErrorCode::RUNTIME_NETWORK_FAILED,
                format!("Failed to create network '{}'", name),
            )
            .with_source(e)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::MockProcessRunner;

    #[test]
    fn test_ps_command_filters() {
        let filter = ContainerFilter {
            name: Some("metadata-db".to_string()),
            label: Some("dbinit".to_string()),
        };
        let cmd = ps_command(&filter);
        assert_eq!(cmd.program, "docker");
        assert_eq!(
            cmd.args,
            vec![
                "ps",
                "--no-trunc",
                "--filter",
                "name=metadata-db",
                "--filter",
                "label=dbinit",
                "--format",
                PS_FORMAT
            ]
        );
    }

    #[test]
    fn test_parse_labels_with_comma_in_value() {
        let labels = parse_labels("com.docker.compose.service=web,dbinit=,desc=a,b");
        assert_eq!(labels.get("com.docker.compose.service").unwrap(), "web");
        assert_eq!(labels.get("dbinit").unwrap(), "");
        assert_eq!(labels.get("desc").unwrap(), "a,b");
    }

    #[test]
    fn test_parse_ps_output() {
        let stdout = "proj_web_1\tcom.docker.compose.service=airflow-web\nproj_web_run_3\tdbinit=\n\n";
        let containers = parse_ps_output(stdout).unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0].compose_service(), Some("airflow-web"));
        assert!(containers[1].labels.contains_key("dbinit"));
    }

    #[test]
    fn test_parse_ps_output_rejects_nameless_line() {
        let err = parse_ps_output("\tdbinit=").unwrap_err();
        assert_eq!(err.code(), ErrorCode::RUNTIME_UNPARSEABLE_OUTPUT);
    }

    #[tokio::test]
    async fn test_list_running_via_runner() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("docker")
            .with_args(|args| args.first().map(String::as_str) == Some("ps"))
            .returns_stdout("proj_metadata-db_1\t\n")
            .finish();

        let docker = DockerRunnerImpl::new(Arc::new(mock.clone()));
        let containers = docker
            .list_running(&ContainerFilter::by_name("metadata-db"))
            .await
            .unwrap();

        assert_eq!(containers, vec![ContainerObservation::new("proj_metadata-db_1")]);
        assert!(mock.verify_called("docker", 1));
    }

    #[tokio::test]
    async fn test_list_running_failure_is_runtime_error() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("docker")
            .returns_exit_code(1)
            .returns_stderr("Cannot connect to the Docker daemon")
            .finish();

        let docker = DockerRunnerImpl::new(Arc::new(mock));
        let err = docker
            .list_running(&ContainerFilter::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::RUNTIME_LISTING_FAILED);
    }

    #[tokio::test]
    async fn test_network_commands() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("docker")
            .with_args(|args| args.starts_with(&["network".to_string(), "ls".to_string()]))
            .returns_stdout("bridge\nhost\nairflow\n")
            .finish();
        mock.expect_command("docker")
            .with_args(|args| args == ["network", "create", "airflow"])
            .returns_success()
            .finish();

        let docker = DockerRunnerImpl::new(Arc::new(mock.clone()));
        assert_eq!(
            docker.list_networks().await.unwrap(),
            vec!["bridge", "host", "airflow"]
        );
        docker.create_network("airflow").await.unwrap();
        assert!(mock.verify_called("docker", 2));
    }
}
