//! DAG test runner
//!
//! Runs the `airflowdocker/tester` image against a DAG directory and streams
//! its output as it arrives.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{common, Result};
use crate::subprocess::{ProcessCommand, ProcessCommandBuilder, ProcessRunner};

pub const TESTER_IMAGE: &str = "airflowdocker/tester";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOptions {
    pub dag_dir: PathBuf,
    pub tag: String,
    /// Mounted as extra tests only when the directory exists
    pub extra_test_dir: PathBuf,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            dag_dir: PathBuf::from("."),
            tag: "latest".to_string(),
            extra_test_dir: PathBuf::from("tests"),
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl TestOptions {
    pub fn volumes(&self) -> Vec<String> {
        let mut volumes = vec![format!("{}:/airflow/dags", absolute(&self.dag_dir).display())];

        let extra = absolute(&self.extra_test_dir);
        if extra.is_dir() {
            volumes.push(format!("{}:/airflow/tests/ext", extra.display()));
        }
        volumes
    }

    pub fn command(&self) -> ProcessCommand {
        ProcessCommandBuilder::new("docker")
            .args(["run", "--rm", "-t"])
            .repeated("-v", self.volumes())
            .arg(&format!("{}:{}", TESTER_IMAGE, self.tag))
            .build()
    }
}

pub struct DagTester {
    runner: Arc<dyn ProcessRunner>,
}

impl DagTester {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Run the tester, handing each output line to `on_line`
    pub async fn run<F>(&self, options: &TestOptions, mut on_line: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        let command = options.command();
        let command_line = command.display();
        tracing::info!("Testing DAGs in {}", options.dag_dir.display());

        let stream = self.runner.run_streaming(command).await?;
        let mut lines = futures::stream::select(stream.stdout, stream.stderr);
        while let Some(line) = lines.next().await {
            on_line(&line?);
        }

        let status = stream.status.await?;
        if !status.success() {
            return Err(common::command_failed(
                &command_line,
                status.code().unwrap_or(1),
                "DAG tests failed",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::MockProcessRunner;
    use tempfile::TempDir;

    #[test]
    fn test_command_without_extra_tests() {
        let dir = TempDir::new().unwrap();
        let options = TestOptions {
            dag_dir: dir.path().to_path_buf(),
            tag: "0.3".to_string(),
            extra_test_dir: dir.path().join("does-not-exist"),
        };

        let command = options.command();
        assert_eq!(command.program, "docker");
        assert_eq!(
            command.args,
            vec![
                "run".to_string(),
                "--rm".to_string(),
                "-t".to_string(),
                "-v".to_string(),
                format!("{}:/airflow/dags", dir.path().display()),
                "airflowdocker/tester:0.3".to_string(),
            ]
        );
    }

    #[test]
    fn test_existing_extra_tests_are_mounted() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("tests")).unwrap();
        let options = TestOptions {
            dag_dir: dir.path().to_path_buf(),
            extra_test_dir: dir.path().join("tests"),
            ..TestOptions::default()
        };

        let volumes = options.volumes();
        assert_eq!(volumes.len(), 2);
        assert!(volumes[1].ends_with("/tests:/airflow/tests/ext"));
    }

    #[tokio::test]
    async fn test_streams_output() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("docker")
            .returns_stdout("test_dag_integrity PASSED\n1 passed\n")
            .finish();

        let mut seen = Vec::new();
        DagTester::new(Arc::new(mock))
            .run(&TestOptions::default(), |line| seen.push(line.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["test_dag_integrity PASSED", "1 passed"]);
    }

    #[tokio::test]
    async fn test_failing_tests_surface_exit_code() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("docker")
            .returns_stdout("1 failed\n")
            .returns_exit_code(1)
            .finish();

        let err = DagTester::new(Arc::new(mock))
            .run(&TestOptions::default(), |_| {})
            .await
            .unwrap_err();

        assert!(err.user_message().contains("DAG tests failed"));
    }
}
