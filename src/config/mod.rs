//! Project configuration
//!
//! Settings live in the project's `pyproject.toml` under
//! `[tool.airflow-docker-compose]`. The loaded [`ComposeConfig`] is passed
//! explicitly to everything that needs it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod loader;

pub use loader::{ConfigLoader, CONFIG_FILE, CONFIG_SECTION};

pub const DEFAULT_DAGS_FOLDER: &str = "./dags";
pub const DEFAULT_AIRFLOWDOCKER_TAG: &str = "latest";
pub const DEFAULT_HOST_TMP_DIR: &str = "/tmp/airflow";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

fn default_dags_folder() -> PathBuf {
    PathBuf::from(DEFAULT_DAGS_FOLDER)
}

fn default_airflowdocker_tag() -> String {
    DEFAULT_AIRFLOWDOCKER_TAG.to_string()
}

fn default_host_tmp_dir() -> PathBuf {
    PathBuf::from(DEFAULT_HOST_TMP_DIR)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ComposeConfig {
    /// External docker network every service joins
    pub docker_network: String,

    #[serde(default = "default_dags_folder")]
    pub dags_folder: PathBuf,

    #[serde(default = "default_airflowdocker_tag")]
    pub airflowdocker_tag: String,

    /// Extra environment injected into every airflow service
    #[serde(default)]
    pub airflow_environment_variables: BTreeMap<String, Value>,

    /// Airflow variables loaded into the metadata database on start
    #[serde(default)]
    pub default_variables: BTreeMap<String, Value>,

    /// Per-service port overrides, `external = internal`
    #[serde(default)]
    pub docker_ports: BTreeMap<String, BTreeMap<String, u16>>,

    /// Per-service image tag overrides
    #[serde(default)]
    pub docker_tags: BTreeMap<String, String>,

    #[serde(default)]
    pub poll_interval_ms: Option<u64>,

    #[serde(default)]
    pub poll_timeout_secs: Option<u64>,

    /// Directory holding pyproject.toml; relative paths resolve against it
    #[serde(skip)]
    pub project_dir: PathBuf,

    /// Host side of the worker's scratch mount
    #[serde(skip, default = "default_host_tmp_dir")]
    pub host_tmp_dir: PathBuf,
}

impl ComposeConfig {
    pub fn new(docker_network: impl Into<String>) -> Self {
        Self {
            docker_network: docker_network.into(),
            dags_folder: default_dags_folder(),
            airflowdocker_tag: default_airflowdocker_tag(),
            airflow_environment_variables: BTreeMap::new(),
            default_variables: BTreeMap::new(),
            docker_ports: BTreeMap::new(),
            docker_tags: BTreeMap::new(),
            poll_interval_ms: None,
            poll_timeout_secs: None,
            project_dir: PathBuf::new(),
            host_tmp_dir: default_host_tmp_dir(),
        }
    }

    /// Apply environment overrides using the given lookup
    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(folder) = lookup("AIRFLOW_DAG_FOLDER").filter(|v| !v.is_empty()) {
            self.dags_folder = PathBuf::from(folder);
        }

        if let Some(dir) = lookup("HOST_TEMPORARY_DIRECTORY").filter(|v| !v.is_empty()) {
            self.host_tmp_dir = PathBuf::from(dir);
        }
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|key| std::env::var(key).ok());
    }

    /// Resolve a possibly relative path against the project directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            let joined = self.project_dir.join(path);
            std::path::absolute(&joined).unwrap_or(joined)
        }
    }

    /// Host directory mounted as the DAG folder for the given environment
    pub fn dags_dir_for(&self, env: &str) -> PathBuf {
        self.resolve(&self.dags_folder).join(env)
    }

    pub fn compose_file_path(&self) -> PathBuf {
        self.project_dir.join("tmp-docker-compose.yml")
    }

    pub fn variables_file_path(&self) -> PathBuf {
        self.project_dir.join("tmp-variables.json")
    }

    /// Where the bundled airflow.cfg is materialised for mounting
    pub fn airflow_cfg_path(&self) -> PathBuf {
        self.project_dir.join(".airflow-compose").join("airflow.cfg")
    }

    /// Image tag for a service: per-service override, else the given default
    pub fn tag_for(&self, service: &str, default: &str) -> String {
        self.docker_tags
            .get(service)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Port mappings for a service as `external:internal`, falling back to defaults
    pub fn ports_for(&self, service: &str, defaults: &[(u16, u16)]) -> Vec<String> {
        match self.docker_ports.get(service) {
            Some(ports) => ports
                .iter()
                .map(|(external, internal)| format!("{}:{}", external, internal))
                .collect(),
            None => defaults
                .iter()
                .map(|(external, internal)| format!("{}:{}", external, internal))
                .collect(),
        }
    }

    /// `KEY=value` pairs for the airflow services
    pub fn airflow_environment(&self) -> Vec<String> {
        self.airflow_environment_variables
            .iter()
            .map(|(key, value)| format!("{}={}", key, env_value(value)))
            .collect()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout_secs.map(Duration::from_secs)
    }
}

/// Render a config value the way it should appear in an environment variable
fn env_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(toml_str: &str) -> ComposeConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(r#"docker-network = "airflow""#);

        assert_eq!(config.docker_network, "airflow");
        assert_eq!(config.dags_folder, PathBuf::from("./dags"));
        assert_eq!(config.airflowdocker_tag, "latest");
        assert!(config.default_variables.is_empty());
        assert_eq!(config.host_tmp_dir, PathBuf::from("/tmp/airflow"));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.poll_timeout(), None);
    }

    #[test]
    fn test_full_section() {
        let config = parse(
            r#"
docker-network = "data-net"
dags-folder = "pipelines"
airflowdocker-tag = "1.10"
poll-timeout-secs = 300

[airflow-environment-variables]
AIRFLOW__CORE__LOAD_EXAMPLES = false
AIRFLOW__WEBSERVER__RBAC = "True"

[default-variables]
bucket = "dev-bucket"
retries = 3

[docker-ports.airflow-web]
"8080" = 8080

[docker-tags]
metadata-db = "11"
"#,
        );

        assert_eq!(config.dags_folder, PathBuf::from("pipelines"));
        assert_eq!(config.airflowdocker_tag, "1.10");
        assert_eq!(config.poll_timeout(), Some(Duration::from_secs(300)));
        assert_eq!(
            config.airflow_environment(),
            vec![
                "AIRFLOW__CORE__LOAD_EXAMPLES=false",
                "AIRFLOW__WEBSERVER__RBAC=True"
            ]
        );
        assert_eq!(config.default_variables.get("retries"), Some(&json!(3)));
        assert_eq!(
            config.ports_for("airflow-web", &[(30000, 8080)]),
            vec!["8080:8080"]
        );
        assert_eq!(config.ports_for("flower", &[(30001, 5555)]), vec!["30001:5555"]);
        assert_eq!(config.tag_for("metadata-db", "10"), "11");
        assert_eq!(config.tag_for("redis", "3.2.4"), "3.2.4");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ComposeConfig::new("airflow");
        config.merge_env_with(|key| match key {
            "AIRFLOW_DAG_FOLDER" => Some("/srv/dags".to_string()),
            "HOST_TEMPORARY_DIRECTORY" => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.dags_folder, PathBuf::from("/srv/dags"));
        assert_eq!(config.host_tmp_dir, PathBuf::from(DEFAULT_HOST_TMP_DIR));
        assert_eq!(config.dags_dir_for("prod"), PathBuf::from("/srv/dags/prod"));
    }

    #[test]
    fn test_generated_paths_live_in_project_dir() {
        let mut config = ComposeConfig::new("airflow");
        config.project_dir = PathBuf::from("/work/project");

        assert_eq!(
            config.compose_file_path(),
            PathBuf::from("/work/project/tmp-docker-compose.yml")
        );
        assert_eq!(
            config.variables_file_path(),
            PathBuf::from("/work/project/tmp-variables.json")
        );
        assert_eq!(
            config.dags_dir_for("dev"),
            PathBuf::from("/work/project/dags/dev")
        );
    }
}
