//! Compose document generation
//!
//! The compose file is built as typed data from [`ComposeConfig`] and
//! serialised with serde_yaml, then written next to pyproject.toml together
//! with the bundled `airflow.cfg` it mounts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::ComposeConfig;
use crate::error::{ComposeError, ErrorCode, Result};

pub const AIRFLOW_WEB: &str = "airflow-web";
pub const AIRFLOW_SCHEDULER: &str = "airflow-scheduler";
pub const AIRFLOW_WORKER: &str = "airflow-worker";
pub const FLOWER: &str = "flower";
pub const METADATA_DB: &str = "metadata-db";
pub const REDIS: &str = "redis";

pub const AIRFLOW_IMAGE: &str = "airflowdocker/service";
pub const WEB_UI_PORT: u16 = 30000;
pub const FLOWER_PORT: u16 = 30001;

const COMPOSE_VERSION: &str = "3";
const CONTAINER_CFG_PATH: &str = "/airflow/airflow.cfg";
const CONTAINER_DAGS_PATH: &str = "/airflow/dags";
const CONTAINER_TMP_PATH: &str = "/tmp/airflow";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Bundled Airflow configuration mounted into every airflow service
pub const AIRFLOW_CFG: &str = include_str!("../../resources/airflow.cfg");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeFile {
    pub version: String,
    pub services: BTreeMap<String, ServiceSpec>,
    pub networks: BTreeMap<String, NetworkSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub external: bool,
}

fn mount(host: &Path, container: &str) -> String {
    format!("{}:{}", host.display(), container)
}

fn image(config: &ComposeConfig, repository: &str, service: &str, default_tag: &str) -> String {
    format!("{}:{}", repository, config.tag_for(service, default_tag))
}

/// Settings shared by every service built from the airflowdocker image
fn airflow_service(
    config: &ComposeConfig,
    env: &str,
    service: &str,
    command: &str,
    default_ports: &[(u16, u16)],
) -> ServiceSpec {
    ServiceSpec {
        image: image(config, AIRFLOW_IMAGE, service, &config.airflowdocker_tag),
        command: Some(command.to_string()),
        ports: config.ports_for(service, default_ports),
        networks: vec![config.docker_network.clone()],
        environment: config.airflow_environment(),
        volumes: vec![
            mount(&config.airflow_cfg_path(), CONTAINER_CFG_PATH),
            mount(&config.dags_dir_for(env), CONTAINER_DAGS_PATH),
        ],
        ..ServiceSpec::default()
    }
}

/// Build the compose document for one DAG environment (e.g. `prod`)
pub fn build_compose_file(config: &ComposeConfig, env: &str) -> ComposeFile {
    let mut services = BTreeMap::new();

    services.insert(
        AIRFLOW_WEB.to_string(),
        airflow_service(config, env, AIRFLOW_WEB, "webserver", &[(WEB_UI_PORT, 8080)]),
    );
    services.insert(
        AIRFLOW_SCHEDULER.to_string(),
        airflow_service(config, env, AIRFLOW_SCHEDULER, "scheduler", &[]),
    );

    let mut worker = airflow_service(config, env, AIRFLOW_WORKER, "worker", &[]);
    let host_tmp = config.host_tmp_dir.display().to_string();
    worker.user = Some("root".to_string());
    worker.volumes.push(format!("{DOCKER_SOCKET}:{DOCKER_SOCKET}"));
    worker
        .volumes
        .push(format!("{}:{}", host_tmp, CONTAINER_TMP_PATH));
    let mut environment = vec![
        "C_FORCE_ROOT=1".to_string(),
        format!("AIRFLOW__WORKER__HOST_TEMPORARY_DIRECTORY={}", host_tmp),
    ];
    environment.append(&mut worker.environment);
    worker.environment = environment;
    services.insert(AIRFLOW_WORKER.to_string(), worker);

    services.insert(
        FLOWER.to_string(),
        airflow_service(config, env, FLOWER, "flower", &[(FLOWER_PORT, 5555)]),
    );

    services.insert(
        METADATA_DB.to_string(),
        ServiceSpec {
            image: image(config, "postgres", METADATA_DB, "10"),
            ports: config.ports_for(METADATA_DB, &[(30003, 5432)]),
            networks: vec![config.docker_network.clone()],
            environment: vec![
                "POSTGRES_DB=airflow".to_string(),
                "POSTGRES_USER=airflow".to_string(),
                "POSTGRES_PASSWORD=airflow".to_string(),
            ],
            ..ServiceSpec::default()
        },
    );

    services.insert(
        REDIS.to_string(),
        ServiceSpec {
            image: image(config, "redis", REDIS, "3.2.4"),
            ports: config.ports_for(REDIS, &[]),
            networks: vec![config.docker_network.clone()],
            ..ServiceSpec::default()
        },
    );

    let mut networks = BTreeMap::new();
    networks.insert(config.docker_network.clone(), NetworkSpec { external: true });

    ComposeFile {
        version: COMPOSE_VERSION.to_string(),
        services,
        networks,
    }
}

pub fn render(document: &ComposeFile) -> Result<String> {
    Ok(serde_yaml::to_string(document)?)
}

async fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ComposeError::from(e).with_path(parent))?;
    }
    tokio::fs::write(path, contents).await.map_err(|e| {
        ComposeError::storage_with_code(
            ErrorCode::STORAGE_IO_ERROR,
            "failed to write generated file",
            Some(path.to_path_buf()),
        )
        .with_source(e)
    })
}

/// Write the compose file and the airflow.cfg it mounts, returning the compose file path
pub async fn write_environment_files(config: &ComposeConfig, env: &str) -> Result<PathBuf> {
    write_file(&config.airflow_cfg_path(), AIRFLOW_CFG).await?;

    let path = config.compose_file_path();
    let document = build_compose_file(config, env);
    write_file(&path, &render(&document)?).await?;

    tracing::debug!(
        "Wrote compose file for '{}' environment to {}",
        env,
        path.display()
    );
    Ok(path)
}
