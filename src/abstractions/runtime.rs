//! Container runtime abstraction layer
//!
//! Provides the read side of the docker daemon: which containers are running
//! and which networks exist. The readiness poller only ever talks to this
//! trait, so tests can script what the "daemon" reports on each tick.

use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::Result;

/// Label docker-compose puts on every container it creates
pub const COMPOSE_SERVICE_LABEL: &str = "com.docker.compose.service";

/// A running container as seen by one listing query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerObservation {
    pub name: String,
    pub labels: BTreeMap<String, String>,
}

impl ContainerObservation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// The compose service this container belongs to, if compose labelled it
    pub fn compose_service(&self) -> Option<&str> {
        self.labels
            .get(COMPOSE_SERVICE_LABEL)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Which containers a listing query should return
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerFilter {
    /// Substring of the container name
    pub name: Option<String>,
    /// Label key (or `key=value`) the container must carry
    pub label: Option<String>,
}

impl ContainerFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            label: None,
        }
    }

    pub fn by_label(label: impl Into<String>) -> Self {
        Self {
            name: None,
            label: Some(label.into()),
        }
    }

    /// Client-side evaluation of the filter, matching docker's semantics
    pub fn matches(&self, container: &ContainerObservation) -> bool {
        let name_ok = self
            .name
            .as_deref()
            .is_none_or(|needle| container.name.contains(needle));

        let label_ok = self.label.as_deref().is_none_or(|label| {
            match label.split_once('=') {
                Some((key, value)) => container.labels.get(key).is_some_and(|v| v == value),
                None => container.labels.contains_key(label),
            }
        });

        name_ok && label_ok
    }
}

impl fmt::Display for ContainerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.label) {
            (Some(name), Some(label)) => write!(f, "name={} label={}", name, label),
            (Some(name), None) => write!(f, "name={}", name),
            (None, Some(label)) => write!(f, "label={}", label),
            (None, None) => write!(f, "all containers"),
        }
    }
}

/// Trait for querying the container runtime
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// List currently running containers matching the filter
    async fn list_running(&self, filter: &ContainerFilter) -> Result<Vec<ContainerObservation>>;

    /// Names of all docker networks
    async fn list_networks(&self) -> Result<Vec<String>>;

    /// Create a docker network
    async fn create_network(&self, name: &str) -> Result<()>;
}

/// Scripted runtime for tests.
///
/// Each call to `list_running` consumes the next queued snapshot; the last
/// snapshot keeps being returned once the queue is drained. The filter is
/// applied client side so one script can serve several waits.
#[derive(Clone, Default)]
pub struct MockContainerRuntime {
    snapshots: Arc<Mutex<VecDeque<Vec<ContainerObservation>>>>,
    last: Arc<Mutex<Vec<ContainerObservation>>>,
    networks: Arc<Mutex<Vec<String>>>,
    queries: Arc<Mutex<Vec<ContainerFilter>>>,
}

impl MockContainerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the containers the next listing query should see
    pub fn push_snapshot<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let snapshot = names.into_iter().map(ContainerObservation::new).collect();
        self.push_observations(snapshot);
    }

    pub fn push_observations(&self, snapshot: Vec<ContainerObservation>) {
        self.snapshots.lock().unwrap().push_back(snapshot);
    }

    pub fn with_network(self, name: &str) -> Self {
        self.networks.lock().unwrap().push(name.to_string());
        self
    }

    pub fn networks(&self) -> Vec<String> {
        self.networks.lock().unwrap().clone()
    }

    /// Every filter passed to `list_running`, in call order
    pub fn queries(&self) -> Vec<ContainerFilter> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerRuntime for MockContainerRuntime {
    async fn list_running(&self, filter: &ContainerFilter) -> Result<Vec<ContainerObservation>> {
        self.queries.lock().unwrap().push(filter.clone());

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.snapshots.lock().unwrap().pop_front() {
            *last = next;
        }

        Ok(last.iter().filter(|c| filter.matches(c)).cloned().collect())
    }

    async fn list_networks(&self) -> Result<Vec<String>> {
        Ok(self.networks())
    }

    async fn create_network(&self, name: &str) -> Result<()> {
        self.networks.lock().unwrap().push(name.to_string());
        Ok(())
    }
}
