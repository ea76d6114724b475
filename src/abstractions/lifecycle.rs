//! Container group lifecycle abstraction layer
//!
//! The write side of the environment: bringing compose services up and down
//! and launching one-off setup containers.

use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::{common, Result};

/// A container started for a single command and removed when it exits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOffCommand {
    pub service: String,
    pub command: String,
    pub args: Vec<String>,
    pub labels: Vec<String>,
    pub env: Vec<(String, String)>,
    pub volumes: Vec<String>,
}

impl OneOffCommand {
    pub fn new(service: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            command: command.into(),
            args: Vec::new(),
            labels: Vec::new(),
            env: Vec::new(),
            volumes: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn volume(mut self, volume: impl Into<String>) -> Self {
        self.volumes.push(volume.into());
        self
    }
}

impl fmt::Display for OneOffCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.service, self.command)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Trait for driving a compose project
#[async_trait]
pub trait ComposeLifecycle: Send + Sync {
    /// Start services detached; an empty list means every declared service
    async fn up(&self, services: &[String]) -> Result<()>;

    /// Launch a detached one-off container that removes itself on exit
    async fn run_one_off(&self, command: &OneOffCommand) -> Result<()>;

    /// Print the logs of the given services
    async fn logs(&self, services: &[String]) -> Result<()>;

    /// Stop everything and remove volumes, local images and orphans
    async fn down(&self) -> Result<()>;

    /// Remove stopped service containers
    async fn rm(&self) -> Result<()>;

    /// Hand the arguments to the compose CLI attached to this terminal
    async fn passthrough(&self, args: &[String]) -> Result<i32>;
}

/// One call made against a [`RecordingLifecycle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleCall {
    Up(Vec<String>),
    Run(OneOffCommand),
    Logs(Vec<String>),
    Down,
    Rm,
    Passthrough(Vec<String>),
}

/// Lifecycle mock that records calls and can be told to fail on the n-th one
#[derive(Clone, Default)]
pub struct RecordingLifecycle {
    calls: Arc<Mutex<Vec<LifecycleCall>>>,
    fail_on_call: Arc<Mutex<Option<usize>>>,
}

impl RecordingLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the call with this zero-based index return an error
    pub fn failing_on(self, index: usize) -> Self {
        *self.fail_on_call.lock().unwrap() = Some(index);
        self
    }

    pub fn calls(&self) -> Vec<LifecycleCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: LifecycleCall) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        let description = format!("{:?}", call);
        calls.push(call);

        if *self.fail_on_call.lock().unwrap() == Some(index) {
            return Err(common::command_failed(&description, 1, "scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ComposeLifecycle for RecordingLifecycle {
    async fn up(&self, services: &[String]) -> Result<()> {
        self.record(LifecycleCall::Up(services.to_vec()))
    }

    async fn run_one_off(&self, command: &OneOffCommand) -> Result<()> {
        self.record(LifecycleCall::Run(command.clone()))
    }

    async fn logs(&self, services: &[String]) -> Result<()> {
        self.record(LifecycleCall::Logs(services.to_vec()))
    }

    async fn down(&self) -> Result<()> {
        self.record(LifecycleCall::Down)
    }

    async fn rm(&self) -> Result<()> {
        self.record(LifecycleCall::Rm)
    }

    async fn passthrough(&self, args: &[String]) -> Result<i32> {
        self.record(LifecycleCall::Passthrough(args.to_vec()))?;
        Ok(0)
    }
}
