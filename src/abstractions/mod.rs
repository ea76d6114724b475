//! Abstraction layers for external dependencies
//!
//! This module provides trait-based abstractions for the docker daemon and
//! the docker-compose CLI to enable better testing and dependency injection.

pub mod lifecycle;
pub mod runtime;

pub use lifecycle::{ComposeLifecycle, LifecycleCall, OneOffCommand, RecordingLifecycle};
pub use runtime::{
    ContainerFilter, ContainerObservation, ContainerRuntime, MockContainerRuntime,
    COMPOSE_SERVICE_LABEL,
};
