//! # airflow-compose
//!
//! Stand up a local Airflow environment (webserver, scheduler, worker,
//! flower, postgres and redis) with docker-compose, configured from a
//! project's `pyproject.toml`.
//!
//! ## Usage
//!
//! ```bash
//! airflow-compose start [--env prod]
//! airflow-compose run logs -f
//! ```
//!
//! ## Modules
//!
//! - `abstractions` - Traits over the docker daemon and docker-compose, with test doubles
//! - `app` - Logging, `.env` loading and fatal error reporting for the binary
//! - `cli` - Argument parsing and command handlers
//! - `compose` - Typed compose document built from the project configuration
//! - `config` - `[tool.airflow-docker-compose]` loading
//! - `display` - Console progress output
//! - `error` - Unified error type with codes
//! - `orchestrator` - The operations behind each CLI command
//! - `readiness` - Polling until containers reach a target state
//! - `sequencer` - Ordered provisioning steps and the bootstrap sequence
//! - `subprocess` - Process runner abstraction and the docker / docker-compose adapters
//! - `tester` - DAG test container runner
//! - `variables` - Airflow variables JSON file
pub mod abstractions;
pub mod app;
pub mod cli;
pub mod compose;
pub mod config;
pub mod display;
pub mod error;
pub mod orchestrator;
pub mod readiness;
pub mod sequencer;
pub mod subprocess;
pub mod tester;
pub mod variables;
