//! The bootstrap sequence for a fresh Airflow environment

use std::path::Path;

use super::{LifecycleAction, ProvisioningStep};
use crate::abstractions::{ContainerFilter, OneOffCommand};
use crate::compose::{AIRFLOW_WEB, FLOWER_PORT, METADATA_DB, WEB_UI_PORT};
use crate::config::ComposeConfig;
use crate::readiness::Expectation;

pub const DBINIT_LABEL: &str = "dbinit";
pub const INITVARIABLES_LABEL: &str = "initvariables";
pub const CREATEADMIN_LABEL: &str = "createadmin";

const CONTAINER_VARIABLES_PATH: &str = "/tmp/variables.json";

/// One-off airflow command that runs without parsing the user's DAGs
fn setup_command(command: &str, label: &str) -> OneOffCommand {
    OneOffCommand::new(AIRFLOW_WEB, command)
        .label(label)
        .env("AIRFLOW__CORE__DAGS_FOLDER", "/tmp")
}

fn one_off_step(banner: &str, command: OneOffCommand, label: &str) -> ProvisioningStep {
    ProvisioningStep::new(banner, LifecycleAction::Run(command))
        .wait_until(Expectation::vanishes(ContainerFilter::by_label(label)))
}

/// Load a variables JSON file into the metadata database
pub fn load_variables_step(file: &Path) -> ProvisioningStep {
    let command = setup_command("variables", INITVARIABLES_LABEL)
        .volume(format!("{}:{}", file.display(), CONTAINER_VARIABLES_PATH))
        .args(["-i", CONTAINER_VARIABLES_PATH]);

    one_off_step(
        "Setting up variables in the airflow metadata database",
        command,
        INITVARIABLES_LABEL,
    )
}

/// Every step `start` runs, in order
pub fn startup_steps(config: &ComposeConfig) -> Vec<ProvisioningStep> {
    let create_admin = setup_command("create_user", CREATEADMIN_LABEL).args([
        "-r",
        "Admin",
        "-u",
        "admin",
        "-p",
        "admin",
        "-e",
        "admin@localhost.com",
        "-f",
        "admin",
        "-l",
        "admin",
    ]);

    vec![
        ProvisioningStep::new(
            "Bringing the metadata database up",
            LifecycleAction::Up(vec![METADATA_DB.to_string()]),
        )
        .wait_until(Expectation::exists(ContainerFilter::by_name(METADATA_DB))),
        one_off_step(
            "Initializing the metadata database",
            setup_command("initdb", DBINIT_LABEL),
            DBINIT_LABEL,
        ),
        load_variables_step(&config.variables_file_path()),
        one_off_step("Creating an admin user", create_admin, CREATEADMIN_LABEL),
        ProvisioningStep::new(
            "Bringing the airflow webserver online, it may do some setup",
            LifecycleAction::Up(vec![AIRFLOW_WEB.to_string()]),
        ),
        ProvisioningStep::new(
            "Webserver logs",
            LifecycleAction::Logs(vec![AIRFLOW_WEB.to_string()]),
        ),
        ProvisioningStep::new(
            "Bringing the scheduler, worker, and flower online",
            LifecycleAction::Up(Vec::new()),
        ),
    ]
}

/// Where to find the environment once `start` has finished
pub fn ui_summary(binary: &str) -> String {
    [
        "You can now browse to the airflow UI and view the airflow workers:".to_string(),
        String::new(),
        format!("     Airflow UI: http://localhost:{WEB_UI_PORT}"),
        "       Username: admin".to_string(),
        "       Password: admin".to_string(),
        String::new(),
        format!("      Flower UI: http://localhost:{FLOWER_PORT}"),
        String::new(),
        format!("  Tail the logs: {binary} run logs -f"),
    ]
    .join("\n")
}
