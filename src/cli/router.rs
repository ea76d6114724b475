//! Command routing and execution

use anyhow::Result;

use crate::app::AppConfig;
use crate::cli::args::{Commands, VariablesCommands};
use crate::cli::commands::*;

/// Execute a CLI command, returning the process exit code on success
pub async fn execute_command(command: Commands, app: &AppConfig) -> Result<i32> {
    match command {
        Commands::Up { service, env } => run_up(app, service, &env).await.map(|_| 0),
        Commands::Start { env } => run_start(app, &env).await.map(|_| 0),
        Commands::Reset { env } => run_reset(app, &env).await.map(|_| 0),
        Commands::Run { command, args } => run_passthrough(app, command, args).await,
        Commands::Test {
            dag_dir,
            airflowdocker_tag,
            extra_test_dir,
        } => run_dag_tests(dag_dir, airflowdocker_tag, extra_test_dir)
            .await
            .map(|_| 0),
        Commands::Variables {
            command: VariablesCommands::Load { file },
        } => run_variables_load(app, &file).await.map(|_| 0),
    }
}
