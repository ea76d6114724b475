//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Run all the airflow management commands.
#[derive(Parser, Debug)]
#[command(name = "airflow-compose")]
#[command(about = "Run all the airflow management commands.", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Give up waiting for containers after this many seconds (default: wait forever)
    #[arg(long, value_name = "SECONDS", global = true)]
    pub poll_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Bring services up without bootstrapping the database
    Up {
        /// Service to start (all services when omitted)
        service: Option<String>,

        /// DAG environment mounted into the containers
        #[arg(long, default_value = "prod")]
        env: String,
    },

    /// Bootstrap the metadata database and start every service
    Start {
        #[arg(long, default_value = "prod")]
        env: String,
    },

    /// Tear everything down, including volumes, then start again
    Reset {
        #[arg(long, default_value = "prod")]
        env: String,
    },

    /// Run a docker-compose command against the generated compose file
    Run {
        /// docker-compose subcommand, e.g. `logs`
        command: String,

        /// Arguments passed through untouched
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the DAG test container against a DAG directory
    Test {
        #[arg(long, default_value = ".")]
        dag_dir: PathBuf,

        #[arg(long, default_value = "latest")]
        airflowdocker_tag: String,

        /// Mounted as extra tests when it exists
        #[arg(long, default_value = "tests")]
        extra_test_dir: PathBuf,
    },

    /// Manage airflow variables
    Variables {
        #[command(subcommand)]
        command: VariablesCommands,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum VariablesCommands {
    /// Import a variables JSON file into the running environment
    Load {
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_defaults() {
        let cli = Cli::try_parse_from(["airflow-compose", "up"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Up {
                service: None,
                env: "prod".to_string()
            }
        );
        assert_eq!(cli.poll_timeout, None);
    }

    #[test]
    fn test_run_passes_flags_through() {
        let cli = Cli::try_parse_from(["airflow-compose", "run", "logs", "-f", "airflow-web"])
            .unwrap();
        assert_eq!(
            cli.command,
            Commands::Run {
                command: "logs".to_string(),
                args: vec!["-f".to_string(), "airflow-web".to_string()],
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "airflow-compose",
            "start",
            "--env",
            "dev",
            "-vv",
            "--poll-timeout",
            "120",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.poll_timeout, Some(120));
        assert_eq!(
            cli.command,
            Commands::Start {
                env: "dev".to_string()
            }
        );
    }

    #[test]
    fn test_variables_load_requires_file() {
        assert!(Cli::try_parse_from(["airflow-compose", "variables", "load"]).is_err());
        let cli =
            Cli::try_parse_from(["airflow-compose", "variables", "load", "vars.json"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Variables {
                command: VariablesCommands::Load {
                    file: PathBuf::from("vars.json")
                }
            }
        );
    }

    #[test]
    fn test_test_defaults() {
        let cli = Cli::try_parse_from(["airflow-compose", "test"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Test {
                dag_dir: PathBuf::from("."),
                airflowdocker_tag: "latest".to_string(),
                extra_test_dir: PathBuf::from("tests"),
            }
        );
    }
}
