use airflow_compose::app::{handle_fatal_error, initialize_app, install_interrupt_handler, AppConfig};
use airflow_compose::cli::{execute_command, Cli};
use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let app = match AppConfig::new(cli.verbose) {
        Ok(app) => app.with_poll_timeout(cli.poll_timeout),
        Err(e) => handle_fatal_error(e, cli.verbose),
    };

    initialize_app(&app);
    install_interrupt_handler(app.cancel.clone());

    debug!("Running {:?} in {}", cli.command, app.working_dir.display());

    match execute_command(cli.command, &app).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => handle_fatal_error(e, app.verbose),
    }
}
