//! trmnl: send content to TRMNL e-ink displays
//!
//! Entry point for the trmnl command-line tool.

use std::process::ExitCode;

use clap::CommandFactory;
use trmnl::config::{Cli, ConfigStore, defaults};
use trmnl::webhook::ReqwestClient;

mod app;
mod run;

use app::{exit_code, print_hint, setup_tracing};
use run::{App, Console};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();
    setup_tracing(cli.debug);

    let Some(command) = cli.command else {
        return match Cli::command().print_help() {
            Ok(()) => exit_code::SUCCESS,
            Err(_) => exit_code::FAILURE,
        };
    };

    let store = match ConfigStore::user_default() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            return exit_code::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            return exit_code::FAILURE;
        }
    };

    let app = App::new(store, ReqwestClient::new())
        .with_env_webhook(std::env::var(defaults::WEBHOOK_ENV_VAR).ok());
    let mut console = Console::stdio();

    let result = runtime.block_on(app.execute(command, &mut console));
    // A stdin read abandoned after the wait can still be blocking a worker thread.
    runtime.shutdown_background();

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            if !e.is_reported() {
                eprintln!("Error: {e}");
                print_hint(&e);
            }
            exit_code::FAILURE
        }
    }
}
