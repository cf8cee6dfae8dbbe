//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use trmnl::config::ConfigError;
use trmnl::input::InputError;

use crate::run::RunError;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Any failure (exit code 1): invalid payload, failed send, unknown plugin, no content.
    pub const FAILURE: ExitCode = ExitCode::FAILURE;
}

/// Prints helpful hints for common user errors.
pub fn print_hint(error: &RunError) {
    match error {
        RunError::Input(InputError::Empty) => {
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  trmnl send --content '<div class=\"layout\">Hello</div>'");
            eprintln!("  trmnl send --file ./output.html");
            eprintln!("  echo '{{\"merge_variables\":{{\"content\":\"...\"}}}}' | trmnl send");
        }
        RunError::Config(ConfigError::PluginNotFound(_)) => {
            eprintln!("\nRun 'trmnl plugins' to list configured plugins.");
        }
        _ => {}
    }
}

/// Sets up the tracing subscriber for logging.
///
/// Logs go to stderr so that `--json` output on stdout stays parseable.
/// `RUST_LOG` overrides the default level.
pub fn setup_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
