//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Initializes tracing
//! - Creates the tokio runtime
//! - Dispatches to command handlers

use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;
use crate::{Config, ConfigError, ExitCode, init_tracing};

/// Main CLI execution function.
///
/// Handles ALL output including errors and returns `Err(ExitCode)` on
/// failure; main.rs only maps that to the process exit status.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();
    let cli_args = cli.config_overrides();

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let code = match err.downcast_ref::<ConfigError>() {
                Some(config_err) => {
                    commands::print_error_report(config_err);
                    ExitCode::from(config_err)
                }
                None => {
                    eprintln!("✗ {err:#}");
                    ExitCode::CLI_ARGS
                }
            };
            return Err(code);
        }
    };

    if let Err(e) = init_tracing(config.verbose()) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    match cli.command {
        Commands::Config => {
            commands::execute_config_command(&config);
            Ok(())
        }
        Commands::Generate {
            cities,
            output,
            json,
        } => {
            let rt = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("✗ Failed to create async runtime: {e}");
                    return Err(ExitCode::INTERNAL);
                }
            };

            rt.block_on(commands::execute_generate_command(
                &config,
                &cities,
                output.as_deref(),
                json,
            ))
        }
    }
}
