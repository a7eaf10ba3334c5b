//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and the subcommand enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::CliArgs;

/// foodie-tours - weather-aware one-day food tours
#[derive(Parser, Debug)]
#[command(name = "foodie-tours")]
#[command(about = "Generate weather-aware one-day restaurant itineraries for one or more cities")]
#[command(long_about = r#"
foodie-tours looks up the current weather for each requested city, asks a
remote generation service for a breakfast/lunch/dinner itinerary suited to
indoor or outdoor dining, and reports one result per city.

EXAMPLES:
  # Generate tours for two cities
  foodie-tours generate Paris Tokyo

  # Emit the exchange document on stdout
  foodie-tours generate Paris --json

  # Save the exchange document while printing the text report
  foodie-tours generate Paris Lima --output tours.json

  # Process cities one at a time
  foodie-tours --max-concurrency 1 generate Paris Rome Oslo

  # Show effective configuration and where each value came from
  foodie-tours config

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .foodie-tours/config.toml
  Use --config to specify an explicit config file path
  The execution API key is read from the variable named by [execution] api_key_env
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Maximum number of cities processed concurrently
    #[arg(long, global = true)]
    pub max_concurrency: Option<usize>,

    /// Agent that owns the generation task
    #[arg(long, global = true)]
    pub agent_id: Option<String>,

    /// Base URL of the execution service API
    #[arg(long, global = true)]
    pub execution_base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate itineraries for the given cities
    Generate {
        /// Cities to plan (defaults to [defaults] cities from config)
        cities: Vec<String>,

        /// Write the JSON exchange document to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the JSON exchange document instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// Show effective configuration with source attribution
    Config,
}

impl Cli {
    /// Configuration overrides carried by the global flags
    #[must_use]
    pub fn config_overrides(&self) -> CliArgs {
        CliArgs {
            config_path: self.config.clone(),
            // Only an explicit --verbose overrides the config file
            verbose: self.verbose.then_some(true),
            max_concurrency: self.max_concurrency,
            agent_id: self.agent_id.clone(),
            execution_base_url: self.execution_base_url.clone(),
        }
    }
}

/// Build the clap command (for completions and help rendering)
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
