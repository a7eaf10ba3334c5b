//! CLI command implementations
//!
//! Each `execute_*` function handles one subcommand and does its own user
//! facing output. Failures are reported here and surfaced as an [`ExitCode`].

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::render::render_report;
use crate::{
    CityOutcome, Config, ExitCode, OutcomeSummary, TourOrchestrator, UserFriendlyError,
    to_exchange_json,
};

// ============================================================================
// Generate Command
// ============================================================================

/// Execute the generate command
pub(crate) async fn execute_generate_command(
    config: &Config,
    requested: &[String],
    output: Option<&Path>,
    json: bool,
) -> Result<(), ExitCode> {
    let cities = normalize_cities(requested, &config.default_cities());
    if cities.is_empty() {
        eprintln!("✗ No cities to process");
        eprintln!("  Pass city names or set [defaults] cities in the config file");
        return Err(ExitCode::CLI_ARGS);
    }

    let orchestrator = match TourOrchestrator::from_config(config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            print_error_report(&e);
            return Err(ExitCode::from(&e));
        }
    };

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling unfinished cities");
            signal_token.cancel();
        }
    });

    let outcomes = orchestrator.run_with_cancel(&cities, &cancel).await;
    finish_generate(&outcomes, output, json)
}

/// Print and export `outcomes`, then map them to an exit code
pub(crate) fn finish_generate(
    outcomes: &[CityOutcome],
    output: Option<&Path>,
    json: bool,
) -> Result<(), ExitCode> {
    let document = to_exchange_json(outcomes).map_err(|e| {
        eprintln!("✗ Failed to serialize tours: {e}");
        ExitCode::INTERNAL
    })?;

    if json {
        println!("{document}");
    } else {
        print!("{}", render_report(outcomes));
    }

    if let Some(path) = output {
        if let Err(e) = write_export(path, &document) {
            eprintln!("✗ {e:#}");
            return Err(ExitCode::EXPORT_FAILED);
        }
        info!(path = %path.display(), "Exchange document written");
        if !json {
            println!("Saved {}", path.display());
        }
    }

    let summary = OutcomeSummary::from_outcomes(outcomes);
    if summary.succeeded == 0 {
        return Err(ExitCode::NO_TOURS);
    }
    Ok(())
}

/// Trim names, drop empties and keep the first occurrence of each city
/// (case-insensitive). Falls back to `defaults` when nothing was requested.
pub(crate) fn normalize_cities(requested: &[String], defaults: &[String]) -> Vec<String> {
    let source = if requested.iter().any(|c| !c.trim().is_empty()) {
        requested
    } else {
        defaults
    };

    let mut seen = std::collections::HashSet::new();
    source
        .iter()
        .map(|city| city.trim())
        .filter(|city| !city.is_empty())
        .filter(|city| seen.insert(city.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Write the exchange document atomically (temp file + rename in the same directory)
fn write_export(path: &Path, document: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    file.write_all(document.as_bytes())
        .and_then(|()| file.write_all(b"\n"))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// ============================================================================
// Config Command
// ============================================================================

/// Execute the config command
pub(crate) fn execute_config_command(config: &Config) {
    println!("Effective configuration:");
    for (key, value) in config.effective_values() {
        println!("  {key} = {value}  [{}]", config.source_of(key));
    }

    match config.api_key() {
        Ok(_) => println!("  API key: set (via {})", config.api_key_env()),
        Err(_) => println!("  API key: not set (export {})", config.api_key_env()),
    }
}

// ============================================================================
// Error reporting
// ============================================================================

pub(crate) fn print_error_report(err: &dyn UserFriendlyError) {
    eprintln!("✗ [{}] {}", err.category(), err.user_message());
    if let Some(context) = err.context() {
        eprintln!("  {context}");
    }
    let suggestions = err.suggestions();
    if !suggestions.is_empty() {
        eprintln!("  Suggestions:");
        for suggestion in suggestions {
            eprintln!("    - {suggestion}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_normalize_trims_and_dedupes() {
        let cities = normalize_cities(
            &strings(&[" Paris ", "", "Tokyo", "paris", "  "]),
            &strings(&["Lima"]),
        );
        assert_eq!(cities, strings(&["Paris", "Tokyo"]));
    }

    #[test]
    fn test_normalize_falls_back_to_defaults() {
        assert_eq!(
            normalize_cities(&[], &strings(&["Paris"])),
            strings(&["Paris"])
        );
        assert_eq!(
            normalize_cities(&strings(&["   "]), &strings(&["Rome"])),
            strings(&["Rome"])
        );
    }

    #[test]
    fn test_all_failures_exit_no_tours() {
        let outcomes = vec![CityOutcome::failure("Atlantis", "city not found")];
        assert_eq!(
            finish_generate(&outcomes, None, false),
            Err(ExitCode::NO_TOURS)
        );
    }

    #[test]
    fn test_export_written_even_when_every_city_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tours.json");
        let outcomes = vec![CityOutcome::failure("Atlantis", "city not found")];

        let _ = finish_generate(&outcomes, Some(&path), true);

        let written = std::fs::read_to_string(&path).unwrap();
        let decoded = crate::from_exchange_json(&written).unwrap();
        assert_eq!(decoded, outcomes);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("tours.json");
        let outcomes = vec![CityOutcome::failure("Atlantis", "city not found")];

        assert_eq!(
            finish_generate(&outcomes, Some(&path), true),
            Err(ExitCode::EXPORT_FAILED)
        );
    }
}
