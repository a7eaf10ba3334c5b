//! Logging and observability infrastructure for foodie-tours
//!
//! Structured logging through `tracing`; output goes to stderr so stdout can
//! carry the JSON exchange document.

use tracing::{Level, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Default filter directives when `RUST_LOG` is not set.
///
/// Target matching is by prefix, so `foodie` covers every workspace crate.
#[must_use]
pub const fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "foodie=debug,info"
    } else {
        "foodie=info,warn"
    }
}

/// Initialize the tracing subscriber.
///
/// Compact format by default; verbose mode adds targets and span close events
/// so per-city pipeline durations are visible.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span wrapping one city's weather → submit → poll → parse pipeline.
pub fn city_span(city: &str, index: usize) -> tracing::Span {
    span!(Level::INFO, "city_pipeline", city = %city, index = index)
}
