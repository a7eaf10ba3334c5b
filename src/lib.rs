//! foodie-tours - weather-aware one-day restaurant itineraries
//!
//! For each requested city the pipeline resolves current weather, classifies
//! it as indoor or outdoor dining, submits a generation job to a remote
//! execution service, polls it to completion with bounded retries, and parses
//! the structured itinerary it returns. Cities run concurrently under a
//! configurable bound; the result is one outcome per city in input order.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! export JULEP_API_KEY=...
//! foodie-tours --agent-id <agent> generate Paris Tokyo
//! foodie-tours generate Paris --json > tours.json
//! foodie-tours config
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use foodie_tours::{CliArgs, Config, TourOrchestrator, to_exchange_json};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::discover(&CliArgs::default())?;
//! let orchestrator = TourOrchestrator::from_config(&config)?;
//! let outcomes = orchestrator
//!     .run(&["Paris".to_string(), "Atlantis".to_string()])
//!     .await;
//! println!("{}", to_exchange_json(&outcomes)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Crate layout
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `foodie-utils` | errors, exit codes, logging, shared HTTP client |
//! | `foodie-config` | configuration discovery and validation |
//! | `foodie-model` | weather, request, itinerary and outcome types |
//! | `foodie-weather` | weather resolution (Open-Meteo) |
//! | `foodie-exec` | execution service contract, poller, Julep adapter |
//! | `foodie-orchestrator` | multi-city orchestration |

pub mod cli;
pub mod render;

pub use foodie_config::{CliArgs, Config, ConfigSource};
pub use foodie_exec::{
    ExecutionPoller, ExecutionService, JobHandle, JobResult, JobStatus, JulepClient, PollPolicy,
};
pub use foodie_model::{
    CityOutcome, CityWeather, DiningType, ExecutionInput, GenerationRequest, Itinerary,
    ItineraryWeather, Meal, OutcomeSummary, ResultParser, TaskDefinition, Tour,
    TourRequestBuilder, WeatherCondition, from_exchange_json, to_exchange_json,
};
pub use foodie_orchestrator::{OrchestratorSettings, TourOrchestrator};
pub use foodie_utils::logging::init_tracing;
pub use foodie_utils::{ConfigError, ErrorCategory, ExitCode, TourError, UserFriendlyError};
pub use foodie_weather::{
    Coordinates, CurrentConditions, OpenMeteoApi, WeatherApi, WeatherResolver,
};
