//! Multi-city itinerary orchestration
//!
//! [`TourOrchestrator`] runs weather → request → execution → parse for every
//! requested city with bounded concurrency and returns exactly one
//! [`foodie_model::CityOutcome`] per city, in input order.

mod orchestrator;

pub use orchestrator::{OrchestratorSettings, TourOrchestrator};
