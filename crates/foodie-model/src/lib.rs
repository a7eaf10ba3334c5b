//! Data model for the per-city itinerary pipeline
//!
//! Types flow through the pipeline in this order:
//! [`CityWeather`] → [`GenerationRequest`] → (remote execution) →
//! [`Itinerary`] → [`CityOutcome`].

pub mod itinerary;
pub mod outcome;
pub mod parser;
pub mod request;
pub mod weather;

pub use itinerary::{Itinerary, ItineraryWeather, Meal, Tour};
pub use outcome::{CityOutcome, OutcomeSummary, from_exchange_json, to_exchange_json};
pub use parser::ResultParser;
pub use request::{
    ExecutionInput, GenerationRequest, Message, Role, TaskDefinition, TaskStep, TourRequestBuilder,
};
pub use weather::{CityWeather, DiningType, OUTDOOR_MIN_TEMPERATURE_C, WeatherCondition};
