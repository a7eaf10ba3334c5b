//! Weather resolution for the itinerary pipeline
//!
//! [`WeatherResolver`] turns a city name into a [`foodie_model::CityWeather`]
//! through any [`WeatherApi`]; [`OpenMeteoApi`] is the HTTP implementation.

mod api;
mod cache;
mod open_meteo;
mod resolver;

pub use api::{Coordinates, CurrentConditions, WeatherApi};
pub use cache::GeocodeCache;
pub use open_meteo::OpenMeteoApi;
pub use resolver::WeatherResolver;
