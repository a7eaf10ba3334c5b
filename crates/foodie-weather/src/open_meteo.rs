//! Open-Meteo geocoding and forecast adapter

use async_trait::async_trait;
use foodie_config::Config;
use foodie_utils::TourError;
use foodie_utils::http_client::{HttpClient, decode_json};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::api::{Coordinates, CurrentConditions, WeatherApi};

const GEOCODING_SERVICE: &str = "open-meteo geocoding";
const FORECAST_SERVICE: &str = "open-meteo forecast";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    #[serde(alias = "weather_code")]
    weathercode: i64,
}

/// HTTP client for the Open-Meteo public APIs (no API key)
#[derive(Clone)]
pub struct OpenMeteoApi {
    client: HttpClient,
    geocoding_url: Url,
    forecast_url: Url,
}

fn parse_url(key: &str, raw: &str) -> Result<Url, TourError> {
    Url::parse(raw).map_err(|e| TourError::Misconfiguration(format!("{key} '{raw}': {e}")))
}

impl OpenMeteoApi {
    pub fn new(client: HttpClient, geocoding_url: Url, forecast_url: Url) -> Self {
        Self {
            client,
            geocoding_url,
            forecast_url,
        }
    }

    /// Build from the `[weather]` configuration section
    ///
    /// # Errors
    ///
    /// Returns `TourError::Misconfiguration` for malformed URLs or if the HTTP
    /// client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, TourError> {
        let client = HttpClient::new(config.weather_request_timeout())?;
        Ok(Self::new(
            client,
            parse_url("weather.geocoding_url", config.geocoding_url())?,
            parse_url("weather.forecast_url", config.forecast_url())?,
        ))
    }
}

#[async_trait]
impl WeatherApi for OpenMeteoApi {
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, TourError> {
        let mut url = self.geocoding_url.clone();
        url.query_pairs_mut()
            .append_pair("name", city.trim())
            .append_pair("count", "1")
            .append_pair("language", "en")
            .append_pair("format", "json");

        let response = self
            .client
            .execute_with_retry(self.client.get(url), GEOCODING_SERVICE)
            .await?;
        let body: GeocodeResponse = decode_json(response, GEOCODING_SERVICE).await?;

        let first = body.results.and_then(|results| results.into_iter().next());
        debug!(city = %city, found = first.is_some(), "Geocoding complete");

        Ok(first.map(|r| Coordinates {
            latitude: r.latitude,
            longitude: r.longitude,
        }))
    }

    async fn current_conditions(
        &self,
        coords: Coordinates,
    ) -> Result<CurrentConditions, TourError> {
        let mut url = self.forecast_url.clone();
        url.query_pairs_mut()
            .append_pair("latitude", &coords.latitude.to_string())
            .append_pair("longitude", &coords.longitude.to_string())
            .append_pair("current", "temperature_2m,weathercode")
            .append_pair("timezone", "auto");

        let response = self
            .client
            .execute_with_retry(self.client.get(url), FORECAST_SERVICE)
            .await?;
        let body: ForecastResponse = decode_json(response, FORECAST_SERVICE).await?;

        Ok(CurrentConditions {
            temperature_c: body.current.temperature_2m,
            weather_code: body.current.weathercode,
        })
    }
}
