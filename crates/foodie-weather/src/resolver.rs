use std::sync::Arc;
use std::time::Duration;

use foodie_model::CityWeather;
use foodie_utils::TourError;
use tracing::{debug, warn};

use crate::api::WeatherApi;
use crate::cache::GeocodeCache;

/// Resolves a city name to a classified [`CityWeather`].
///
/// Never fails: lookup misses and transport errors come back as a
/// `CityWeather` with `error` set and no temperature.
pub struct WeatherResolver {
    api: Arc<dyn WeatherApi>,
    cache: GeocodeCache,
}

impl WeatherResolver {
    pub fn new(api: Arc<dyn WeatherApi>, cache_ttl: Duration) -> Self {
        Self {
            api,
            cache: GeocodeCache::new(cache_ttl),
        }
    }

    pub async fn resolve(&self, city: &str) -> CityWeather {
        match self.try_resolve(city).await {
            Ok(weather) => weather,
            Err(e) => {
                warn!(city = %city, error = %e, "Weather lookup failed");
                CityWeather::failed(e.to_string())
            }
        }
    }

    async fn try_resolve(&self, city: &str) -> Result<CityWeather, TourError> {
        let coords = match self.cache.get(city) {
            Some(coords) => {
                debug!(city = %city, "Geocode cache hit");
                coords
            }
            None => {
                let coords = self
                    .api
                    .geocode(city)
                    .await?
                    .ok_or(TourError::CityNotFound)?;
                self.cache.insert(city, coords);
                coords
            }
        };

        let current = self.api.current_conditions(coords).await?;
        let weather = CityWeather::observed(current.temperature_c, current.weather_code);

        debug!(
            city = %city,
            temperature = current.temperature_c,
            condition = %weather.condition(),
            dining = %weather.dining_type(),
            "Weather resolved"
        );

        Ok(weather)
    }
}
