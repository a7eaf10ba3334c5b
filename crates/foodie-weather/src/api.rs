use async_trait::async_trait;
use foodie_utils::TourError;

/// Geographic coordinates of a city's first geocoding match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions at a location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    /// WMO weather interpretation code
    pub weather_code: i64,
}

/// Geocoding and forecast operations the resolver depends on
///
/// Implementations must be safe to call concurrently from several city tasks.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Look up the first match for `city`; `Ok(None)` when nothing matches.
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, TourError>;

    /// Fetch current temperature and weather code at `coords`.
    async fn current_conditions(&self, coords: Coordinates)
    -> Result<CurrentConditions, TourError>;
}
