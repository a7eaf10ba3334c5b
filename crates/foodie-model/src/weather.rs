//! Current-weather snapshot and dining classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outdoor dining requires a temperature strictly above this value (°C)
pub const OUTDOOR_MIN_TEMPERATURE_C: f64 = 15.0;

/// Sky condition derived from a WMO weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Other,
    /// No observation was made
    Unknown,
}

impl WeatherCondition {
    /// Classify a numeric weather code: `0` clear, `1..=3` cloudy, anything else other.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::Cloudy,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the itinerary should place its meals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiningType {
    Indoor,
    Outdoor,
}

impl DiningType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indoor => "indoor",
            Self::Outdoor => "outdoor",
        }
    }
}

impl fmt::Display for DiningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather observed for one city in one run.
///
/// Constructed only through [`CityWeather::observed`] or [`CityWeather::failed`],
/// so `is_outdoor_suitable` can never disagree with `condition` and
/// `temperature`. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityWeather {
    temperature: Option<f64>,
    condition: WeatherCondition,
    is_outdoor_suitable: bool,
    error: Option<String>,
}

impl CityWeather {
    /// A successful observation
    #[must_use]
    pub fn observed(temperature: f64, weather_code: i64) -> Self {
        let condition = WeatherCondition::from_code(weather_code);
        let is_outdoor_suitable =
            condition == WeatherCondition::Clear && temperature > OUTDOOR_MIN_TEMPERATURE_C;
        Self {
            temperature: Some(temperature),
            condition,
            is_outdoor_suitable,
            error: None,
        }
    }

    /// A failed lookup; the city cannot proceed to generation
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            temperature: None,
            condition: WeatherCondition::Unknown,
            is_outdoor_suitable: false,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub const fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    #[must_use]
    pub const fn condition(&self) -> WeatherCondition {
        self.condition
    }

    #[must_use]
    pub const fn is_outdoor_suitable(&self) -> bool {
        self.is_outdoor_suitable
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether generation may proceed: no error and a temperature was observed
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.error.is_none() && self.temperature.is_some()
    }

    #[must_use]
    pub const fn dining_type(&self) -> DiningType {
        if self.is_outdoor_suitable {
            DiningType::Outdoor
        } else {
            DiningType::Indoor
        }
    }
}
