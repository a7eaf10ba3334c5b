//! Itinerary schema returned by the generation task

use serde::{Deserialize, Serialize};

/// A one-day food tour for one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub city: String,
    pub weather: ItineraryWeather,
    /// Exactly three dishes; any other length fails deserialization
    pub iconic_dishes: [String; 3],
    pub tour: Tour,
}

/// Weather as reported back in the itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryWeather {
    pub temperature: f64,
    pub condition: String,
    pub dining: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    pub breakfast: Meal,
    pub lunch: Meal,
    pub dinner: Meal,
}

impl Tour {
    /// Meals in serving order with their labels
    #[must_use]
    pub fn meals(&self) -> [(&'static str, &Meal); 3] {
        [
            ("Breakfast", &self.breakfast),
            ("Lunch", &self.lunch),
            ("Dinner", &self.dinner),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub restaurant: String,
    pub address: String,
    pub dish: String,
    pub description: String,
    pub weather_consideration: String,
}
