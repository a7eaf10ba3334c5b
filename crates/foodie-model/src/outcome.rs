//! Per-city outcomes and the `foodie_tours` exchange document

use serde::{Deserialize, Serialize};

use crate::itinerary::Itinerary;

/// Result of one city's pipeline. Exactly one per requested city.
///
/// Serialized untagged: a success is the bare itinerary object, a failure is
/// `{"city": ..., "error": ...}` (`reason` is accepted on input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CityOutcome {
    Success(Itinerary),
    Failure {
        city: String,
        #[serde(rename = "error", alias = "reason")]
        reason: String,
    },
}

impl CityOutcome {
    #[must_use]
    pub fn failure(city: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failure {
            city: city.into(),
            reason: reason.into(),
        }
    }

    /// City this outcome belongs to.
    ///
    /// For a success this is the city named inside the itinerary.
    #[must_use]
    pub fn city(&self) -> &str {
        match self {
            Self::Success(itinerary) => &itinerary.city,
            Self::Failure { city, .. } => city,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Success/failure counts for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutcomeSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl OutcomeSummary {
    #[must_use]
    pub fn from_outcomes(outcomes: &[CityOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }
}

#[derive(Serialize)]
struct ExchangeRef<'a> {
    foodie_tours: &'a [CityOutcome],
}

#[derive(Deserialize)]
struct ExchangeOwned {
    foodie_tours: Vec<CityOutcome>,
}

/// Serialize outcomes as the pretty-printed `{"foodie_tours": [...]}` document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_exchange_json(outcomes: &[CityOutcome]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExchangeRef {
        foodie_tours: outcomes,
    })
}

/// Decode a `{"foodie_tours": [...]}` document.
///
/// # Errors
///
/// Returns an error if the document is not valid JSON or an entry is neither
/// an itinerary nor a failure record.
pub fn from_exchange_json(document: &str) -> serde_json::Result<Vec<CityOutcome>> {
    let exchange: ExchangeOwned = serde_json::from_str(document)?;
    Ok(exchange.foodie_tours)
}
