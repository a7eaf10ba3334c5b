//! All-or-nothing decoding of execution payloads into [`Itinerary`] values

use foodie_utils::TourError;
use serde_json::Value;

use crate::itinerary::Itinerary;

/// Decodes the terminal payload of a generation job.
///
/// Parsing is a pure function of the payload: the same input always yields
/// an equal itinerary or the same error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultParser;

impl ResultParser {
    /// Parse `payload` into an [`Itinerary`].
    ///
    /// # Errors
    ///
    /// - `TourError::Schema` when the payload is not valid JSON
    /// - `TourError::Shape` when it is JSON but not an itinerary object
    ///   (missing field, wrong type, `iconic_dishes` not of length 3)
    pub fn parse(payload: &str) -> Result<Itinerary, TourError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| TourError::Schema(e.to_string()))?;

        if !value.is_object() {
            return Err(TourError::Shape(format!(
                "expected a JSON object, found {}",
                json_kind(&value)
            )));
        }

        serde_json::from_value(value).map_err(|e| TourError::Shape(e.to_string()))
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
