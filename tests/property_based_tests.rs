//! Property-Based Tests for foodie-tours
//!
//! Invariants checked across generated inputs:
//! - Weather-code classification and the outdoor-suitability threshold
//! - Dining type follows outdoor suitability
//! - Parser idempotence on valid payloads
//! - Exchange-format round-trip preserves the success/failure partition
//!
//! ## Configuration
//!
//! - `PROPTEST_CASES`: Number of test cases per property (default: 64)
//! - `PROPTEST_MAX_SHRINK_ITERS`: Max shrinking iterations on failure (default: 1000)
//!
//! ```bash
//! PROPTEST_CASES=256 cargo test --test property_based_tests
//! ```

use foodie_tours::{
    CityOutcome, CityWeather, DiningType, Itinerary, ItineraryWeather, Meal, ResultParser, Tour,
    TourRequestBuilder, WeatherCondition, from_exchange_json, to_exchange_json,
};
use proptest::prelude::*;
use std::env;

/// Default number of test cases per property.
const DEFAULT_PROPTEST_CASES: u32 = 64;

/// Default max shrink iterations.
const DEFAULT_MAX_SHRINK_ITERS: u32 = 1000;

/// Creates a ProptestConfig that respects environment variables.
fn proptest_config(max_cases: Option<u32>) -> ProptestConfig {
    let env_cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_PROPTEST_CASES);

    let env_shrink_iters = env::var("PROPTEST_MAX_SHRINK_ITERS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_MAX_SHRINK_ITERS);

    let cases = match max_cases {
        Some(max) => env_cases.min(max),
        None => env_cases,
    };

    ProptestConfig {
        cases,
        max_shrink_iters: env_shrink_iters,
        max_shrink_time: 30000,
        ..ProptestConfig::default()
    }
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.'éü-]{1,40}"
}

fn arb_meal() -> impl Strategy<Value = Meal> {
    (arb_text(), arb_text(), arb_text(), arb_text(), arb_text()).prop_map(
        |(restaurant, address, dish, description, weather_consideration)| Meal {
            restaurant,
            address,
            dish,
            description,
            weather_consideration,
        },
    )
}

fn arb_itinerary() -> impl Strategy<Value = Itinerary> {
    (
        arb_text(),
        // Tenths of a degree keep the JSON round-trip exact
        (-400i32..500).prop_map(|tenths| f64::from(tenths) / 10.0),
        prop_oneof![Just("clear"), Just("cloudy"), Just("other")],
        prop_oneof![Just("indoor"), Just("outdoor")],
        prop::array::uniform3(arb_text()),
        (arb_meal(), arb_meal(), arb_meal()),
    )
        .prop_map(
            |(city, temperature, condition, dining, iconic_dishes, (breakfast, lunch, dinner))| {
                Itinerary {
                    city,
                    weather: ItineraryWeather {
                        temperature,
                        condition: condition.to_string(),
                        dining: dining.to_string(),
                    },
                    iconic_dishes,
                    tour: Tour {
                        breakfast,
                        lunch,
                        dinner,
                    },
                }
            },
        )
}

fn arb_outcome() -> impl Strategy<Value = CityOutcome> {
    prop_oneof![
        arb_itinerary().prop_map(CityOutcome::Success),
        (arb_text(), arb_text()).prop_map(|(city, reason)| CityOutcome::failure(city, reason)),
    ]
}

/// Property: codes 1..=3 are cloudy, 0 is clear, everything else is other
#[test]
fn prop_weather_code_classification() {
    let config = proptest_config(None);

    proptest!(config, |(code in any::<i64>())| {
        let expected = match code {
            0 => WeatherCondition::Clear,
            1..=3 => WeatherCondition::Cloudy,
            _ => WeatherCondition::Other,
        };
        prop_assert_eq!(WeatherCondition::from_code(code), expected);
    });
}

/// Property: outdoor suitability iff clear and strictly above 15°C
#[test]
fn prop_outdoor_suitability_invariant() {
    let config = proptest_config(None);

    proptest!(config, |(temperature in -50.0f64..50.0, code in -5i64..100)| {
        let weather = CityWeather::observed(temperature, code);
        let expected = code == 0 && temperature > 15.0;

        prop_assert_eq!(weather.is_outdoor_suitable(), expected);
        prop_assert_eq!(
            weather.dining_type() == DiningType::Outdoor,
            expected
        );

        let request = TourRequestBuilder::new().build("Anywhere", weather);
        prop_assert_eq!(request.dining_type == DiningType::Outdoor, expected);
    });
}

/// Boundary values called out explicitly
#[test]
fn test_classification_boundaries() {
    assert_eq!(WeatherCondition::from_code(0), WeatherCondition::Clear);
    assert_eq!(WeatherCondition::from_code(3), WeatherCondition::Cloudy);
    assert_eq!(WeatherCondition::from_code(4), WeatherCondition::Other);
    assert!(!CityWeather::observed(15.0, 0).is_outdoor_suitable());
}

/// Property: parsing the same valid payload twice gives equal itineraries
#[test]
fn prop_parser_idempotent() {
    let config = proptest_config(None);

    proptest!(config, |(itinerary in arb_itinerary())| {
        let payload = serde_json::to_string(&itinerary).unwrap();
        let first = ResultParser::parse(&payload).unwrap();
        let second = ResultParser::parse(&payload).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.iconic_dishes.len(), 3);
    });
}

/// Property: export then import reproduces every outcome in order
#[test]
fn prop_exchange_round_trip() {
    let config = proptest_config(Some(32));

    proptest!(config, |(outcomes in prop::collection::vec(arb_outcome(), 0..6))| {
        let document = to_exchange_json(&outcomes).unwrap();
        let decoded = from_exchange_json(&document).unwrap();

        let partition: Vec<bool> = outcomes.iter().map(CityOutcome::is_success).collect();
        let decoded_partition: Vec<bool> = decoded.iter().map(CityOutcome::is_success).collect();
        prop_assert_eq!(partition, decoded_partition);
        prop_assert_eq!(decoded, outcomes);
    });
}

/// Property: arbitrary text never panics the parser
#[test]
fn prop_parser_total_on_arbitrary_input() {
    let config = proptest_config(None);

    proptest!(config, |(payload in ".{0,200}")| {
        let _ = ResultParser::parse(&payload);
    });
}
