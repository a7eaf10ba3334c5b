//! Plain-text rendering of city outcomes

use std::fmt::Write;

use crate::{CityOutcome, Itinerary, OutcomeSummary};

/// Render one outcome as a text block ending in a newline
#[must_use]
pub fn render_outcome(outcome: &CityOutcome) -> String {
    match outcome {
        CityOutcome::Success(itinerary) => render_itinerary(itinerary),
        CityOutcome::Failure { city, reason } => {
            format!("== {city} ==\n✗ Could not generate a tour: {reason}\n")
        }
    }
}

fn render_itinerary(itinerary: &Itinerary) -> String {
    let mut out = String::new();
    let weather = &itinerary.weather;

    // Writing to a String cannot fail
    let _ = writeln!(out, "== {} ==", itinerary.city);
    let _ = writeln!(
        out,
        "Weather: {}°C, {} ({} dining)",
        weather.temperature, weather.condition, weather.dining
    );
    let _ = writeln!(out, "Iconic dishes: {}", itinerary.iconic_dishes.join(", "));

    for (label, meal) in itinerary.tour.meals() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{label}: {} ({})", meal.restaurant, meal.address);
        let _ = writeln!(out, "  Dish: {}", meal.dish);
        let _ = writeln!(out, "  {}", meal.description);
        let _ = writeln!(out, "  Weather consideration: {}", meal.weather_consideration);
    }

    out
}

/// Render every outcome followed by a one-line summary
#[must_use]
pub fn render_report(outcomes: &[CityOutcome]) -> String {
    let mut out = outcomes
        .iter()
        .map(render_outcome)
        .collect::<Vec<_>>()
        .join("\n");

    let summary = OutcomeSummary::from_outcomes(outcomes);
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "{} of {} tour(s) generated",
        summary.succeeded, summary.total
    );
    out
}
