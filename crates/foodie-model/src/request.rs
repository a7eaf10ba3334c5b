//! Generation request construction
//!
//! [`TourRequestBuilder`] turns a city and its [`CityWeather`] into the task
//! definition and input payload submitted to the execution service. It is a
//! pure function of its inputs and cannot fail.

use serde::{Deserialize, Serialize};

use crate::weather::{CityWeather, DiningType, WeatherCondition};

/// Role of a message in a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions
    System,
    /// User input
    User,
}

impl Role {
    const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// A single prompt message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// One step of a task workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStep {
    pub prompt: Vec<Message>,
}

/// Task registered with the execution service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub name: String,
    pub description: String,
    pub main: Vec<TaskStep>,
}

impl TaskDefinition {
    /// BLAKE3 hex digest identifying this definition.
    ///
    /// Two definitions with the same fingerprint can share one registered task.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.name.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.description.as_bytes());
        for step in &self.main {
            hasher.update(&[1]);
            for message in &step.prompt {
                hasher.update(&[0]);
                hasher.update(message.role.as_str().as_bytes());
                hasher.update(&[0]);
                hasher.update(message.content.as_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Input payload for one execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionInput {
    pub city: String,
    pub temperature: Option<f64>,
    pub condition: WeatherCondition,
    pub dining_type: DiningType,
}

/// Everything needed to submit one city's generation job
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub city: String,
    pub dining_type: DiningType,
    pub weather: CityWeather,
    pub task: TaskDefinition,
    pub input: ExecutionInput,
}

const TASK_NAME: &str = "Foodie Tour Generator";
const TASK_DESCRIPTION: &str = "Generate a one-day foodie tour for a given city based on weather";
const SYSTEM_PROMPT: &str = "You are a culinary expert specializing in food tours.";

/// Builds [`GenerationRequest`]s
#[derive(Debug, Clone)]
pub struct TourRequestBuilder {
    task_name: String,
    task_description: String,
    system_prompt: String,
}

impl Default for TourRequestBuilder {
    fn default() -> Self {
        Self {
            task_name: TASK_NAME.to_string(),
            task_description: TASK_DESCRIPTION.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

impl TourRequestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the request for `city` under `weather`.
    ///
    /// Dining type is outdoor iff the weather is outdoor-suitable.
    #[must_use]
    pub fn build(&self, city: &str, weather: CityWeather) -> GenerationRequest {
        let dining_type = weather.dining_type();
        let user_prompt = user_prompt(city, &weather, dining_type);

        let task = TaskDefinition {
            name: self.task_name.clone(),
            description: self.task_description.clone(),
            main: vec![TaskStep {
                prompt: vec![
                    Message::system(self.system_prompt.clone()),
                    Message::user(user_prompt),
                ],
            }],
        };

        let input = ExecutionInput {
            city: city.to_string(),
            temperature: weather.temperature(),
            condition: weather.condition(),
            dining_type,
        };

        GenerationRequest {
            city: city.to_string(),
            dining_type,
            weather,
            task,
            input,
        }
    }
}

fn user_prompt(city: &str, weather: &CityWeather, dining: DiningType) -> String {
    let temperature = weather
        .temperature()
        .map_or_else(|| "unknown".to_string(), |t| t.to_string());
    let condition = weather.condition();

    format!(
        "Create a one-day foodie tour for {city}. Today's weather is {condition} with a \
temperature of {temperature}°C, suitable for {dining} dining. Follow these steps:
1. Identify three iconic dishes for {city} based on its culinary culture.
2. Find top-rated restaurants in {city} that serve these dishes, prioritizing highly reviewed establishments.
3. Generate a narrative for breakfast, lunch, and dinner, including restaurant names, addresses, dish descriptions, and how the weather influences the dining experience.
4. Output the response as a JSON object with fields: 'city' (string), 'weather' (object with 'temperature' as a number, 'condition' as a string, 'dining' as a string), 'iconic_dishes' (array of three strings), and 'tour' (object with 'breakfast', 'lunch', 'dinner', each containing 'restaurant', 'address', 'dish', 'description', 'weather_consideration' as strings).
Ensure the narrative is engaging, culturally relevant, and reflects the {dining} dining environment.
Return only valid JSON with no extra text, backticks, or markdown formatting."
    )
}
