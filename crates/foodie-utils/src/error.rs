use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy for a single city's pipeline.
///
/// Every variant is recovered at the per-city boundary inside the orchestrator
/// and converted into a failure outcome carrying the `Display` text as its
/// reason. None of them abort the run for other cities.
///
/// | Variant | Raised by |
/// |---------|-----------|
/// | `CityNotFound` | geocoding returned no match |
/// | `Transport` | any HTTP/network/decoding failure |
/// | `Timeout` | execution stayed pending past its deadline |
/// | `RemoteFailure` | execution service reported a failed job |
/// | `Schema` | payload is not valid JSON |
/// | `Shape` | payload is JSON but not an itinerary |
/// | `Misconfiguration` | missing API key, agent id or bad URL |
/// | `Cancelled` | the run was cancelled before the city finished |
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TourError {
    /// Geocoding lookup found no coordinates for the city
    #[error("city not found")]
    CityNotFound,

    /// Network, HTTP status or response decoding failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Execution did not reach a terminal state before its deadline
    #[error("Execution timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Execution service reported the job as failed
    #[error("Execution failed: {0}")]
    RemoteFailure(String),

    /// Payload is not syntactically valid JSON
    #[error("Invalid JSON payload: {0}")]
    Schema(String),

    /// Payload is valid JSON but does not match the itinerary schema
    #[error("Payload does not match itinerary schema: {0}")]
    Shape(String),

    /// Required settings are missing or invalid
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// The run was cancelled before this city completed
    #[error("cancelled")]
    Cancelled,
}

impl TourError {
    /// Whether the execution attempt loop may resubmit after this error.
    ///
    /// Cancellation and misconfiguration are final; everything else is an
    /// attempt failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Misconfiguration(_))
    }
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Weather,
    Execution,
    Payload,
    Concurrency,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Weather => write!(f, "Weather"),
            Self::Execution => write!(f, "Execution"),
            Self::Payload => write!(f, "Payload"),
            Self::Concurrency => write!(f, "Concurrency"),
        }
    }
}

impl UserFriendlyError for TourError {
    fn user_message(&self) -> String {
        match self {
            Self::CityNotFound => "The city could not be found by the geocoding service".to_string(),
            Self::Transport(msg) => format!("Could not reach an upstream service: {msg}"),
            Self::Timeout { duration } => {
                format!("Itinerary generation timed out after {duration:?}")
            }
            Self::RemoteFailure(msg) => format!("Itinerary generation failed: {msg}"),
            Self::Schema(msg) => format!("Generated itinerary was not valid JSON: {msg}"),
            Self::Shape(msg) => format!("Generated itinerary was incomplete: {msg}"),
            Self::Misconfiguration(msg) => format!("Configuration error: {msg}"),
            Self::Cancelled => "The run was cancelled".to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::CityNotFound => Some(
                "Cities are resolved through the Open-Meteo geocoding database.".to_string(),
            ),
            Self::Transport(_) => Some(
                "Transport errors occur when the weather or execution service cannot be reached."
                    .to_string(),
            ),
            Self::Timeout { .. } => Some(
                "Each execution attempt has a wall-clock deadline; pending jobs past it are abandoned."
                    .to_string(),
            ),
            Self::RemoteFailure(_) => {
                Some("The execution service reported the generation job as failed.".to_string())
            }
            Self::Schema(_) | Self::Shape(_) => Some(
                "The model is instructed, not guaranteed, to return the itinerary schema."
                    .to_string(),
            ),
            Self::Misconfiguration(_) => None,
            Self::Cancelled => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CityNotFound => vec![
                "Check the spelling of the city name".to_string(),
                "Try the city's English name".to_string(),
            ],
            Self::Transport(_) => vec![
                "Check network connectivity".to_string(),
                "Re-run later if the service is rate limiting".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Increase [execution] attempt_timeout_secs".to_string(),
                "Reduce [orchestrator] max_concurrency".to_string(),
            ],
            Self::RemoteFailure(_) | Self::Schema(_) | Self::Shape(_) => {
                vec!["Re-run the city; generation is non-deterministic".to_string()]
            }
            Self::Misconfiguration(_) => vec![
                "Set the API key environment variable named by [execution] api_key_env".to_string(),
                "Set [execution] agent_id or pass --agent-id".to_string(),
            ],
            Self::Cancelled => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::CityNotFound => ErrorCategory::Weather,
            Self::Transport(_) | Self::Timeout { .. } | Self::RemoteFailure(_) => {
                ErrorCategory::Execution
            }
            Self::Schema(_) | Self::Shape(_) => ErrorCategory::Payload,
            Self::Misconfiguration(_) => ErrorCategory::Configuration,
            Self::Cancelled => ErrorCategory::Concurrency,
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(msg) => format!("Configuration file is invalid: {msg}"),
            Self::MissingRequired(key) => format!("Required setting '{key}' is not set"),
            Self::InvalidValue { key, value } => format!("Setting '{key}' is invalid: {value}"),
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Configuration is loaded with precedence: CLI flags > .foodie-tours/config.toml > defaults."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec!["Check the TOML syntax of the config file".to_string()],
            Self::MissingRequired(key) => vec![format!("Add '{key}' to the config file")],
            Self::InvalidValue { .. } => {
                vec!["Run `foodie-tours config` to inspect effective values".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl From<ConfigError> for TourError {
    fn from(err: ConfigError) -> Self {
        Self::Misconfiguration(err.to_string())
    }
}
