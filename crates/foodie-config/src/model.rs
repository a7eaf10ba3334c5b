//! Configuration sections and their built-in defaults

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use foodie_utils::ConfigError;

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_GEOCODE_CACHE_TTL_SECS: u64 = 86_400;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_EXECUTION_BASE_URL: &str = "https://api.julep.ai/api";
pub const DEFAULT_API_KEY_ENV: &str = "JULEP_API_KEY";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_RETRY_BACKOFF_SECS: u64 = 5;

pub const DEFAULT_MAX_CONCURRENCY: usize = 3;
pub const DEFAULT_PACING_DELAY_SECS: u64 = 1;

pub const DEFAULT_CITY: &str = "Paris";

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    ConfigFile(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::ConfigFile(path) => write!(f, "config file ({})", path.display()),
            Self::Defaults => write!(f, "defaults"),
        }
    }
}

/// `[defaults]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    pub verbose: Option<bool>,
    /// Cities used when none are given on the command line
    pub cities: Option<Vec<String>>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            verbose: Some(false),
            cities: Some(vec![DEFAULT_CITY.to_string()]),
        }
    }
}

/// `[weather]` section: Open-Meteo endpoints and geocode caching
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherConfig {
    pub geocoding_url: Option<String>,
    pub forecast_url: Option<String>,
    pub geocode_cache_ttl_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: Some(DEFAULT_GEOCODING_URL.to_string()),
            forecast_url: Some(DEFAULT_FORECAST_URL.to_string()),
            geocode_cache_ttl_secs: Some(DEFAULT_GEOCODE_CACHE_TTL_SECS),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// `[execution]` section: remote task execution service and poll policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionConfig {
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Pre-provisioned agent that owns the generation task
    pub agent_id: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub attempt_timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_backoff_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_EXECUTION_BASE_URL.to_string()),
            api_key_env: Some(DEFAULT_API_KEY_ENV.to_string()),
            agent_id: None,
            poll_interval_secs: Some(DEFAULT_POLL_INTERVAL_SECS),
            attempt_timeout_secs: Some(DEFAULT_ATTEMPT_TIMEOUT_SECS),
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
            retry_backoff_secs: Some(DEFAULT_RETRY_BACKOFF_SECS),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// `[orchestrator]` section: fan-out bound and inter-city pacing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    pub max_concurrency: Option<usize>,
    pub pacing_delay_secs: Option<u64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: Some(DEFAULT_MAX_CONCURRENCY),
            pacing_delay_secs: Some(DEFAULT_PACING_DELAY_SECS),
        }
    }
}

/// Configuration for foodie-tours runs.
///
/// Built by [`Config::discover()`] with precedence CLI > config file > defaults.
/// Each resolved key records its [`ConfigSource`] in `source_attribution`.
///
/// # Configuration File Format
///
/// ```toml
/// [defaults]
/// cities = ["Paris", "Tokyo"]
///
/// [weather]
/// geocode_cache_ttl_secs = 86400
///
/// [execution]
/// agent_id = "0684428f-e045-76d5-8000-3f78054879ba"
/// api_key_env = "JULEP_API_KEY"
/// attempt_timeout_secs = 60
/// max_attempts = 2
///
/// [orchestrator]
/// max_concurrency = 3
/// pacing_delay_secs = 1
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub defaults: Defaults,
    pub weather: WeatherConfig,
    pub execution: ExecutionConfig,
    pub orchestrator: OrchestratorConfig,
    /// Source attribution for each setting (for `foodie-tours config`).
    pub source_attribution: BTreeMap<String, ConfigSource>,
}

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub defaults: Option<Defaults>,
    pub weather: Option<WeatherConfig>,
    pub execution: Option<ExecutionConfig>,
    pub orchestrator: Option<OrchestratorConfig>,
}

/// CLI arguments for configuration override
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub verbose: Option<bool>,
    pub max_concurrency: Option<usize>,
    pub agent_id: Option<String>,
    pub execution_base_url: Option<String>,
}

fn secs(value: Option<u64>, default: u64) -> Duration {
    Duration::from_secs(value.unwrap_or(default))
}

impl Config {
    /// Configuration with built-in defaults only; no discovery, no attribution.
    #[must_use]
    pub fn minimal_for_testing() -> Self {
        Self {
            defaults: Defaults::default(),
            weather: WeatherConfig::default(),
            execution: ExecutionConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            source_attribution: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    /// Cities to process when none are given explicitly
    #[must_use]
    pub fn default_cities(&self) -> Vec<String> {
        self.defaults
            .cities
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_CITY.to_string()])
    }

    #[must_use]
    pub fn geocoding_url(&self) -> &str {
        self.weather
            .geocoding_url
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODING_URL)
    }

    #[must_use]
    pub fn forecast_url(&self) -> &str {
        self.weather
            .forecast_url
            .as_deref()
            .unwrap_or(DEFAULT_FORECAST_URL)
    }

    #[must_use]
    pub fn geocode_cache_ttl(&self) -> Duration {
        secs(
            self.weather.geocode_cache_ttl_secs,
            DEFAULT_GEOCODE_CACHE_TTL_SECS,
        )
    }

    #[must_use]
    pub fn weather_request_timeout(&self) -> Duration {
        secs(self.weather.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    #[must_use]
    pub fn execution_base_url(&self) -> &str {
        self.execution
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_EXECUTION_BASE_URL)
    }

    #[must_use]
    pub fn api_key_env(&self) -> &str {
        self.execution
            .api_key_env
            .as_deref()
            .unwrap_or(DEFAULT_API_KEY_ENV)
    }

    #[must_use]
    pub fn agent_id(&self) -> Option<&str> {
        self.execution.agent_id.as_deref()
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        secs(self.execution.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS)
    }

    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        secs(
            self.execution.attempt_timeout_secs,
            DEFAULT_ATTEMPT_TIMEOUT_SECS,
        )
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.execution.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        secs(self.execution.retry_backoff_secs, DEFAULT_RETRY_BACKOFF_SECS)
    }

    #[must_use]
    pub fn execution_request_timeout(&self) -> Duration {
        secs(
            self.execution.request_timeout_secs,
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )
    }

    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.orchestrator
            .max_concurrency
            .unwrap_or(DEFAULT_MAX_CONCURRENCY)
    }

    #[must_use]
    pub fn pacing_delay(&self) -> Duration {
        secs(
            self.orchestrator.pacing_delay_secs,
            DEFAULT_PACING_DELAY_SECS,
        )
    }

    /// Read the execution service API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` when the variable is unset or empty.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        let env_name = self.api_key_env();
        match std::env::var(env_name) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingRequired(format!(
                "API key environment variable '{}' (configure [execution] api_key_env to use another name)",
                env_name
            ))),
        }
    }

    /// Effective values in display order, paired with their attribution key.
    #[must_use]
    pub fn effective_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("defaults.verbose", self.verbose().to_string()),
            ("defaults.cities", self.default_cities().join(", ")),
            ("weather.geocoding_url", self.geocoding_url().to_string()),
            ("weather.forecast_url", self.forecast_url().to_string()),
            (
                "weather.geocode_cache_ttl_secs",
                self.geocode_cache_ttl().as_secs().to_string(),
            ),
            (
                "weather.request_timeout_secs",
                self.weather_request_timeout().as_secs().to_string(),
            ),
            ("execution.base_url", self.execution_base_url().to_string()),
            ("execution.api_key_env", self.api_key_env().to_string()),
            (
                "execution.agent_id",
                self.agent_id().unwrap_or("(unset)").to_string(),
            ),
            (
                "execution.poll_interval_secs",
                self.poll_interval().as_secs().to_string(),
            ),
            (
                "execution.attempt_timeout_secs",
                self.attempt_timeout().as_secs().to_string(),
            ),
            ("execution.max_attempts", self.max_attempts().to_string()),
            (
                "execution.retry_backoff_secs",
                self.retry_backoff().as_secs().to_string(),
            ),
            (
                "execution.request_timeout_secs",
                self.execution_request_timeout().as_secs().to_string(),
            ),
            (
                "orchestrator.max_concurrency",
                self.max_concurrency().to_string(),
            ),
            (
                "orchestrator.pacing_delay_secs",
                self.pacing_delay().as_secs().to_string(),
            ),
        ]
    }
}
