//! Validation of resolved configuration values

use foodie_utils::ConfigError;
use url::Url;

use crate::model::Config;

/// Upper bound on resubmissions per city
const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Upper bound on concurrent city pipelines
const MAX_CONCURRENCY_LIMIT: usize = 16;

fn invalid(key: &str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    }
}

fn validate_url(key: &str, raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|e| invalid(key, format!("'{raw}' is not a URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(key, format!("unsupported scheme '{other}'"))),
    }
}

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("weather.geocoding_url", self.geocoding_url())?;
        validate_url("weather.forecast_url", self.forecast_url())?;
        validate_url("execution.base_url", self.execution_base_url())?;

        if self.weather_request_timeout().is_zero() {
            return Err(invalid("weather.request_timeout_secs", "must be greater than 0"));
        }
        if self.execution_request_timeout().is_zero() {
            return Err(invalid(
                "execution.request_timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.poll_interval().is_zero() {
            return Err(invalid("execution.poll_interval_secs", "must be greater than 0"));
        }
        if self.attempt_timeout().is_zero() {
            return Err(invalid(
                "execution.attempt_timeout_secs",
                "must be greater than 0",
            ));
        }

        let attempts = self.max_attempts();
        if attempts == 0 || attempts > MAX_ATTEMPTS_LIMIT {
            return Err(invalid(
                "execution.max_attempts",
                format!("must be between 1 and {MAX_ATTEMPTS_LIMIT}, got {attempts}"),
            ));
        }

        let concurrency = self.max_concurrency();
        if concurrency == 0 || concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(invalid(
                "orchestrator.max_concurrency",
                format!("must be between 1 and {MAX_CONCURRENCY_LIMIT}, got {concurrency}"),
            ));
        }

        if let Some(agent_id) = self.agent_id()
            && agent_id.trim().is_empty()
        {
            return Err(invalid("execution.agent_id", "must not be empty"));
        }

        if self.api_key_env().trim().is_empty() {
            return Err(invalid("execution.api_key_env", "must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid_key(cfg: &Config, expected_key: &str) {
        match cfg.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("Expected InvalidValue for {expected_key}, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::minimal_for_testing().validate().is_ok());
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut cfg = Config::minimal_for_testing();
        cfg.execution.poll_interval_secs = Some(0);
        assert_invalid_key(&cfg, "execution.poll_interval_secs");
    }

    #[test]
    fn test_attempt_bounds() {
        let mut cfg = Config::minimal_for_testing();
        cfg.execution.max_attempts = Some(0);
        assert_invalid_key(&cfg, "execution.max_attempts");

        cfg.execution.max_attempts = Some(11);
        assert_invalid_key(&cfg, "execution.max_attempts");

        cfg.execution.max_attempts = Some(10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut cfg = Config::minimal_for_testing();
        cfg.orchestrator.max_concurrency = Some(0);
        assert_invalid_key(&cfg, "orchestrator.max_concurrency");

        cfg.orchestrator.max_concurrency = Some(17);
        assert_invalid_key(&cfg, "orchestrator.max_concurrency");
    }

    #[test]
    fn test_malformed_url_rejected() {
        let mut cfg = Config::minimal_for_testing();
        cfg.execution.base_url = Some("not a url".to_string());
        assert_invalid_key(&cfg, "execution.base_url");

        cfg.execution.base_url = Some("ftp://example.com".to_string());
        assert_invalid_key(&cfg, "execution.base_url");
    }

    #[test]
    fn test_blank_agent_id_rejected() {
        let mut cfg = Config::minimal_for_testing();
        cfg.execution.agent_id = Some("   ".to_string());
        assert_invalid_key(&cfg, "execution.agent_id");
    }
}
