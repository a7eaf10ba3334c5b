//! Config file discovery and CLI > file > defaults layering

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use foodie_utils::ConfigError;

use crate::model::{
    CliArgs, Config, ConfigSource, Defaults, ExecutionConfig, OrchestratorConfig, TomlConfig,
    WeatherConfig,
};

/// Directory searched for `config.toml`
pub const CONFIG_DIR_NAME: &str = ".foodie-tours";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Every attributable key, seeded with `ConfigSource::Defaults`
const ATTRIBUTED_KEYS: &[&str] = &[
    "defaults.verbose",
    "defaults.cities",
    "weather.geocoding_url",
    "weather.forecast_url",
    "weather.geocode_cache_ttl_secs",
    "weather.request_timeout_secs",
    "execution.base_url",
    "execution.api_key_env",
    "execution.agent_id",
    "execution.poll_interval_secs",
    "execution.attempt_timeout_secs",
    "execution.max_attempts",
    "execution.retry_backoff_secs",
    "execution.request_timeout_secs",
    "orchestrator.max_concurrency",
    "orchestrator.pacing_delay_secs",
];

/// Replace `target` when `incoming` is set, recording where the value came from.
fn merge<T>(
    target: &mut Option<T>,
    incoming: Option<T>,
    key: &str,
    source: &ConfigSource,
    attribution: &mut BTreeMap<String, ConfigSource>,
) {
    if incoming.is_some() {
        *target = incoming;
        attribution.insert(key.to_string(), source.clone());
    }
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let mut attribution: BTreeMap<String, ConfigSource> = ATTRIBUTED_KEYS
            .iter()
            .map(|key| ((*key).to_string(), ConfigSource::Defaults))
            .collect();

        let mut defaults = Defaults::default();
        let mut weather = WeatherConfig::default();
        let mut execution = ExecutionConfig::default();
        let mut orchestrator = OrchestratorConfig::default();

        let config_path = match &cli_args.config_path {
            Some(explicit_path) => {
                if !explicit_path.exists() {
                    return Err(ConfigError::InvalidFile(format!(
                        "{} does not exist",
                        explicit_path.display()
                    ))
                    .into());
                }
                Some(explicit_path.clone())
            }
            None => Self::discover_config_file_from(start_dir),
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            let source = ConfigSource::ConfigFile(path.clone());
            let attr = &mut attribution;

            if let Some(file) = file_config.defaults {
                merge(&mut defaults.verbose, file.verbose, "defaults.verbose", &source, attr);
                merge(&mut defaults.cities, file.cities, "defaults.cities", &source, attr);
            }

            if let Some(file) = file_config.weather {
                merge(
                    &mut weather.geocoding_url,
                    file.geocoding_url,
                    "weather.geocoding_url",
                    &source,
                    attr,
                );
                merge(
                    &mut weather.forecast_url,
                    file.forecast_url,
                    "weather.forecast_url",
                    &source,
                    attr,
                );
                merge(
                    &mut weather.geocode_cache_ttl_secs,
                    file.geocode_cache_ttl_secs,
                    "weather.geocode_cache_ttl_secs",
                    &source,
                    attr,
                );
                merge(
                    &mut weather.request_timeout_secs,
                    file.request_timeout_secs,
                    "weather.request_timeout_secs",
                    &source,
                    attr,
                );
            }

            if let Some(file) = file_config.execution {
                merge(
                    &mut execution.base_url,
                    file.base_url,
                    "execution.base_url",
                    &source,
                    attr,
                );
                merge(
                    &mut execution.api_key_env,
                    file.api_key_env,
                    "execution.api_key_env",
                    &source,
                    attr,
                );
                merge(
                    &mut execution.agent_id,
                    file.agent_id,
                    "execution.agent_id",
                    &source,
                    attr,
                );
                merge(
                    &mut execution.poll_interval_secs,
                    file.poll_interval_secs,
                    "execution.poll_interval_secs",
                    &source,
                    attr,
                );
                merge(
                    &mut execution.attempt_timeout_secs,
                    file.attempt_timeout_secs,
                    "execution.attempt_timeout_secs",
                    &source,
                    attr,
                );
                merge(
                    &mut execution.max_attempts,
                    file.max_attempts,
                    "execution.max_attempts",
                    &source,
                    attr,
                );
                merge(
                    &mut execution.retry_backoff_secs,
                    file.retry_backoff_secs,
                    "execution.retry_backoff_secs",
                    &source,
                    attr,
                );
                merge(
                    &mut execution.request_timeout_secs,
                    file.request_timeout_secs,
                    "execution.request_timeout_secs",
                    &source,
                    attr,
                );
            }

            if let Some(file) = file_config.orchestrator {
                merge(
                    &mut orchestrator.max_concurrency,
                    file.max_concurrency,
                    "orchestrator.max_concurrency",
                    &source,
                    attr,
                );
                merge(
                    &mut orchestrator.pacing_delay_secs,
                    file.pacing_delay_secs,
                    "orchestrator.pacing_delay_secs",
                    &source,
                    attr,
                );
            }
        }

        // CLI overrides
        let cli = ConfigSource::Cli;
        merge(
            &mut defaults.verbose,
            cli_args.verbose,
            "defaults.verbose",
            &cli,
            &mut attribution,
        );
        merge(
            &mut orchestrator.max_concurrency,
            cli_args.max_concurrency,
            "orchestrator.max_concurrency",
            &cli,
            &mut attribution,
        );
        merge(
            &mut execution.agent_id,
            cli_args.agent_id.clone(),
            "execution.agent_id",
            &cli,
            &mut attribution,
        );
        merge(
            &mut execution.base_url,
            cli_args.execution_base_url.clone(),
            "execution.base_url",
            &cli,
            &mut attribution,
        );

        let config = Config {
            defaults,
            weather,
            execution,
            orchestrator,
            source_attribution: attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Search upward from `start_dir` for `.foodie-tours/config.toml`.
    ///
    /// Stops at the filesystem root or at the first repository root marker
    /// (`.git`, `.hg`, `.svn`).
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current_dir = Some(start_dir);

        while let Some(dir) = current_dir {
            let config_path = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }

            if dir.join(".git").exists() || dir.join(".hg").exists() || dir.join(".svn").exists()
            {
                break;
            }

            current_dir = dir.parent();
        }

        None
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: TomlConfig = toml::from_str(&content).map_err(|e| {
                    ConfigError::InvalidFile(format!("{}: {}", path.display(), e))
                })?;
                Ok(config)
            }
            // A file that vanished between discovery and load falls back to defaults
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )),
        }
    }

    /// Source of a resolved key, `defaults` when never overridden.
    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .cloned()
            .unwrap_or(ConfigSource::Defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let config_dir = dir.join(CONFIG_DIR_NAME);
        fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join(CONFIG_FILE_NAME);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_config_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        let cfg = Config::discover_from(temp.path(), &CliArgs::default()).unwrap();

        assert_eq!(cfg.max_concurrency(), 3);
        assert_eq!(cfg.source_of("orchestrator.max_concurrency"), ConfigSource::Defaults);
    }

    #[test]
    fn test_discovers_config_in_parent_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        let path = write_config(
            temp.path(),
            r#"
[execution]
agent_id = "agent-from-file"
attempt_timeout_secs = 90
"#,
        );
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let cfg = Config::discover_from(&nested, &CliArgs::default()).unwrap();

        assert_eq!(cfg.agent_id(), Some("agent-from-file"));
        assert_eq!(cfg.attempt_timeout(), Duration::from_secs(90));
        assert_eq!(
            cfg.source_of("execution.agent_id"),
            ConfigSource::ConfigFile(path)
        );
        assert_eq!(cfg.source_of("execution.max_attempts"), ConfigSource::Defaults);
    }

    #[test]
    fn test_discovery_stops_at_repository_root() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "[execution]\nagent_id = \"outer\"\n");
        let repo = temp.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        assert!(Config::discover_config_file_from(&repo).is_none());
    }

    #[test]
    fn test_cli_overrides_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(
            temp.path(),
            "[orchestrator]\nmax_concurrency = 5\n[execution]\nagent_id = \"file-agent\"\n",
        );

        let cli = CliArgs {
            max_concurrency: Some(1),
            agent_id: Some("cli-agent".to_string()),
            ..CliArgs::default()
        };
        let cfg = Config::discover_from(temp.path(), &cli).unwrap();

        assert_eq!(cfg.max_concurrency(), 1);
        assert_eq!(cfg.agent_id(), Some("cli-agent"));
        assert_eq!(cfg.source_of("orchestrator.max_concurrency"), ConfigSource::Cli);
        assert_eq!(cfg.source_of("execution.agent_id"), ConfigSource::Cli);
    }

    #[test]
    fn test_explicit_missing_config_path_is_error() {
        let temp = TempDir::new().unwrap();
        let cli = CliArgs {
            config_path: Some(temp.path().join("nope.toml")),
            ..CliArgs::default()
        };

        let err = Config::discover_from(temp.path(), &cli).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(temp.path(), "[orchestrator\nmax_concurrency = ");

        let err = Config::discover_from(temp.path(), &CliArgs::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid configuration file"));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(temp.path(), "[phases]\nfoo = 1\n");

        assert!(Config::discover_from(temp.path(), &CliArgs::default()).is_err());
    }

    #[test]
    fn test_invalid_value_from_file_fails_validation() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(temp.path(), "[execution]\nmax_attempts = 0\n");

        let err = Config::discover_from(temp.path(), &CliArgs::default()).unwrap_err();
        assert!(format!("{err:#}").contains("max_attempts"));
    }
}
