//! Configuration loading and environment variable handling

use crate::domains::PrewarmConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Unprefixed variable names used by the original Lambda deployment.
/// `PATH` is deliberately absent.
const LEGACY_ENV: &[&str] = &["DISTRIBUTION_ID", "POPS", "REQUESTS_PER_POP", "CUSTOM_DOMAIN"];

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "PREWARM".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<PrewarmConfig> {
        let config = self.load_unvalidated(Some(path))?;

        // Validate all domains
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<PrewarmConfig> {
        let config = self.load_unvalidated(None::<&Path>)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<PrewarmConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Read the file (or start from defaults) and apply environment
    /// overrides, leaving validation to the caller so command-line
    /// overrides can be layered on top first
    pub fn load_unvalidated(
        &self,
        config_path: Option<impl AsRef<Path>>,
    ) -> ConfigResult<PrewarmConfig> {
        let mut config = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_yaml::from_str(&content)?
            }
            None => PrewarmConfig::default(),
        };

        // Apply environment variable overrides
        self.apply_env_overrides(&mut config)?;

        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&self, config: &mut PrewarmConfig) -> ConfigResult<()> {
        self.apply_overrides_from(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides using an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&self, config: &mut PrewarmConfig, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvLookup {
            prefix: &self.prefix,
            lookup: &lookup,
        };

        self.apply_probe_overrides(&env, &mut config.probe)?;
        self.apply_http_overrides(&env, &mut config.http)?;
        self.apply_execution_overrides(&env, &mut config.execution)?;
        self.apply_output_overrides(&env, &mut config.output)?;
        self.apply_logging_overrides(&env, &mut config.logging)?;
        self.apply_schedule_overrides(&env, &mut config.schedule)?;

        Ok(())
    }

    /// Apply probe config overrides
    fn apply_probe_overrides(
        &self,
        env: &EnvLookup<'_>,
        config: &mut crate::domains::probe::ProbeConfig,
    ) -> ConfigResult<()> {
        if let Some(id) = env.get_with_legacy("DISTRIBUTION_ID") {
            config.distribution_id = id;
        }

        if let Some(path) = env.get("URL_PATH") {
            config.url_path = path;
        }

        if let Some(pops) = env.get_with_legacy("POPS") {
            config.pops = crate::domains::probe::PopList::from_csv(&pops);
        }

        if let Some(count) = env.get_with_legacy("REQUESTS_PER_POP") {
            config.requests_per_pop = parse_var("REQUESTS_PER_POP", &count)?;
        }

        if let Some(domain) = env.get_with_legacy("CUSTOM_DOMAIN") {
            config.custom_domain = Some(domain);
        }

        Ok(())
    }

    /// Apply HTTP config overrides
    fn apply_http_overrides(
        &self,
        env: &EnvLookup<'_>,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Some(timeout) = env.get("HTTP_CONNECT_TIMEOUT") {
            config.connect_timeout = parse_seconds("HTTP_CONNECT_TIMEOUT", &timeout)?;
        }

        if let Some(timeout) = env.get("HTTP_REQUEST_TIMEOUT") {
            config.request_timeout = parse_seconds("HTTP_REQUEST_TIMEOUT", &timeout)?;
        }

        if let Some(user_agent) = env.get("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Some(verify) = env.get("HTTP_VERIFY_TLS") {
            config.verify_tls = parse_var("HTTP_VERIFY_TLS", &verify)?;
        }

        Ok(())
    }

    /// Apply execution config overrides
    fn apply_execution_overrides(
        &self,
        env: &EnvLookup<'_>,
        config: &mut crate::domains::execution::ExecutionConfig,
    ) -> ConfigResult<()> {
        if let Some(max) = env.get("MAX_CONCURRENT_FETCHES") {
            config.max_concurrent_fetches = parse_var("MAX_CONCURRENT_FETCHES", &max)?;
        }

        if let Some(timeout) = env.get("RESOLVE_TIMEOUT") {
            config.resolve_timeout = parse_seconds("RESOLVE_TIMEOUT", &timeout)?;
        }

        if let Some(deadline) = env.get("RUN_DEADLINE") {
            config.run_deadline = Some(parse_seconds("RUN_DEADLINE", &deadline)?);
        }

        Ok(())
    }

    /// Apply output config overrides
    fn apply_output_overrides(
        &self,
        env: &EnvLookup<'_>,
        config: &mut crate::domains::output::OutputConfig,
    ) -> ConfigResult<()> {
        if let Some(namespace) = env.get("METRIC_NAMESPACE") {
            config.namespace = namespace;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        env: &EnvLookup<'_>,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Some(log_level) = env.get("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Some(format) = env.get("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Apply schedule config overrides
    fn apply_schedule_overrides(
        &self,
        env: &EnvLookup<'_>,
        config: &mut crate::domains::schedule::ScheduleConfig,
    ) -> ConfigResult<()> {
        if let Some(interval) = env.get("SCHEDULE_INTERVAL") {
            config.interval = Some(parse_seconds("SCHEDULE_INTERVAL", &interval)?);
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

struct EnvLookup<'a> {
    prefix: &'a str,
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl EnvLookup<'_> {
    /// Get environment variable with prefix
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(&format!("{}_{}", self.prefix, name))
    }

    /// Prefixed variable first, then the unprefixed legacy name
    fn get_with_legacy(&self, name: &str) -> Option<String> {
        self.get(name).or_else(|| {
            if LEGACY_ENV.contains(&name) {
                (self.lookup)(name)
            } else {
                None
            }
        })
    }
}

fn parse_var<T>(name: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e)))
}

fn parse_seconds(name: &str, value: &str) -> ConfigResult<Duration> {
    parse_var::<u64>(name, value).map(Duration::from_secs)
}
