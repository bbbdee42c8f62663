//! CLI configuration management
//!
//! Handles loading configuration from TOML files and environment variables.
//!
//! ```toml
//! scenario = "parallel-system"
//! output = "json"
//! log_level = "debug"
//! seed = 42
//!
//! [run]
//! max_parallel_processes = 4
//!
//! [method]
//! method = "directional_sampling"
//! minimum_samples = 2000
//! ```

use reliability_methods::model::RunSettings;
use reliability_methods::MethodSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::scenarios::Scenario;

/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "RELIABILITY_LOG_LEVEL";
/// Environment variable overriding the number of worker threads
pub const ENV_THREADS: &str = "RELIABILITY_THREADS";
/// Environment variable overriding the random seed
pub const ENV_SEED: &str = "RELIABILITY_SEED";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid output format: {0}. Must be one of: table, json")]
    InvalidOutputFormat(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error(transparent)]
    Method(#[from] reliability_methods::ConfigError),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Format of the printed results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::InvalidOutputFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// CLI configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Built-in limit state to analyse
    pub scenario: Scenario,
    /// Output format
    pub output: OutputFormat,
    /// Log level used when `RUST_LOG` is not set
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Seed for the sampling methods; the method's own seed when absent
    pub seed: Option<u64>,
    /// Model runner settings
    pub run: RunSettings,
    /// Reliability method and its settings
    pub method: MethodSettings,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::default(),
            output: OutputFormat::Table,
            log_level: LogLevel::Info,
            seed: None,
            run: RunSettings {
                max_parallel_processes: num_cpus::get().max(1),
                cache_evaluations: false,
            },
            method: MethodSettings::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CliConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Override settings from variables found by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&level)?;
        }

        if let Some(threads) = lookup(ENV_THREADS) {
            self.run.max_parallel_processes =
                threads.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    name: ENV_THREADS,
                    value: threads.clone(),
                })?;
        }

        if let Some(seed) = lookup(ENV_SEED) {
            self.seed = Some(seed.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: ENV_SEED,
                value: seed.clone(),
            })?);
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run.validate()?;
        self.method.validate()?;
        Ok(())
    }
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Environment variables
/// 2. Config file
/// 3. Default values
///
/// Command line flags are applied on top by the commands.
pub fn build_config(path: Option<&Path>) -> Result<CliConfig, ConfigError> {
    let mut config = match path {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };
    config.apply_env(|name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reliability_methods::MethodKind;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.scenario, Scenario::LinearResistance);
        assert_eq!(config.output, OutputFormat::Table);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.seed.is_none());
        assert!(config.run.max_parallel_processes >= 1);
        assert_eq!(config.method.kind(), MethodKind::Form);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Warn").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("verbose").is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("table").unwrap(), OutputFormat::Table);
        assert!(OutputFormat::from_str("csv").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config = CliConfig::from_toml_str(
            r#"
            scenario = "oblate-spheroid"
            output = "json"
            log_level = "Debug"
            seed = 11

            [run]
            max_parallel_processes = 2

            [method]
            method = "directional_sampling"
            minimum_samples = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.scenario, Scenario::OblateSpheroid);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.run.max_parallel_processes, 2);
        match &config.method {
            MethodSettings::DirectionalSampling(s) => assert_eq!(s.minimum_samples, 500),
            other => panic!("unexpected method {:?}", other.kind()),
        }
    }

    #[test]
    fn test_invalid_method_settings_are_rejected() {
        let result = CliConfig::from_toml_str(
            r#"
            [method]
            method = "form"
            relaxation_factor = 2.0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Method(_))));
    }

    #[test]
    fn test_unknown_scenario() {
        let result = CliConfig::from_toml_str(r#"scenario = "bridge""#);
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = [(ENV_THREADS, "3"), (ENV_SEED, "99"), (ENV_LOG_LEVEL, "warn")]
            .into_iter()
            .collect();
        let mut config = CliConfig::default();
        config
            .apply_env(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.run.max_parallel_processes, 3);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_environment_value() {
        let mut config = CliConfig::default();
        let result = config.apply_env(|name| (name == ENV_THREADS).then(|| "many".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
