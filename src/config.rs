//! Run configuration.
//!
//! ```yaml
//! seed: 42
//! runners:
//!   - generator: { type: aws:vpcflow }
//!     output: { type: file, directory: /tmp/logs, pattern: "vpcflow_*.log" }
//!     interval: 30s
//!     records: 1024
//! ```
//!
//! The `generator` and `output` sections are kept as raw YAML; their own
//! constructors interpret them.

pub mod duration;

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Longest accepted `interval`.
pub const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 3600);

/// Records written per batch when `records` is omitted.
pub const DEFAULT_RECORDS: u64 = 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("at least one runner is required")]
    NoRunners,

    /// An `interval` that is not a positive duration
    #[error("runner {runner}: invalid 'interval' value '{value}': {reason}")]
    Interval {
        runner: usize,
        value: String,
        reason: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Master seed; the command line takes precedence
    #[serde(default)]
    pub seed: Option<u64>,
    pub runners: Vec<RunnerConfig>,
}

/// One generator/output pair.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    pub generator: serde_yaml::Value,
    pub output: serde_yaml::Value,
    /// Pause between batches; without it the runner writes one batch
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default = "default_records")]
    pub records: u64,
}

fn default_records() -> u64 {
    DEFAULT_RECORDS
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.runners.is_empty() {
            return Err(ConfigError::NoRunners);
        }
        for (index, runner) in self.runners.iter().enumerate() {
            runner.interval(index)?;
        }
        Ok(())
    }
}

impl RunnerConfig {
    /// The parsed interval of runner `index`.
    pub fn interval(&self, index: usize) -> Result<Option<Duration>, ConfigError> {
        let Some(value) = &self.interval else {
            return Ok(None);
        };
        let invalid = |reason: String| ConfigError::Interval {
            runner: index,
            value: value.clone(),
            reason,
        };

        let period = duration::parse_duration(value).map_err(|e| invalid(format!("{e:#}")))?;
        if period.is_zero() {
            return Err(invalid("must be greater than zero".to_string()));
        }
        if period > MAX_INTERVAL {
            return Err(invalid(format!(
                "must not exceed {} seconds",
                MAX_INTERVAL.as_secs()
            )));
        }
        Ok(Some(period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = Config::from_yaml(
            r#"
seed: 42
runners:
  - generator: { type: aws:vpcflow, static_time: "2024-01-02T03:04:05Z" }
    output: { type: file, directory: /tmp/logs, pattern: "vpcflow_*.log" }
    interval: 250ms
    records: 10
  - generator: { type: clf }
    output: { type: rally, filename: /tmp/clf.ndjson }
"#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.runners.len(), 2);

        let first = &config.runners[0];
        assert_eq!(first.records, 10);
        assert_eq!(first.interval(0).unwrap(), Some(Duration::from_millis(250)));
        assert_eq!(first.generator["type"].as_str(), Some("aws:vpcflow"));

        let second = &config.runners[1];
        assert_eq!(second.records, DEFAULT_RECORDS);
        assert_eq!(second.interval(1).unwrap(), None);
        assert_eq!(second.output["filename"].as_str(), Some("/tmp/clf.ndjson"));
    }

    #[test]
    fn test_seed_is_optional() {
        let config = Config::from_yaml(
            "runners:\n  - generator: { type: clf }\n    output: { type: file, filename: /tmp/x }",
        )
        .unwrap();
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_runners_required() {
        let err = Config::from_yaml("runners: []").unwrap_err();
        assert_eq!(err.to_string(), "at least one runner is required");

        let err = Config::from_yaml("seed: 1").unwrap_err();
        assert!(err.to_string().contains("missing field `runners`"), "{err}");
    }

    #[test]
    fn test_invalid_interval_names_runner() {
        let err = Config::from_yaml(
            r#"
runners:
  - generator: { type: clf }
    output: { type: file, filename: /tmp/a }
  - generator: { type: clf }
    output: { type: file, filename: /tmp/b }
    interval: soon
"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "runner 1: invalid 'interval' value 'soon': Invalid duration value: soon: invalid digit found in string"
        );

        let err = Config::from_yaml(
            "runners:\n  - generator: { type: clf }\n    output: { type: file, filename: /tmp/a }\n    interval: 0s",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "runner 0: invalid 'interval' value '0s': must be greater than zero"
        );
    }

    #[test]
    fn test_interval_out_of_range() {
        let runner = |interval: &str| {
            format!(
                "runners:\n  - generator: {{ type: clf }}\n    output: {{ type: file, filename: /tmp/a }}\n    interval: {interval}"
            )
        };

        let err = Config::from_yaml(&runner("9999999999999999h")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "runner 0: invalid 'interval' value '9999999999999999h': Hours value out of range: 9999999999999999"
        );

        let err = Config::from_yaml(&runner("18446744073709551615s")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "runner 0: invalid 'interval' value '18446744073709551615s': must not exceed 31536000 seconds"
        );

        let config = Config::from_yaml(&runner("8760h")).unwrap();
        assert_eq!(config.runners[0].interval(0).unwrap(), Some(MAX_INTERVAL));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logsynth.yml");
        fs::write(
            &path,
            "runners:\n  - generator: { type: winlog }\n    output: { type: simulate, filename: /tmp/s.json }",
        )
        .unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.runners[0].generator["type"].as_str(), Some("winlog"));

        let err = Config::from_file(dir.path().join("missing.yml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }
}
