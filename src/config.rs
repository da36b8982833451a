use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest accepted sample-store capacity
pub const MAX_CAPACITY: usize = 1 << 24;

/// Largest accepted histogram bin count
pub const MAX_BINS: usize = 4096;

/// Largest buffer a single report read may ask for (1 MiB)
pub const MAX_REPORT_BUFFER: usize = 1 << 20;

/// How many samples the store keeps and what happens once it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum Retention {
    /// Grow on demand; a failed growth rejects the sample atomically.
    Unbounded,
    /// Ring buffer: a new sample evicts the oldest one.
    EvictOldest { capacity: usize },
    /// Keep the first `capacity` samples and refuse the rest.
    KeepFirst { capacity: usize },
}

impl Default for Retention {
    fn default() -> Self {
        Self::EvictOldest {
            capacity: default_capacity(),
        }
    }
}

/// When the histogram is rebuilt from the retained samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RebuildPolicy {
    /// Full rebuild after every sample.
    #[default]
    Always,
    /// Full rebuild only when the range grows, single-bin update otherwise.
    OnRangeChange,
}

/// Engine and host configuration, loaded from TOML and overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP surface binds to
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Stimulus period in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Number of histogram bins
    #[serde(default = "default_bins")]
    pub bins: usize,

    pub retention: Retention,

    pub rebuild: RebuildPolicy,

    /// Size of the buffer a report read is rendered into
    #[serde(default = "default_report_buffer")]
    pub report_buffer: usize,
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_interval_ms() -> u64 {
    1000
}
fn default_bins() -> usize {
    10
}
fn default_capacity() -> usize {
    1024
}
fn default_report_buffer() -> usize {
    4096
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            interval_ms: default_interval_ms(),
            bins: default_bins(),
            retention: Retention::default(),
            rebuild: RebuildPolicy::default(),
            report_buffer: default_report_buffer(),
        }
    }
}

impl Config {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid("interval_ms must be positive".into()));
        }
        if self.bins == 0 || self.bins > MAX_BINS {
            return Err(ConfigError::Invalid(format!(
                "bins must be between 1 and {MAX_BINS}"
            )));
        }
        if self.report_buffer == 0 || self.report_buffer > MAX_REPORT_BUFFER {
            return Err(ConfigError::Invalid(format!(
                "report_buffer must be between 1 and {MAX_REPORT_BUFFER}"
            )));
        }
        match self.retention {
            Retention::EvictOldest { capacity } | Retention::KeepFirst { capacity }
                if capacity == 0 || capacity > MAX_CAPACITY =>
            {
                Err(ConfigError::Invalid(format!(
                    "bounded retention needs a capacity between 1 and {MAX_CAPACITY}"
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.interval(), Duration::from_secs(1));
        assert_eq!(config.bins, 10);
        assert_eq!(
            config.retention,
            Retention::EvictOldest { capacity: 1024 }
        );
    }

    #[test]
    fn retention_and_rebuild_parse() {
        let config: Config = toml::from_str(
            r#"
            interval_ms = 250
            rebuild = "on-range-change"

            [retention]
            policy = "keep-first"
            capacity = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.interval_ms, 250);
        assert_eq!(config.rebuild, RebuildPolicy::OnRangeChange);
        assert_eq!(config.retention, Retention::KeepFirst { capacity: 8 });

        let unbounded: Config = toml::from_str("retention = { policy = \"unbounded\" }").unwrap();
        assert_eq!(unbounded.retention, Retention::Unbounded);
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let mut config = Config::default();
        config.bins = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retention = Retention::KeepFirst { capacity: 0 };
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retention = Retention::EvictOldest {
            capacity: usize::MAX / 2,
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.retention = Retention::KeepFirst {
            capacity: MAX_CAPACITY + 1,
        };
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.bins = MAX_BINS + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.report_buffer = MAX_REPORT_BUFFER + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.bins = MAX_BINS;
        config.retention = Retention::EvictOldest {
            capacity: MAX_CAPACITY,
        };
        assert!(config.validate().is_ok());

        assert!(Config::default().validate().is_ok());
    }
}
