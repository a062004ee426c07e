use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub reports: ReportLimits,
    pub snapshots: SnapshotConfig,
    pub logging: LoggingConfig,
    /// Extra ticket tag labels, merged over the built-in table.
    pub tags: HashMap<String, String>,
}

/// Parameter defaults and caps applied before rows are fetched.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportLimits {
    pub default_days: u32,
    pub max_days: u32,
    pub summary_days: u32,
    pub default_location_limit: usize,
    pub max_location_limit: usize,
}

impl Default for ReportLimits {
    fn default() -> Self {
        ReportLimits {
            default_days: 30,
            max_days: 90,
            summary_days: 7,
            default_location_limit: 15,
            max_location_limit: 50,
        }
    }
}

impl ReportLimits {
    /// Requested day window, or the default, clamped to `1..=max_days`.
    pub fn clamp_days(&self, requested: Option<i64>) -> u32 {
        let max = self.max_days.max(1);
        let days = requested.unwrap_or(self.default_days as i64);
        days.clamp(1, max as i64) as u32
    }

    /// Requested top-N, or the default, clamped to `1..=max_location_limit`.
    pub fn clamp_limit(&self, requested: Option<i64>) -> usize {
        let max = self.max_location_limit.max(1);
        let limit = requested.unwrap_or(self.default_location_limit as i64);
        limit.clamp(1, max as i64) as usize
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnapshotConfig {
    pub dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        SnapshotConfig {
            dir: PathBuf::from("snapshots"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from a TOML file (defaults if `path` is `None`) and apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Config::default(),
        };
        cfg.with_env_overrides(|k| std::env::var(k).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `INSIGHTS_*` overrides read through `get`. Taking the getter as
    /// a parameter keeps tests off the process environment.
    pub fn with_env_overrides<F>(mut self, mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(v) = get("INSIGHTS_DEFAULT_DAYS") {
            self.reports.default_days = parse_override("INSIGHTS_DEFAULT_DAYS", &v)?;
        }
        if let Some(v) = get("INSIGHTS_MAX_DAYS") {
            self.reports.max_days = parse_override("INSIGHTS_MAX_DAYS", &v)?;
        }
        if let Some(v) = get("INSIGHTS_MAX_LOCATION_LIMIT") {
            self.reports.max_location_limit = parse_override("INSIGHTS_MAX_LOCATION_LIMIT", &v)?;
        }
        if let Some(v) = get("INSIGHTS_SNAPSHOT_DIR") {
            self.snapshots.dir = PathBuf::from(v);
        }
        if let Some(v) = get("INSIGHTS_LOG_LEVEL") {
            self.logging.level = v;
        }
        Ok(self)
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidOverride {
            key: key.to_string(),
            value: value.to_string(),
        })
}
