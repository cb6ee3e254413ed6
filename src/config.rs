//! Configuration file support
//!
//! Settings live in an optional TOML file. A missing file yields the defaults,
//! which match the built-in one-hour countdown and four seed tasks.

use crate::tasks::DEFAULT_SEED_TITLES;
use crate::timer::{DEFAULT_TOTAL_DURATION_SECS, TimerSettings};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub timer: TimerConfig,
    pub tasks: TasksConfig,
}

/// `[timer]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Countdown budget restored by reset, in seconds
    pub total_duration_secs: i64,
    /// Milliseconds between ticks
    pub tick_interval_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            total_duration_secs: DEFAULT_TOTAL_DURATION_SECS,
            tick_interval_ms: 1000,
        }
    }
}

impl TimerConfig {
    pub fn settings(&self) -> TimerSettings {
        TimerSettings {
            total_duration_secs: self.total_duration_secs,
            tick_interval: Duration::from_millis(self.tick_interval_ms),
        }
    }
}

/// `[tasks]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    /// Titles the task list starts with and resets to
    pub seed: Vec<String>,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED_TITLES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("load config {}", path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the models cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.timer.total_duration_secs > 0,
            "timer.total_duration_secs must be positive (got {})",
            self.timer.total_duration_secs
        );
        ensure!(
            self.timer.tick_interval_ms > 0,
            "timer.tick_interval_ms must be positive"
        );
        if let Some(position) = self.tasks.seed.iter().position(|t| t.trim().is_empty()) {
            anyhow::bail!("tasks.seed[{}] must not be blank", position);
        }
        Ok(())
    }
}
