//! Configuration for the watch loop and the analysis pool.

use crate::error::{LintError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".lintblame.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Polling and presentation settings.
    #[serde(default)]
    pub watch: WatchConfig,

    /// Worker pool settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Version-control settings.
    #[serde(default)]
    pub git: GitConfig,
}

impl Config {
    /// Load `.lintblame.toml` from `dir`, or defaults if there is none.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load_file(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| LintError::ConfigError(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| LintError::ConfigError(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.watch.poll_interval_ms == 0 {
            return Err(LintError::ConfigError(
                "watch.poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.watch.refresh_every == 0 {
            return Err(LintError::ConfigError(
                "watch.refresh_every must be greater than zero".into(),
            ));
        }
        if self.analysis.task_timeout_secs == 0 {
            return Err(LintError::ConfigError(
                "analysis.task_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// How tracked paths are ordered for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Single-pass prepend/append ordering: a path newer than everything seen
    /// before it goes last, anything else goes first.
    #[default]
    Heuristic,
    /// Stable sort by modification time, oldest first.
    TimeSorted,
}

/// Polling settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchConfig {
    /// Delay between two ticks of the watch loop (default: 1000).
    pub poll_interval_ms: u64,

    /// Re-read the whole path set from its source every N ticks (default: 5).
    pub refresh_every: u32,

    /// Ordering of files in the report (default: heuristic).
    pub order: OrderPolicy,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            refresh_every: 5,
            order: OrderPolicy::Heuristic,
        }
    }
}

impl WatchConfig {
    /// Returns the poll interval as a Duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of worker threads; 0 means the available parallelism.
    pub workers: usize,

    /// Wall-clock budget for analysing a single file (default: 30).
    pub task_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            task_timeout_secs: 30,
        }
    }
}

impl AnalysisConfig {
    /// Returns the per-file budget as a Duration.
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    /// Resolved pool size, never zero.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

/// Version-control settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GitConfig {
    /// Branch the current branch is diffed against in branch mode.
    pub base_branch: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            base_branch: "master".to_string(),
        }
    }
}
