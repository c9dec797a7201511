//! Configuration models for taskrun.
//!
//! Every tunable of a run lives here. Values come from a TOML file, then
//! CLI flags override individual fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration for taskrun.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Runner settings (task count, concurrency bound)
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Task body settings
    #[serde(default)]
    pub task: TaskConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Number of tasks launched per run
    #[serde(default = "default_tasks")]
    pub tasks: usize,

    /// Maximum task bodies executing at once (unset = unbounded)
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Show a progress bar while tasks complete
    #[serde(default)]
    pub progress: bool,
}

fn default_tasks() -> usize {
    3
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tasks: default_tasks(),
            concurrency: None,
            progress: false,
        }
    }
}

/// Marker task configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Label printed in front of the task index
    #[serde(default = "default_label")]
    pub label: String,

    /// Fixed delay between the start and finish markers, in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Per-task delays, indexed by `task % len`; overrides `delay_ms` when non-empty
    #[serde(default)]
    pub delays_ms: Vec<u64>,
}

fn default_label() -> String {
    "Worker".to_string()
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            delay_ms: 0,
            delays_ms: Vec::new(),
        }
    }
}

impl TaskConfig {
    /// Delay applied to the task with the given index.
    pub fn delay_for(&self, index: usize) -> Duration {
        let ms = if self.delays_ms.is_empty() {
            self.delay_ms
        } else {
            self.delays_ms[index % self.delays_ms.len()]
        };
        Duration::from_millis(ms)
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Echo markers to stdout as they happen
    #[serde(default = "default_true")]
    pub echo: bool,

    /// Write the event journal as JSONL to this path
    #[serde(default)]
    pub events: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            echo: default_true(),
            events: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_owned(),
                source,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source: e,
        })
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runner.concurrency == Some(0) {
            return Err(ConfigError::Invalid(
                "runner.concurrency must be at least 1 (omit it for unbounded)".to_string(),
            ));
        }

        if self.task.label.trim().is_empty() {
            return Err(ConfigError::Invalid("task.label must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_for_cycles_through_list() {
        let task = TaskConfig {
            delays_ms: vec![2000, 1000],
            ..Default::default()
        };
        assert_eq!(task.delay_for(0), Duration::from_millis(2000));
        assert_eq!(task.delay_for(1), Duration::from_millis(1000));
        assert_eq!(task.delay_for(2), Duration::from_millis(2000));
    }

    #[test]
    fn delay_for_falls_back_to_fixed_delay() {
        let task = TaskConfig {
            delay_ms: 15,
            ..Default::default()
        };
        assert_eq!(task.delay_for(7), Duration::from_millis(15));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut config = Config::default();
        config.runner.concurrency = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
