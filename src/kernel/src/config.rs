//! Simulator configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file)
//! gives the stock behaviour: overwrite on re-create, periodic timers re-armed
//! from the firing instant, host file system rooted at the working directory.

use std::path::{Path, PathBuf};

use rtsim_common::{Result, SimError};
use serde::Deserialize;

use crate::fs::FsBackend;
use crate::registry::CreatePolicy;
use crate::sync::DEFAULT_INITIAL_COUNT;
use crate::task::{Priority, DEFAULT_PRIORITY};
use crate::timer::{RearmPolicy, TimerKind};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Defaults for optional keyword arguments.
    pub defaults: Defaults,
    /// Registry behaviour.
    pub registry: RegistryConfig,
    /// Timer behaviour.
    pub timer: TimerConfig,
    /// File keyword backend.
    pub fs: FsConfig,
    /// Console logging.
    pub log: LogConfig,
}

/// Defaults for optional keyword arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    /// `create_task` priority.
    pub task_priority: Priority,
    /// `create_semaphore` initial count.
    pub semaphore_count: i64,
    /// `create_timer` type.
    pub timer_kind: TimerKind,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            task_priority: DEFAULT_PRIORITY,
            semaphore_count: DEFAULT_INITIAL_COUNT,
            timer_kind: TimerKind::OneShot,
        }
    }
}

/// Registry behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// What re-creating an existing name does.
    pub create_policy: CreatePolicy,
}

/// Timer behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimerConfig {
    /// Where a periodic timer's next period starts.
    pub rearm: RearmPolicy,
}

/// File keyword backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FsConfig {
    /// Host or RAM.
    pub backend: FsBackend,
    /// Root directory for the host backend.
    pub root: PathBuf,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            backend: FsBackend::Host,
            root: PathBuf::from("."),
        }
    }
}

/// Console logging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
        }
    }
}

impl LogConfig {
    /// Parsed level filter.
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level
            .parse()
            .map_err(|_| SimError::InvalidArgument(format!("unknown log level '{}'", self.level)))
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| SimError::InvalidArgument(e.to_string()))?;
        config.log.level_filter()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SimError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }
}
