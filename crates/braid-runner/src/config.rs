//! Run configuration loading.
//!
//! A run is configured through `braid-config.yaml`. The structs here give
//! that file a typed shape and [`RunConfig::from_file`] reads it. Sections
//! this module does not model are skipped during deserialization, which
//! leaves room in the same file for application settings such as model
//! parameters.

use std::path::Path;

use serde::Deserialize;

use braid_core::time::{Duration, Time};

use crate::runner::RunBounds;

/// What can go wrong while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the file from disk failed.
    #[error("could not read configuration file: {source}")]
    Io {
        /// Error reported by the filesystem.
        #[from]
        source: std::io::Error,
    },

    /// The file's contents did not deserialize.
    #[error("configuration is not valid YAML: {source}")]
    Yaml {
        /// Error reported by the YAML parser.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Typed view of `braid-config.yaml`.
///
/// Every field has a default, so an empty document (or a missing file
/// handled by the caller) yields a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Stopping rules for the run.
    #[serde(default)]
    pub run: RunSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl RunConfig {
    /// Read and deserialize the configuration at `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read;
    /// [`ConfigError::Yaml`] when its contents do not deserialize.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Deserialize a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Yaml`] when the text does not deserialize.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// The run bounds this configuration describes.
    ///
    /// `max_steps: 0` means unbounded, matching the YAML convention for
    /// "no limit". `until_time` is a raw tick count placed on the time
    /// line through [`Time::EPOCH`], never through a wall clock.
    pub fn bounds(&self) -> RunBounds {
        RunBounds {
            max_steps: (self.run.max_steps > 0).then_some(self.run.max_steps),
            until: self
                .run
                .until_time
                .map(|tick| Time::EPOCH.after(Duration::new(tick))),
        }
    }
}

/// Stopping rules, as written in the `run` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunSection {
    /// Maximum number of firings before the run stops (0 = unbounded).
    #[serde(default)]
    pub max_steps: u64,

    /// Inclusive tick horizon; occurrences scheduled later than this tick
    /// never fire. Absent means no horizon.
    #[serde(default)]
    pub until_time: Option<i64>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}
