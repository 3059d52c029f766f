//! Tracker configuration.
//!
//! # Responsibility
//! - Load category/priority lists and storage/logging locations from TOML.
//! - Provide defaults for every field so a missing file is not an error.
//!
//! # Invariants
//! - Configured lists never contain blank or duplicate entries.
//! - `"All"` is reserved as the category filter sentinel.
//! - Configured lists drive presentation only; the store never rejects
//!   values outside them.

use crate::service::task_service::ALL_CATEGORIES;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE_FILE: &str = "taskpicker.db";
const DEFAULT_CATEGORIES: [&str; 5] = ["Work", "Personal", "Study", "Health", "Other"];
const DEFAULT_PRIORITIES: [&str; 3] = ["High", "Medium", "Low"];

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Category choices offered to users, in display order.
    pub categories: Vec<String>,
    /// Priority choices offered to users, in display order.
    pub priorities: Vec<String>,
    pub database_path: PathBuf,
    /// Falls back to `default_log_level()` when unset.
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            priorities: DEFAULT_PRIORITIES.iter().map(|p| p.to_string()).collect(),
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_level: None,
            log_dir: None,
        }
    }
}

impl TrackerConfig {
    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks list invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_labels("categories", &self.categories)?;
        validate_labels("priorities", &self.priorities)?;
        if self.categories.iter().any(|c| c == ALL_CATEGORIES) {
            return Err(ConfigError::Invalid(format!(
                "`{ALL_CATEGORIES}` is reserved and cannot be used as a category"
            )));
        }
        Ok(())
    }

    /// Category filter choices: the `"All"` sentinel followed by categories.
    pub fn category_filter_options(&self) -> Vec<String> {
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(self.categories.iter().cloned())
            .collect()
    }

    pub fn is_known_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn is_known_priority(&self, priority: &str) -> bool {
        self.priorities.iter().any(|p| p == priority)
    }
}

/// Loads configuration from `path`.
///
/// A missing file yields defaults. An unreadable, malformed or invalid file
/// is an error rather than a silent fallback.
pub fn load_config(path: impl AsRef<Path>) -> Result<TrackerConfig, ConfigError> {
    let path = path.as_ref();
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!("event=config_load module=config status=ok source=default");
            return Ok(TrackerConfig::default());
        }
        Err(source) => {
            warn!("event=config_load module=config status=error error_code=config_read_failed");
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let config: TrackerConfig = toml::from_str(&text).map_err(|source| {
        warn!("event=config_load module=config status=error error_code=config_parse_failed");
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    config.validate()?;

    info!(
        "event=config_load module=config status=ok source=file categories={} priorities={}",
        config.categories.len(),
        config.priorities.len()
    );
    Ok(config)
}

fn validate_labels(field: &str, labels: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for label in labels {
        if label.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{field} contains a blank entry")));
        }
        if !seen.insert(label.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "{field} contains duplicate entry `{label}`"
            )));
        }
    }
    Ok(())
}
