//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted `Task` record and its creation request.
//! - Map free-form priority text onto typed labels without losing data.
//!
//! # Invariants
//! - `id` is assigned by the store exactly once and never reused.
//! - `name` is non-empty after trimming.
//! - `completed` is the only field that changes after creation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned task identifier (SQLite rowid).
pub type TaskId = i64;

/// Priority label attached to a task.
///
/// Known labels map to typed variants; anything else is kept verbatim so
/// values written under an older configuration survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
    /// Label outside the built-in set.
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Maps a stored label onto a variant. Matching is case-sensitive.
    pub fn from_label(value: &str) -> Self {
        match value {
            "High" => Self::High,
            "Medium" => Self::Medium,
            "Low" => Self::Low,
            other => Self::Other(other.to_string()),
        }
    }

    /// Parses optional user text. Blank input means "unset"; anything else
    /// is kept as entered.
    pub fn parse_optional(value: Option<&str>) -> Option<Self> {
        value
            .filter(|text| !text.trim().is_empty())
            .map(Self::from_label)
    }
}

impl FromStr for Priority {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(value))
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Priority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_label(&value))
    }
}

/// Validation failures raised at the task creation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Name is empty or whitespace-only.
    EmptyName,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "task name cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub priority: Option<Priority>,
    /// Free-form label; not checked against the configured category list.
    pub category: Option<String>,
    /// Serialized as `YYYY-MM-DD`.
    pub deadline: Option<NaiveDate>,
    pub completed: bool,
    /// Millisecond precision, set once by the store.
    pub created_at: DateTime<Utc>,
}

/// Creation request for a task; the store fills in identity and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub deadline: Option<NaiveDate>,
}

impl NewTask {
    /// Builds a request with only a name; all optional fields unset.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builds a request from raw caller text.
    ///
    /// Blank priority/category text is treated as unset. Non-blank text,
    /// including the name, is kept verbatim so exact-match lookups see
    /// exactly what the caller entered; a blank name is rejected by
    /// `validate`.
    pub fn from_input(
        name: &str,
        priority: Option<&str>,
        category: Option<&str>,
        deadline: Option<NaiveDate>,
    ) -> Self {
        let category = category
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string);

        Self {
            name: name.to_string(),
            priority: Priority::parse_optional(priority),
            category,
            deadline,
        }
    }

    /// Checks creation-boundary invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.name.trim().is_empty() {
            return Err(TaskValidationError::EmptyName);
        }
        Ok(())
    }
}
