//! Core task-tracking logic for Task Picker.
//! This crate is the single source of truth for task invariants; any UI or
//! CLI is a thin caller over [`TaskStore`].

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{load_config, ConfigError, TrackerConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::task::{NewTask, Priority, Task, TaskId, TaskValidationError};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskKey, TaskListQuery, TaskRepository,
    TaskStats,
};
pub use service::task_service::{TaskService, ALL_CATEGORIES};
pub use store::TaskStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
