//! Task store facade with an explicit storage lifecycle.
//!
//! # Responsibility
//! - Own the SQLite connection for one storage location.
//! - Expose the task operations to presentation layers without leaking
//!   repository or connection types.
//!
//! # Invariants
//! - A `TaskStore` only exists for a fully migrated connection.
//! - The connection is released when the store is dropped or closed,
//!   including on error paths.

use crate::config::TrackerConfig;
use crate::db::{open_db, open_db_in_memory, DbError, DbResult};
use crate::model::task::{NewTask, Task, TaskId};
use crate::repo::task_repo::{RepoResult, SqliteTaskRepository, TaskListQuery, TaskStats};
use crate::service::task_service::TaskService;
use chrono::NaiveDate;
use log::info;
use rand::Rng;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Durable task collection bound to one SQLite database.
pub struct TaskStore {
    conn: Connection,
    location: Option<PathBuf>,
}

impl TaskStore {
    /// Opens (or creates) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = open_db(path)?;
        Ok(Self {
            conn,
            location: Some(path.to_path_buf()),
        })
    }

    /// Opens a throwaway store that lives as long as the value.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
            location: None,
        })
    }

    /// Opens the store at the configured database path.
    pub fn open_with_config(config: &TrackerConfig) -> DbResult<Self> {
        Self::open(&config.database_path)
    }

    /// Backing file, or `None` for in-memory stores.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Closes the connection and reports any error from doing so.
    ///
    /// Dropping the store also closes it, but silently.
    pub fn close(self) -> DbResult<()> {
        let location = self.location;
        self.conn.close().map_err(|(_, err)| DbError::Sqlite(err))?;
        info!(
            "event=db_close module=store status=ok mode={}",
            if location.is_some() { "file" } else { "memory" }
        );
        Ok(())
    }

    /// Adds a task from raw caller input.
    ///
    /// Text is stored as entered; blank priority or category text is stored
    /// as unset. Category values outside the configured list are accepted.
    pub fn add_task(
        &self,
        name: &str,
        priority: Option<&str>,
        category: Option<&str>,
        deadline: Option<NaiveDate>,
    ) -> RepoResult<Task> {
        self.insert(&NewTask::from_input(name, priority, category, deadline))
    }

    /// Adds a task from a prepared request.
    pub fn insert(&self, task: &NewTask) -> RepoResult<Task> {
        self.service().add_task(task)
    }

    /// Returns tasks in insertion order, optionally filtered by category.
    pub fn get_tasks(&self, filter_category: Option<&str>) -> RepoResult<Vec<Task>> {
        self.service().get_tasks(filter_category)
    }

    /// Lists tasks matching every set field of `query`, in ascending id order.
    ///
    /// Unlike `get_tasks`, `"All"` has no special meaning here.
    pub fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        self.service().list_tasks(query)
    }

    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.service().get_task(id)
    }

    /// Flips completion on every task named exactly `name`.
    pub fn toggle_completion(&self, name: &str) -> RepoResult<bool> {
        self.service().toggle_completion(name)
    }

    /// Flips completion on exactly one task.
    pub fn toggle_completion_by_id(&self, id: TaskId) -> RepoResult<bool> {
        self.service().toggle_completion_by_id(id)
    }

    /// Uniform random pick among incomplete tasks; `None` when there are none.
    pub fn pick_random_incomplete(&self) -> RepoResult<Option<Task>> {
        self.service().pick_random_incomplete()
    }

    pub fn pick_random_incomplete_with<G: Rng + ?Sized>(
        &self,
        rng: &mut G,
    ) -> RepoResult<Option<Task>> {
        self.service().pick_random_incomplete_with(rng)
    }

    pub fn stats(&self) -> RepoResult<TaskStats> {
        self.service().stats()
    }

    fn service(&self) -> TaskService<SqliteTaskRepository<'_>> {
        TaskService::new(SqliteTaskRepository::from_migrated(&self.conn))
    }
}
