//! Task use-case service.
//!
//! # Responsibility
//! - Provide the add/list/toggle/pick entry points for core callers.
//! - Emit metadata-only diagnostic events for each use case.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.
//! - Random pick never mutates task state.
//! - Logged fields never include task names or categories.

use crate::model::task::{NewTask, Task, TaskId};
use crate::repo::task_repo::{RepoError, RepoResult, TaskListQuery, TaskRepository, TaskStats};
use chrono::Utc;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;

/// Category filter value that disables filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Use-case service wrapper for task operations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a task stamped with the current time.
    ///
    /// # Errors
    /// - `RepoError::Validation` when the name is blank; nothing is written.
    pub fn add_task(&self, task: &NewTask) -> RepoResult<Task> {
        match self.repo.create_task(task, Utc::now()) {
            Ok(created) => {
                info!(
                    "event=task_create module=service status=ok task_id={} has_deadline={}",
                    created.id,
                    created.deadline.is_some()
                );
                Ok(created)
            }
            Err(RepoError::Validation(err)) => {
                warn!("event=task_create module=service status=rejected reason={err}");
                Err(RepoError::Validation(err))
            }
            Err(err) => {
                warn!("event=task_create module=service status=error error={err}");
                Err(err)
            }
        }
    }

    /// Lists tasks in ascending id order.
    ///
    /// `None` or the `"All"` sentinel returns every task; any other value is
    /// an exact, case-sensitive category match.
    pub fn get_tasks(&self, filter_category: Option<&str>) -> RepoResult<Vec<Task>> {
        let query = match filter_category {
            None | Some(ALL_CATEGORIES) => TaskListQuery::default(),
            Some(category) => TaskListQuery::in_category(category),
        };
        let tasks = self.repo.list_tasks(&query)?;
        debug!(
            "event=task_list module=service status=ok filtered={} count={}",
            query.category.is_some(),
            tasks.len()
        );
        Ok(tasks)
    }

    /// Lists tasks with an explicit query.
    pub fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(query)
    }

    /// Gets one task by id.
    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    /// Flips completion on every task named exactly `name`.
    ///
    /// Tasks sharing a name all flip together. Use
    /// [`TaskService::toggle_completion_by_id`] to address a single task.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when no task has this name.
    pub fn toggle_completion(&self, name: &str) -> RepoResult<bool> {
        let result = self.repo.toggle_completion_by_name(name);
        log_toggle("name", &result);
        result
    }

    /// Flips completion on the single task with `id`.
    pub fn toggle_completion_by_id(&self, id: TaskId) -> RepoResult<bool> {
        let result = self.repo.toggle_completion_by_id(id);
        log_toggle("id", &result);
        result
    }

    /// Picks a uniformly random incomplete task using the thread RNG.
    ///
    /// Returns `Ok(None)` when there is nothing left to do.
    pub fn pick_random_incomplete(&self) -> RepoResult<Option<Task>> {
        self.pick_random_incomplete_with(&mut rand::thread_rng())
    }

    /// Picks a uniformly random incomplete task using `rng`.
    pub fn pick_random_incomplete_with<G: Rng + ?Sized>(
        &self,
        rng: &mut G,
    ) -> RepoResult<Option<Task>> {
        let pool = self.repo.list_tasks(&TaskListQuery::incomplete())?;
        let picked = pool.choose(rng).cloned();
        info!(
            "event=task_pick module=service status=ok pool_size={} picked={}",
            pool.len(),
            picked.as_ref().map_or_else(|| "none".to_string(), |task| task.id.to_string())
        );
        Ok(picked)
    }

    /// Returns total and completed task counts.
    pub fn stats(&self) -> RepoResult<TaskStats> {
        self.repo.task_stats()
    }
}

fn log_toggle(key: &str, result: &RepoResult<bool>) {
    match result {
        Ok(completed) => info!(
            "event=task_toggle module=service status=ok key={key} completed={completed}"
        ),
        Err(RepoError::NotFound(_)) => {
            warn!("event=task_toggle module=service status=not_found key={key}")
        }
        Err(err) => warn!("event=task_toggle module=service status=error key={key} error={err}"),
    }
}
