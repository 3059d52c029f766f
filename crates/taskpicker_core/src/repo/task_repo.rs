//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/query/toggle APIs over the `tasks` table.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Every mutation is a single SQL statement, so a crash leaves either the
//!   full change or the prior state.
//! - Read paths reject invalid persisted state instead of masking it.
//! - List results are ordered by ascending `id`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::task::{NewTask, Priority, Task, TaskId, TaskValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    name,
    priority,
    deadline,
    category,
    completed,
    created_at
FROM tasks";

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Lookup key used when a task could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKey {
    Id(TaskId),
    Name(String),
}

impl Display for TaskKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
            Self::Name(name) => write!(f, "name=`{name}`"),
        }
    }
}

/// Generic repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskKey),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "task not found: {key}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing tasks.
///
/// `None` fields do not filter. Category matching is exact and
/// case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub category: Option<String>,
    pub completed: Option<bool>,
}

impl TaskListQuery {
    /// Only tasks with `completed = false`.
    pub fn incomplete() -> Self {
        Self {
            completed: Some(false),
            ..Self::default()
        }
    }

    /// Only tasks whose category equals `category`.
    pub fn in_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }
}

/// Aggregate task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: u64,
    pub completed: u64,
}

impl TaskStats {
    pub fn incomplete(&self) -> u64 {
        self.total - self.completed
    }
}

/// Repository interface for task persistence.
pub trait TaskRepository {
    /// Inserts a task stamped with `created_at` and returns the stored record.
    fn create_task(&self, task: &NewTask, created_at: DateTime<Utc>) -> RepoResult<Task>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Flips `completed` on every task named exactly `name`.
    ///
    /// Returns the new status of the lowest-id match.
    fn toggle_completion_by_name(&self, name: &str) -> RepoResult<bool>;
    fn toggle_completion_by_id(&self, id: TaskId) -> RepoResult<bool>;
    fn task_stats(&self) -> RepoResult<TaskStats>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection after checking it was migrated to the latest schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    /// Wraps a connection already returned by `db::open_db*`.
    pub(crate) fn from_migrated(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &NewTask, created_at: DateTime<Utc>) -> RepoResult<Task> {
        task.validate()?;

        let created_at_ms = created_at.timestamp_millis();
        let name = task.name.as_str();

        self.conn.execute(
            "INSERT INTO tasks (
                name,
                priority,
                deadline,
                category,
                completed,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, 0, ?5);",
            params![
                name,
                task.priority.as_ref().map(Priority::as_str),
                task.deadline.map(deadline_to_db),
                task.category.as_deref(),
                created_at_ms,
            ],
        )?;

        Ok(Task {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            priority: task.priority.clone(),
            category: task.category.clone(),
            deadline: task.deadline,
            completed: false,
            created_at: timestamp_from_db(created_at_ms)?,
        })
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(category) = query.category.as_ref() {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.clone()));
        }

        if let Some(completed) = query.completed {
            sql.push_str(" AND completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }

        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn toggle_completion_by_name(&self, name: &str) -> RepoResult<bool> {
        let mut stmt = self.conn.prepare(
            "UPDATE tasks
             SET completed = 1 - completed
             WHERE name = ?1
             RETURNING id, completed;",
        )?;

        let updated = stmt
            .query_map([name], |row| {
                Ok((row.get::<_, TaskId>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let Some((_, completed)) = updated.into_iter().min_by_key(|(id, _)| *id) else {
            return Err(RepoError::NotFound(TaskKey::Name(name.to_string())));
        };

        completed_from_db(completed)
    }

    fn toggle_completion_by_id(&self, id: TaskId) -> RepoResult<bool> {
        let completed = self
            .conn
            .query_row(
                "UPDATE tasks
                 SET completed = 1 - completed
                 WHERE id = ?1
                 RETURNING completed;",
                [id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match completed {
            Some(value) => completed_from_db(value),
            None => Err(RepoError::NotFound(TaskKey::Id(id))),
        }
    }

    fn task_stats(&self) -> RepoResult<TaskStats> {
        let (total, completed) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(completed), 0) FROM tasks;",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;

        let to_count = |value: i64, column: &str| {
            u64::try_from(value).map_err(|_| {
                RepoError::InvalidData(format!("negative {column} count `{value}`"))
            })
        };

        Ok(TaskStats {
            total: to_count(total, "total")?,
            completed: to_count(completed, "completed")?,
        })
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;

    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty name in tasks.name for id={id}"
        )));
    }

    let deadline = match row.get::<_, Option<String>>("deadline")? {
        Some(value) => Some(deadline_from_db(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid deadline `{value}` in tasks.deadline for id={id}"
            ))
        })?),
        None => None,
    };

    Ok(Task {
        id,
        name,
        priority: row
            .get::<_, Option<String>>("priority")?
            .map(|value| Priority::from_label(&value)),
        category: row.get("category")?,
        deadline,
        completed: completed_from_db(row.get("completed")?)?,
        created_at: timestamp_from_db(row.get("created_at")?)?,
    })
}

fn deadline_to_db(date: NaiveDate) -> String {
    date.format(DEADLINE_FORMAT).to_string()
}

fn deadline_from_db(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DEADLINE_FORMAT).ok()
}

fn timestamp_from_db(epoch_ms: i64) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(epoch_ms).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "out-of-range created_at value `{epoch_ms}` in tasks.created_at"
        ))
    })
}

fn completed_from_db(value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid completed value `{other}` in tasks.completed"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{completed_from_db, deadline_from_db, deadline_to_db, RepoError};
    use chrono::NaiveDate;

    #[test]
    fn deadline_uses_iso_calendar_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(deadline_to_db(date), "2024-01-05");
        assert_eq!(deadline_from_db("2024-01-05"), Some(date));
        assert_eq!(deadline_from_db("01/05/2024"), None);
        assert_eq!(deadline_from_db("2024-01-05T10:00:00"), None);
    }

    #[test]
    fn completed_from_db_rejects_unknown_flags() {
        assert!(!completed_from_db(0).unwrap());
        assert!(completed_from_db(1).unwrap());
        assert!(matches!(
            completed_from_db(7),
            Err(RepoError::InvalidData(_))
        ));
    }
}
