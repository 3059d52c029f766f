use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use taskpicker_core::db::migrations::latest_version;
use taskpicker_core::db::open_db_in_memory;
use taskpicker_core::{
    NewTask, Priority, RepoError, SqliteTaskRepository, TaskKey, TaskListQuery, TaskRepository,
    TaskService, TaskValidationError,
};

fn fixed_time() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_705_000_000_123).unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let request = NewTask {
        name: "Write report".to_string(),
        priority: Some(Priority::High),
        category: Some("Work".to_string()),
        deadline: NaiveDate::from_ymd_opt(2024, 1, 15),
    };
    let created = repo.create_task(&request, fixed_time()).unwrap();

    assert_eq!(created.id, 1);
    assert!(!created.completed);
    assert_eq!(created.created_at, fixed_time());

    let loaded = repo.get_task(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn get_missing_task_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    assert!(repo.get_task(42).unwrap().is_none());
}

#[test]
fn create_stores_name_verbatim_and_raw_date_text() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut request = NewTask::named("  Gym  ");
    request.deadline = NaiveDate::from_ymd_opt(2024, 3, 9);
    let created = repo.create_task(&request, fixed_time()).unwrap();
    assert_eq!(created.name, "  Gym  ");

    let (name, deadline): (String, String) = conn
        .query_row(
            "SELECT name, deadline FROM tasks WHERE id = ?1;",
            [created.id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(name, "  Gym  ");
    assert_eq!(deadline, "2024-03-09");
}

#[test]
fn create_rejects_blank_name_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let err = repo
        .create_task(&NewTask::named("   "), fixed_time())
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::EmptyName)
    ));
    assert_eq!(repo.task_stats().unwrap().total, 0);
}

#[test]
fn unknown_priority_and_category_survive_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let request = NewTask {
        name: "Legacy".to_string(),
        priority: Some(Priority::Other("Urgent".to_string())),
        category: Some("Errands".to_string()),
        deadline: None,
    };
    let created = repo.create_task(&request, fixed_time()).unwrap();
    let loaded = repo.get_task(created.id).unwrap().unwrap();

    assert_eq!(loaded.priority, Some(Priority::Other("Urgent".to_string())));
    assert_eq!(loaded.category.as_deref(), Some("Errands"));
}

#[test]
fn list_filters_by_category_and_completion_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    for (name, category) in [("a", "Work"), ("b", "Home"), ("c", "Work"), ("d", "work")] {
        let mut request = NewTask::named(name);
        request.category = Some(category.to_string());
        repo.create_task(&request, fixed_time()).unwrap();
    }
    repo.toggle_completion_by_name("c").unwrap();

    let work: Vec<_> = repo
        .list_tasks(&TaskListQuery::in_category("Work"))
        .unwrap()
        .into_iter()
        .map(|task| task.name)
        .collect();
    assert_eq!(work, vec!["a", "c"]);

    let open_work = TaskListQuery {
        category: Some("Work".to_string()),
        completed: Some(false),
    };
    let open_work: Vec<_> = repo
        .list_tasks(&open_work)
        .unwrap()
        .into_iter()
        .map(|task| task.name)
        .collect();
    assert_eq!(open_work, vec!["a"]);

    let incomplete = repo.list_tasks(&TaskListQuery::incomplete()).unwrap();
    assert_eq!(incomplete.len(), 3);
    assert!(incomplete.windows(2).all(|pair| pair[0].id < pair[1].id));
}

#[test]
fn toggle_by_name_flips_every_match_and_reports_lowest_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let first = repo
        .create_task(&NewTask::named("Gym"), fixed_time())
        .unwrap();
    let second = repo
        .create_task(&NewTask::named("Gym"), fixed_time())
        .unwrap();
    repo.toggle_completion_by_id(second.id).unwrap();

    // Mixed states: each row flips independently.
    let status = repo.toggle_completion_by_name("Gym").unwrap();
    assert!(status);
    assert!(repo.get_task(first.id).unwrap().unwrap().completed);
    assert!(!repo.get_task(second.id).unwrap().unwrap().completed);
}

#[test]
fn toggle_unknown_name_or_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    repo.create_task(&NewTask::named("Gym"), fixed_time())
        .unwrap();

    let err = repo.toggle_completion_by_name("gym").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(TaskKey::Name(name)) if name == "gym"));

    let err = repo.toggle_completion_by_id(99).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(TaskKey::Id(99))));
}

#[test]
fn stats_count_total_and_completed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    assert_eq!(repo.task_stats().unwrap().total, 0);

    for name in ["a", "b", "c"] {
        repo.create_task(&NewTask::named(name), fixed_time())
            .unwrap();
    }
    repo.toggle_completion_by_name("b").unwrap();

    let stats = repo.task_stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.incomplete(), 2);
}

#[test]
fn read_rejects_malformed_deadline() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO tasks (name, deadline, created_at) VALUES ('bad', '15/01/2024', 0);",
        [],
    )
    .unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let err = repo.list_tasks(&TaskListQuery::default()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let service = TaskService::new(repo);

    let created = service.add_task(&NewTask::named("from service")).unwrap();
    let fetched = service.get_task(created.id).unwrap().unwrap();
    assert_eq!(fetched.name, "from service");
    assert!(service.toggle_completion_by_id(created.id).unwrap());
    assert!(service.pick_random_incomplete().unwrap().is_none());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteTaskRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}
