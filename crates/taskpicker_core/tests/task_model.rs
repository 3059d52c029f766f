use chrono::{DateTime, NaiveDate};
use taskpicker_core::{NewTask, Priority, Task};

#[test]
fn task_serialization_uses_plain_labels_and_iso_dates() {
    let task = Task {
        id: 3,
        name: "Write report".to_string(),
        priority: Some(Priority::High),
        category: Some("Work".to_string()),
        deadline: NaiveDate::from_ymd_opt(2024, 1, 15),
        completed: false,
        created_at: DateTime::from_timestamp_millis(1_705_000_000_000).unwrap(),
    };

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["priority"], "High");
    assert_eq!(json["category"], "Work");
    assert_eq!(json["deadline"], "2024-01-15");
    assert_eq!(json["completed"], false);

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn unset_fields_serialize_as_null() {
    let task = Task {
        id: 1,
        name: "Gym".to_string(),
        priority: None,
        category: None,
        deadline: None,
        completed: true,
        created_at: DateTime::from_timestamp_millis(0).unwrap(),
    };

    let json = serde_json::to_value(&task).unwrap();
    assert!(json["priority"].is_null());
    assert!(json["category"].is_null());
    assert!(json["deadline"].is_null());
}

#[test]
fn unknown_priority_label_deserializes_as_other() {
    let priority: Priority = serde_json::from_str("\"Someday\"").unwrap();
    assert_eq!(priority, Priority::Other("Someday".to_string()));
    assert_eq!(priority.to_string(), "Someday");
}

#[test]
fn from_input_keeps_unknown_category_text() {
    let request = NewTask::from_input("Gym", Some("Medium"), Some("Fitness"), None);
    assert_eq!(request.priority, Some(Priority::Medium));
    assert_eq!(request.category.as_deref(), Some("Fitness"));
    assert!(request.validate().is_ok());
}
