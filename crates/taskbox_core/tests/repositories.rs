use rusqlite::Connection;
use taskbox_core::db::migrations::latest_version;
use taskbox_core::db::open_db_in_memory;
use taskbox_core::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use taskbox_core::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use taskbox_core::repo::time_block_repo::{SqliteTimeBlockRepository, TimeBlockRepository};
use taskbox_core::{parse_date, parse_time, Category, RepoError, Slot, Task, TaskPatch, TimeBlock};
use uuid::Uuid;

fn slot(date: &str, time: &str) -> Slot {
    Slot::new(parse_date(date).unwrap(), parse_time(time).unwrap())
}

#[test]
fn repositories_reject_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTaskRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repositories_reject_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteCategoryRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("categories"))
    ));
}

#[test]
fn category_batch_insert_is_all_or_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    let first = Category::new("One", "#111111").unwrap();
    let mut clash = Category::new("Two", "#222222").unwrap();
    clash.id = first.id;

    assert!(repo.insert_categories(&[first, clash]).is_err());
    assert_eq!(repo.count_categories().unwrap(), 0);

    repo.insert_categories(&Category::defaults()).unwrap();
    assert_eq!(repo.count_categories().unwrap(), 3);
}

#[test]
fn task_roundtrip_preserves_every_field() {
    let conn = open_db_in_memory().unwrap();
    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();

    let category = Category::new("Work", "#4dabf5").unwrap();
    categories.insert_category(&category).unwrap();
    let mut task = Task::new("ship it", Some(category.id)).unwrap();
    task.description = Some("before friday".to_string());
    task.is_urgent = true;
    tasks.insert_task(&task).unwrap();

    assert_eq!(tasks.get_task(task.id).unwrap(), Some(task.clone()));
    assert_eq!(
        categories.get_category(category.id).unwrap(),
        Some(category)
    );
}

#[test]
fn apply_patch_matches_in_memory_patch() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let mut task = Task::new("draft", None).unwrap();
    repo.insert_task(&task).unwrap();

    let patch = TaskPatch {
        title: Some("final".to_string()),
        is_archived: Some(true),
        is_important: Some(true),
        ..TaskPatch::default()
    };
    repo.apply_patch(task.id, &patch).unwrap();
    patch.apply_to(&mut task);

    assert_eq!(repo.get_task(task.id).unwrap(), Some(task));
}

#[test]
fn patch_with_unknown_category_is_rejected_by_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let task = Task::new("draft", None).unwrap();
    repo.insert_task(&task).unwrap();

    let patch = TaskPatch {
        category_id: Some(Some(Uuid::new_v4())),
        ..TaskPatch::default()
    };
    assert!(matches!(
        repo.apply_patch(task.id, &patch),
        Err(RepoError::Db(_))
    ));
}

#[test]
fn delete_missing_rows_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let blocks = SqliteTimeBlockRepository::try_new(&conn).unwrap();

    let id = Uuid::new_v4();
    assert!(matches!(
        tasks.delete_task(id),
        Err(RepoError::NotFound { entity: "task", id: missing }) if missing == id
    ));
    assert!(matches!(
        blocks.delete_time_block(id),
        Err(RepoError::NotFound {
            entity: "time block",
            ..
        })
    ));
}

#[test]
fn upsert_keeps_one_row_per_slot() {
    let conn = open_db_in_memory().unwrap();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let blocks = SqliteTimeBlockRepository::try_new(&conn).unwrap();
    let task_a = Task::new("a", None).unwrap();
    let task_b = Task::new("b", None).unwrap();
    tasks.insert_task(&task_a).unwrap();
    tasks.insert_task(&task_b).unwrap();

    let target = slot("2024-01-01", "09:00");
    blocks
        .upsert_at_slot(&TimeBlock::for_slot(task_a.id, target))
        .unwrap();
    let mut replacement = TimeBlock::for_slot(task_b.id, target);
    replacement.notes = Some("moved".to_string());
    blocks.upsert_at_slot(&replacement).unwrap();

    assert_eq!(blocks.list_time_blocks().unwrap(), vec![replacement.clone()]);
    assert_eq!(blocks.get_at_slot(target).unwrap(), Some(replacement));
    assert!(blocks
        .get_at_slot(slot("2024-01-01", "10:00"))
        .unwrap()
        .is_none());
}

#[test]
fn list_in_range_is_inclusive_and_ordered() {
    let conn = open_db_in_memory().unwrap();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let blocks = SqliteTimeBlockRepository::try_new(&conn).unwrap();
    let task = Task::new("t", None).unwrap();
    tasks.insert_task(&task).unwrap();

    for (date, time) in [
        ("2024-01-03", "10:00"),
        ("2023-12-31", "09:00"),
        ("2024-01-01", "15:00"),
        ("2024-01-01", "08:00"),
        ("2024-01-04", "08:00"),
    ] {
        blocks
            .upsert_at_slot(&TimeBlock::for_slot(task.id, slot(date, time)))
            .unwrap();
    }

    let found: Vec<Slot> = blocks
        .list_in_range(
            parse_date("2024-01-01").unwrap(),
            parse_date("2024-01-03").unwrap(),
        )
        .unwrap()
        .iter()
        .map(TimeBlock::slot)
        .collect();
    assert_eq!(
        found,
        vec![
            slot("2024-01-01", "08:00"),
            slot("2024-01-01", "15:00"),
            slot("2024-01-03", "10:00"),
        ]
    );
}

#[test]
fn malformed_persisted_rows_are_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO tasks (id, title) VALUES ('not-a-uuid', 'broken');",
    )
    .unwrap();

    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    assert!(matches!(repo.list_tasks(), Err(RepoError::InvalidData(_))));
}
