use chrono::{NaiveDate, NaiveTime};
use taskbox_core::{
    parse_date, parse_time, ModelValidationError, Slot, StoreError, TaskPatch, TaskStore,
};
use uuid::Uuid;

fn ready_store() -> TaskStore {
    let mut store = TaskStore::open_in_memory().unwrap();
    store.init_data().unwrap();
    store
}

fn date(value: &str) -> NaiveDate {
    parse_date(value).unwrap()
}

fn time(value: &str) -> NaiveTime {
    parse_time(value).unwrap()
}

#[test]
fn init_data_seeds_default_categories_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskbox.db");

    let mut store = TaskStore::open(&path).unwrap();
    store.init_data().unwrap();
    let names: Vec<_> = store.categories().iter().map(|c| c.name.clone()).collect();
    assert_eq!(names, vec!["Home", "Study", "Work"]);
    drop(store);

    let mut reopened = TaskStore::open(&path).unwrap();
    assert!(reopened.categories().is_empty());
    reopened.init_data().unwrap();
    assert_eq!(reopened.categories().len(), 3);
}

#[test]
fn add_task_trims_title_and_starts_with_all_flags_false() {
    let mut store = ready_store();

    let id = store.add_task("  write report  ", None).unwrap().unwrap();

    assert_eq!(store.tasks().len(), 1);
    let task = store.task(id).unwrap();
    assert_eq!(task.title, "write report");
    assert!(!task.is_completed);
    assert!(!task.is_urgent);
    assert!(!task.is_important);
    assert!(task.category_id.is_none());
}

#[test]
fn add_task_with_blank_title_is_a_no_op() {
    let mut store = ready_store();
    store.add_task("kept", None).unwrap();

    assert_eq!(store.add_task("", None).unwrap(), None);
    assert_eq!(store.add_task("   ", None).unwrap(), None);
    assert_eq!(store.tasks().len(), 1);
}

#[test]
fn add_task_with_category_links_it() {
    let mut store = ready_store();
    let category_id = store.categories()[0].id;

    let id = store.add_task("groceries", Some(category_id)).unwrap().unwrap();
    assert_eq!(store.task(id).unwrap().category_id, Some(category_id));
}

#[test]
fn tasks_are_listed_newest_first() {
    let mut store = ready_store();
    let first = store.add_task("first", None).unwrap().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = store.add_task("second", None).unwrap().unwrap();

    let ids: Vec<_> = store.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![second, first]);
}

#[test]
fn toggle_writes_negation_of_caller_belief() {
    let mut store = ready_store();
    let id = store.add_task("toggle me", None).unwrap().unwrap();

    store.toggle_task_completion(id, false).unwrap();
    assert!(store.task(id).unwrap().is_completed);

    // Stale belief: the stored value is already true, the write is still `!false`.
    store.toggle_task_completion(id, false).unwrap();
    assert!(store.task(id).unwrap().is_completed);

    store.toggle_task_completion(id, true).unwrap();
    assert!(!store.task(id).unwrap().is_completed);
}

#[test]
fn toggle_unknown_task_fails_and_keeps_cache() {
    let mut store = ready_store();
    store.add_task("only", None).unwrap();
    let before = store.snapshot();

    let missing = Uuid::new_v4();
    let err = store.toggle_task_completion(missing, false).unwrap_err();
    assert!(matches!(err, StoreError::TaskNotFound(id) if id == missing));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn update_task_applies_partial_fields_and_clears_category() {
    let mut store = ready_store();
    let category_id = store.categories()[1].id;
    let id = store.add_task("plan", Some(category_id)).unwrap().unwrap();

    let patch = TaskPatch {
        is_urgent: Some(true),
        is_important: Some(true),
        description: Some(Some("quarterly".to_string())),
        ..TaskPatch::default()
    };
    store.update_task(id, &patch).unwrap();
    let task = store.task(id).unwrap();
    assert!(task.is_urgent && task.is_important);
    assert_eq!(task.description.as_deref(), Some("quarterly"));
    assert_eq!(task.category_id, Some(category_id));
    assert_eq!(task.title, "plan");

    let clear = TaskPatch {
        category_id: Some(None),
        description: Some(None),
        ..TaskPatch::default()
    };
    store.update_task(id, &clear).unwrap();
    let task = store.task(id).unwrap();
    assert!(task.category_id.is_none());
    assert!(task.description.is_none());
    assert!(task.is_urgent);
}

#[test]
fn update_unknown_task_reports_not_found() {
    let mut store = ready_store();
    let patch = TaskPatch {
        title: Some("x".to_string()),
        ..TaskPatch::default()
    };
    assert!(matches!(
        store.update_task(Uuid::new_v4(), &patch),
        Err(StoreError::TaskNotFound(_))
    ));
    assert!(matches!(
        store.update_task(Uuid::new_v4(), &TaskPatch::default()),
        Err(StoreError::TaskNotFound(_))
    ));
}

#[test]
fn assign_creates_exactly_one_block_with_zero_length() {
    let mut store = ready_store();
    let id = store.add_task("deep work", None).unwrap().unwrap();

    let block_id = store
        .assign_task_to_time(id, time("09:00"), date("2024-01-01"))
        .unwrap();

    let slot = Slot::new(date("2024-01-01"), time("09:00"));
    let at_slot: Vec<_> = store
        .time_blocks()
        .iter()
        .filter(|b| b.slot() == slot)
        .collect();
    assert_eq!(at_slot.len(), 1);
    assert_eq!(at_slot[0].id, block_id);
    assert_eq!(at_slot[0].task_id, id);
    assert_eq!(at_slot[0].end_time, at_slot[0].start_time);
}

#[test]
fn assigning_occupied_slot_replaces_previous_block() {
    let mut store = ready_store();
    let task_a = store.add_task("A", None).unwrap().unwrap();
    let task_b = store.add_task("B", None).unwrap().unwrap();
    let slot = Slot::new(date("2024-01-01"), time("09:00"));

    let first = store
        .assign_task_to_time(task_a, slot.start_time, slot.date)
        .unwrap();
    let second = store
        .assign_task_to_time(task_b, slot.start_time, slot.date)
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(store.time_blocks().len(), 1);
    let block = store.state().block_at(slot).unwrap();
    assert_eq!(block.id, second);
    assert_eq!(block.task_id, task_b);
    assert!(store.time_blocks().iter().all(|b| b.id != first));
}

#[test]
fn same_time_on_different_dates_are_separate_slots() {
    let mut store = ready_store();
    let id = store.add_task("standup", None).unwrap().unwrap();

    store
        .assign_task_to_time(id, time("10:00"), date("2024-01-01"))
        .unwrap();
    store
        .assign_task_to_time(id, time("10:00"), date("2024-01-02"))
        .unwrap();

    assert_eq!(store.time_blocks().len(), 2);
}

#[test]
fn add_task_with_unknown_category_is_rejected() {
    let mut store = ready_store();
    let missing = Uuid::new_v4();

    let err = store.add_task("x", Some(missing)).unwrap_err();
    assert!(matches!(err, StoreError::CategoryNotFound(id) if id == missing));
    assert_eq!(err.to_string(), format!("category not found: {missing}"));
    assert!(store.tasks().is_empty());
}

#[test]
fn update_task_with_unknown_category_is_rejected() {
    let mut store = ready_store();
    let category_id = store.categories()[0].id;
    let id = store.add_task("x", Some(category_id)).unwrap().unwrap();
    let missing = Uuid::new_v4();

    let patch = TaskPatch {
        title: Some("renamed".to_string()),
        category_id: Some(Some(missing)),
        ..TaskPatch::default()
    };
    let err = store.update_task(id, &patch).unwrap_err();
    assert!(matches!(err, StoreError::CategoryNotFound(found) if found == missing));

    let task = store.task(id).unwrap();
    assert_eq!(task.title, "x");
    assert_eq!(task.category_id, Some(category_id));
}

#[test]
fn assign_requires_a_whole_hour() {
    let mut store = ready_store();
    let id = store.add_task("review", None).unwrap().unwrap();

    let err = store
        .assign_task_to_time(id, time("09:30"), date("2024-01-01"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ModelValidationError::NotOnTheHour(ref value)) if value == "09:30"
    ));
    assert!(store.time_blocks().is_empty());
}

#[test]
fn assign_unknown_task_is_rejected_without_writing() {
    let mut store = ready_store();
    let err = store
        .assign_task_to_time(Uuid::new_v4(), time("09:00"), date("2024-01-01"))
        .unwrap_err();
    assert!(matches!(err, StoreError::TaskNotFound(_)));
    assert!(store.time_blocks().is_empty());
}

#[test]
fn delete_task_removes_its_blocks_only() {
    let mut store = ready_store();
    let doomed = store.add_task("doomed", None).unwrap().unwrap();
    let kept = store.add_task("kept", None).unwrap().unwrap();
    store
        .assign_task_to_time(doomed, time("09:00"), date("2024-01-01"))
        .unwrap();
    store
        .assign_task_to_time(doomed, time("10:00"), date("2024-01-01"))
        .unwrap();
    store
        .assign_task_to_time(kept, time("11:00"), date("2024-01-01"))
        .unwrap();

    store.delete_task(doomed).unwrap();

    assert!(store.task(doomed).is_none());
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.time_blocks().len(), 1);
    assert_eq!(store.time_blocks()[0].task_id, kept);
}

#[test]
fn remove_from_schedule_deletes_one_block() {
    let mut store = ready_store();
    let id = store.add_task("read", None).unwrap().unwrap();
    let block_id = store
        .assign_task_to_time(id, time("20:00"), date("2024-01-01"))
        .unwrap();
    store
        .assign_task_to_time(id, time("21:00"), date("2024-01-01"))
        .unwrap();

    store.remove_from_schedule(block_id).unwrap();
    assert_eq!(store.time_blocks().len(), 1);
    assert!(store.task(id).is_some());

    let err = store.remove_from_schedule(block_id).unwrap_err();
    assert!(matches!(err, StoreError::BlockNotFound(id) if id == block_id));
}

#[test]
fn add_category_validates_input() {
    let mut store = ready_store();
    let id = store.add_category("Errands", "#ff8800").unwrap();
    assert_eq!(store.category(id).unwrap().name, "Errands");
    assert_eq!(store.categories().len(), 4);

    assert!(matches!(
        store.add_category("Bad", "orange"),
        Err(StoreError::Validation(_))
    ));
    assert_eq!(store.categories().len(), 4);
}

#[test]
fn fetch_reloads_changes_made_behind_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskbox.db");
    let mut writer = TaskStore::open(&path).unwrap();
    let mut reader = TaskStore::open(&path).unwrap();
    writer.init_data().unwrap();
    reader.init_data().unwrap();

    writer.add_task("from writer", None).unwrap();
    assert!(reader.tasks().is_empty());
    assert_eq!(reader.fetch_tasks().unwrap().len(), 1);
}
