use habitgrid_core::db::open_db_in_memory;
use habitgrid_core::{
    CompletionDate, CompletionService, ErrorKind, HabitId, HabitPatch, HabitService,
    HabitServiceError, SqliteCompletionRepository, SqliteHabitRepository, DEFAULT_HABITS,
};
use rusqlite::Connection;

fn habit_service(conn: &Connection) -> HabitService<SqliteHabitRepository<'_>> {
    HabitService::new(SqliteHabitRepository::try_new(conn).unwrap())
}

fn completion_service(conn: &Connection) -> CompletionService<SqliteCompletionRepository<'_>> {
    CompletionService::new(SqliteCompletionRepository::try_new(conn).unwrap())
}

fn date(value: &str) -> CompletionDate {
    CompletionDate::parse(value).unwrap()
}

#[test]
fn add_habit_to_empty_registry_lists_exactly_that_habit() {
    let conn = open_db_in_memory().unwrap();
    let habits = habit_service(&conn);

    let created = habits
        .add_habit("Drink Water", Some("droplet"), Some("blue"))
        .unwrap();
    assert!(!created.id.as_str().is_empty());
    assert_eq!(created.name, "Drink Water");

    let listed = habits.list_habits().unwrap();
    assert_eq!(listed, vec![created]);
}

#[test]
fn add_habit_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let habits = habit_service(&conn);

    let err = habits.add_habit("   ", None, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(habits.list_habits().unwrap().is_empty());
}

#[test]
fn new_habit_is_immediately_a_valid_completion_target() {
    let conn = open_db_in_memory().unwrap();
    let created = habit_service(&conn).add_habit("Read", None, None).unwrap();

    let outcome = completion_service(&conn)
        .toggle_completion(&created.id, date("2024-01-10"))
        .unwrap();
    assert!(outcome.completed);
}

#[test]
fn list_preserves_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let habits = habit_service(&conn);
    for name in ["Zebra", "Apple", "Mango"] {
        habits.add_habit(name, None, None).unwrap();
    }

    let names: Vec<String> = habits
        .list_habits()
        .unwrap()
        .into_iter()
        .map(|habit| habit.name)
        .collect();
    assert_eq!(names, vec!["Zebra", "Apple", "Mango"]);
}

#[test]
fn edit_habit_patches_only_given_fields() {
    let conn = open_db_in_memory().unwrap();
    let habits = habit_service(&conn);
    let created = habits
        .add_habit("Exercise", Some("dumbbell"), Some("green"))
        .unwrap();

    let edited = habits
        .edit_habit(
            &created.id,
            &HabitPatch {
                color: Some("red".to_string()),
                ..HabitPatch::default()
            },
        )
        .unwrap();
    assert_eq!(edited.id, created.id);
    assert_eq!(edited.name, "Exercise");
    assert_eq!(edited.icon.as_deref(), Some("dumbbell"));
    assert_eq!(edited.color.as_deref(), Some("red"));

    let stored = habits.get_habit(&created.id).unwrap().unwrap();
    assert_eq!(stored, edited);
}

#[test]
fn edit_habit_rejects_blank_name_and_unknown_id() {
    let conn = open_db_in_memory().unwrap();
    let habits = habit_service(&conn);
    let created = habits.add_habit("Read", None, None).unwrap();

    let err = habits
        .edit_habit(
            &created.id,
            &HabitPatch {
                name: Some("  ".to_string()),
                ..HabitPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, HabitServiceError::Validation(_)));
    assert_eq!(habits.get_habit(&created.id).unwrap().unwrap().name, "Read");

    let missing = HabitId::parse("missing").unwrap();
    let err = habits
        .edit_habit(&missing, &HabitPatch::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn delete_habit_cascades_every_completion() {
    let conn = open_db_in_memory().unwrap();
    let habits = habit_service(&conn);
    let ledger = completion_service(&conn);
    let doomed = habits.add_habit("Drink Water", None, None).unwrap();
    let kept = habits.add_habit("Read", None, None).unwrap();

    for day in ["2024-01-08", "2024-01-09", "2024-01-10"] {
        ledger.toggle_completion(&doomed.id, date(day)).unwrap();
    }
    ledger.toggle_completion(&kept.id, date("2024-01-10")).unwrap();

    habits.delete_habit(&doomed.id).unwrap();

    let listed = habits.list_habits().unwrap();
    assert_eq!(listed, vec![kept.clone()]);
    let history = ledger.all_completions().unwrap();
    assert!(history.values().all(|ids| !ids.contains(&doomed.id)));
    assert!(history[&date("2024-01-10")].contains(&kept.id));

    let orphaned: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM completions WHERE habit_id = ?1;",
            [doomed.id.as_str()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[test]
fn deleting_twice_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let habits = habit_service(&conn);
    let created = habits.add_habit("Read", None, None).unwrap();

    habits.delete_habit(&created.id).unwrap();
    let err = habits.delete_habit(&created.id).unwrap_err();
    assert!(matches!(err, HabitServiceError::NotFound(_)));
}

#[test]
fn delete_habit_without_completions_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let habits = habit_service(&conn);
    let created = habits.add_habit("Read", None, None).unwrap();

    habits.delete_habit(&created.id).unwrap();
    assert!(habits.list_habits().unwrap().is_empty());
}

#[test]
fn deleted_id_is_not_reused_by_new_habits() {
    let conn = open_db_in_memory().unwrap();
    let habits = habit_service(&conn);
    let first = habits.add_habit("Read", None, None).unwrap();
    habits.delete_habit(&first.id).unwrap();

    let second = habits.add_habit("Read", None, None).unwrap();
    assert_ne!(first.id, second.id);
}

#[test]
fn seed_default_habits_only_fills_empty_registry() {
    let conn = open_db_in_memory().unwrap();
    let habits = habit_service(&conn);

    let seeded = habits.seed_default_habits().unwrap();
    assert_eq!(seeded.len(), DEFAULT_HABITS.len());
    assert_eq!(seeded[0].name, "Drink Water");
    assert_eq!(seeded[2].icon.as_deref(), Some("book-open"));

    assert!(habits.seed_default_habits().unwrap().is_empty());
    assert_eq!(habits.list_habits().unwrap().len(), DEFAULT_HABITS.len());
}
