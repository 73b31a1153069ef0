use pocketplan_core::db::migrations::{apply_migrations, latest_version};
use pocketplan_core::db::{open_db, open_db_in_memory, DbError};
use pocketplan_core::{NewExpense, Store, Table};
use rusqlite::Connection;

#[test]
fn fresh_database_has_every_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    let tables = schema_objects(&conn, "table");
    for table in Table::ALL {
        assert!(tables.iter().any(|name| name == table.name()), "missing {}", table.name());
    }
}

#[test]
fn lookup_indexes_exist() {
    let conn = open_db_in_memory().unwrap();
    let indexes = schema_objects(&conn, "index");

    for index in [
        "idx_expenses_category_id",
        "idx_expenses_date",
        "idx_tasks_project_id",
        "idx_tasks_completed",
        "idx_tasks_due_date",
        "idx_tasks_sort_order",
    ] {
        assert!(indexes.iter().any(|name| name == index), "missing {index}");
    }
}

#[test]
fn reopening_a_file_keeps_rows_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pocketplan.db");

    let store = Store::open(&path).unwrap();
    let expenses = pocketplan_core::ExpenseService::new(&store);
    let id = expenses
        .add(&NewExpense {
            category_id: 1,
            amount: 120.0,
            note: "lunch".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 2)
                .unwrap()
                .and_hms_opt(13, 0, 0)
                .unwrap(),
        })
        .unwrap();
    drop(expenses);
    drop(store);

    let reopened = Store::open(&path).unwrap();
    assert_eq!(schema_version(reopened.connection()), latest_version());
    let loaded = pocketplan_core::ExpenseService::new(&reopened)
        .get(id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.note, "lunch");
}

#[test]
fn a_database_from_a_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .pragma_update(None, "user_version", 999)
        .unwrap();

    let Err(DbError::UnsupportedSchemaVersion { found, supported }) = open_db(&path) else {
        panic!("newer schema should be refused");
    };
    assert_eq!(found, 999);
    assert_eq!(supported, latest_version());
}

#[test]
fn migrating_a_current_schema_runs_no_steps() {
    let mut conn = open_db_in_memory().unwrap();
    assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap()
}

fn schema_objects(conn: &Connection, kind: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = ?1 ORDER BY name;")
        .unwrap();
    stmt.query_map([kind], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}
