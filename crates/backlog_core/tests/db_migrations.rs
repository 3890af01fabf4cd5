use backlog_core::db::migrations::latest_version;
use backlog_core::db::{open_db, open_db_in_memory, open_db_with_config, DbError};
use backlog_core::CoreConfig;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "projects",
        "backlogs",
        "sprints",
        "boards",
        "epics",
        "user_stories",
        "sprint_items",
        "board_columns",
        "board_cards",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn every_ordered_table_has_a_scope_position_unique_index() {
    let conn = open_db_in_memory().unwrap();

    for (table, index) in [
        ("epics", "ux_epics_backlog_position"),
        ("user_stories", "ux_user_stories_epic_position"),
        ("sprint_items", "ux_sprint_items_sprint_position"),
        ("board_columns", "ux_board_columns_board_position"),
        ("board_cards", "ux_board_cards_column_position"),
    ] {
        let unique: i64 = conn
            .query_row(
                &format!("SELECT \"unique\" FROM pragma_index_list('{table}') WHERE name = ?1;"),
                [index],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(unique, 1, "index {index} on {table} must be unique");
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backlog.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "epics");
}

#[test]
fn open_with_config_uses_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.db");
    let config = CoreConfig {
        db_path: Some(path.clone()),
        busy_timeout_ms: 100,
        ..CoreConfig::default()
    };

    let conn = open_db_with_config(&config).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(path.exists());

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_migration_reports_version_and_keeps_database_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conflict.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE epics (legacy TEXT);").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match &err {
        DbError::MigrationFailed { version, name, .. } => {
            assert_eq!(*version, 1);
            assert_eq!(*name, "0001_init");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("0001_init"));

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);
    let projects: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'projects';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(projects, 0);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
