use barky_core::db::schema::{ensure_ready, schema_version, SCHEMA_VERSION};
use barky_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_bookmarks_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    assert_table_exists(&conn, "bookmarks");
    ensure_ready(&conn).unwrap();
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("barky.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO bookmarks (title, url) VALUES ('kept', 'https://example.com');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), SCHEMA_VERSION);
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM bookmarks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
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
            assert_eq!(latest_supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn ensure_ready_rejects_fresh_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match ensure_ready(&conn) {
        Err(DbError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, SCHEMA_VERSION),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(()) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn ensure_ready_rejects_missing_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))
        .unwrap();

    assert!(matches!(
        ensure_ready(&conn),
        Err(DbError::MissingRequiredTable("bookmarks"))
    ));
}

#[test]
fn store_assigned_ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO bookmarks (title, url) VALUES ('a', 'https://a.example');",
        [],
    )
    .unwrap();
    let first = conn.last_insert_rowid();
    conn.execute("DELETE FROM bookmarks WHERE id = ?1;", [first])
        .unwrap();
    conn.execute(
        "INSERT INTO bookmarks (title, url) VALUES ('b', 'https://b.example');",
        [],
    )
    .unwrap();

    assert!(conn.last_insert_rowid() > first);
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
