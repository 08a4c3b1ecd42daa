//! Bookmark table definition and version gate.
//!
//! # Responsibility
//! - Create the `bookmarks` table on a fresh database.
//! - Refuse databases written by a newer binary.
//! - Verify that a connection handed to the unit of work is ready.
//!
//! # Invariants
//! - There is exactly one schema version; no upgrade steps exist.
//! - `PRAGMA user_version` mirrors the applied version.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version written by this binary.
pub const SCHEMA_VERSION: u32 = 1;

/// Name of the only application table.
pub const BOOKMARKS_TABLE: &str = "bookmarks";

const CREATE_BOOKMARKS_SQL: &str = "CREATE TABLE IF NOT EXISTS bookmarks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    description TEXT
);";

/// Creates the schema when the database is fresh.
///
/// Re-applying on an already initialized database is a no-op.
pub fn apply_schema(conn: &mut Connection) -> DbResult<()> {
    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_BOOKMARKS_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;
    Ok(())
}

/// Checks that `conn` was bootstrapped with the current schema.
pub fn ensure_ready(conn: &Connection) -> DbResult<()> {
    let actual_version = schema_version(conn)?;
    if actual_version != SCHEMA_VERSION {
        return Err(DbError::UninitializedConnection {
            expected_version: SCHEMA_VERSION,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [BOOKMARKS_TABLE],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(DbError::MissingRequiredTable(BOOKMARKS_TABLE));
    }
    Ok(())
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
