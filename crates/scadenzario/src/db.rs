//! SQLite setup for the key-value backend
//!
//! This module handles:
//! - Opening the database file
//! - Applying the embedded schema migrations exactly once

use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Embedded migrations, applied in order. Versions are recorded in `schema_migrations`.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial_schema",
    include_str!("../db/migrations/001_initial_schema.sql"),
)];

/// Open the database at the given path, running any pending migrations
pub fn init_db(db_path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    prepare(&conn)?;
    Ok(conn)
}

/// Open a private in-memory database with the schema applied
#[cfg(test)]
pub fn init_memory_db() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    prepare(&conn)?;
    Ok(conn)
}

fn prepare(conn: &Connection) -> rusqlite::Result<()> {
    let count = run_migrations(conn)?;
    if count > 0 {
        info!(count = count, "Applied migrations");
    }
    Ok(())
}

/// Run pending migrations, returning how many were applied
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY NOT NULL,
            applied_at TEXT NOT NULL
        );",
    )?;

    let mut applied = 0;

    for &(version, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
            [version],
            |row| row.get(0),
        )?;

        if already_applied {
            continue;
        }

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, datetime('now'))",
            [version],
        )?;
        tx.commit()?;

        debug!(version = %version, "Applied migration");
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_init_db_creates_tables() {
        let temp_dir = TempDir::new().unwrap();
        let conn = init_db(&temp_dir.path().join("test.db")).unwrap();

        assert!(table_exists(&conn, "kv"));
        assert!(table_exists(&conn, "schema_migrations"));
    }

    #[test]
    fn test_init_db_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let conn1 = init_db(&db_path).unwrap();
        conn1
            .execute("INSERT INTO kv (key, value) VALUES ('k', 'v')", [])
            .unwrap();
        drop(conn1);

        // Reopening must not re-run the schema or lose data
        let conn2 = init_db(&db_path).unwrap();
        assert_eq!(run_migrations(&conn2).unwrap(), 0);

        let value: String = conn2
            .query_row("SELECT value FROM kv WHERE key = 'k'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, "v");
    }

    #[test]
    fn test_migrations_recorded() {
        let conn = init_memory_db().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count as usize, MIGRATIONS.len());
    }

    #[test]
    fn test_init_db_bad_path() {
        let result = init_db(Path::new("/nonexistent/dir/test.db"));
        assert!(result.is_err());
    }
}
