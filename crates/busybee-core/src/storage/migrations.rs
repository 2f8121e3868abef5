//! Database schema migrations for busybee.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current schema
/// version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// v1: base schema.
///
/// Items carry the shared identity of events and tasks; the subtype tables
/// key on the item id. Category links are shared by both kinds through
/// `item_categories`.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS items (
            id         TEXT PRIMARY KEY,
            kind       TEXT NOT NULL,
            name       TEXT NOT NULL,
            notes      TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recurrences (
            id        TEXT PRIMARY KEY,
            frequency TEXT NOT NULL,
            times     INTEGER NOT NULL CHECK (times >= 1)
        );

        CREATE TABLE IF NOT EXISTS events (
            item_id       TEXT PRIMARY KEY REFERENCES items(id),
            place         TEXT,
            start_time    TEXT NOT NULL,
            recurrence_id TEXT REFERENCES recurrences(id)
        );

        CREATE TABLE IF NOT EXISTS tasks (
            item_id  TEXT PRIMARY KEY REFERENCES items(id),
            complete INTEGER NOT NULL DEFAULT 0,
            priority TEXT NOT NULL DEFAULT 'LOW',
            due_date TEXT
        );

        CREATE TABLE IF NOT EXISTS categories (
            id         TEXT PRIMARY KEY,
            name       TEXT NOT NULL,
            color_hex  TEXT NOT NULL DEFAULT 'FFFFFF',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS item_categories (
            item_id     TEXT NOT NULL REFERENCES items(id),
            category_id TEXT NOT NULL REFERENCES categories(id),
            PRIMARY KEY (item_id, category_id)
        );

        CREATE INDEX IF NOT EXISTS idx_events_start_time ON events(start_time);
        CREATE INDEX IF NOT EXISTS idx_events_recurrence ON events(recurrence_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);",
    )?;

    set_schema_version(conn, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_sets_version_and_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 1);
        // A second run must not fail or alter the version.
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 1);
    }

    #[test]
    fn schema_rejects_zero_occurrence_recurrences() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO recurrences (id, frequency, times) VALUES ('r1', 'DAILY', 0)",
            [],
        );
        assert!(result.is_err());
    }
}
