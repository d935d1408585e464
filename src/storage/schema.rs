//! Schema definition and connection pragmas.
//!
//! One table per replicated entity plus the singleton configuration row.
//! JSON documents are stored as text; timestamps are stored as RFC 3339
//! UTC text so that lexical order equals chronological order.

use rusqlite::Connection;
use std::time::Duration;

/// Full schema, applied idempotently on pool creation.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS element (
    id TEXT NOT NULL PRIMARY KEY,
    osm_json TEXT NOT NULL,
    tags TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user (
    id INTEGER NOT NULL PRIMARY KEY,
    osm_data TEXT NOT NULL,
    tags TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS event (
    id INTEGER NOT NULL PRIMARY KEY,
    user_id INTEGER NOT NULL,
    element_id TEXT NOT NULL,
    type TEXT NOT NULL,
    tags TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS event_user_id ON event (user_id);

CREATE TABLE IF NOT EXISTS conf (
    id INTEGER NOT NULL PRIMARY KEY,
    json TEXT NOT NULL
);
"#;

/// Create all tables if they don't exist yet.
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

/// Apply per-connection pragmas.
///
/// WAL keeps concurrent readers unblocked while a batch transaction
/// commits; the busy timeout covers writer contention between the
/// configuration store and entity imports sharing the pool.
pub fn apply_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    // journal_mode returns a result row, so pragma_update can't be used
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(Duration::from_millis(5_000))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name IN ('element', 'user', 'event', 'conf')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 4);
    }
}
