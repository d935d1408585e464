//! Prepared-statement operations on the `event` table.

use rusqlite::{params, Connection, TransactionBehavior};

use super::Event;
use crate::storage::{decode, StorageError, StoragePool};

/// Query object owning all statements against the `event` table.
#[derive(Clone)]
pub struct EventQueries {
    pool: StoragePool,
}

impl EventQueries {
    pub fn new(pool: StoragePool) -> Self {
        Self { pool }
    }

    /// Upsert a single event, replacing all columns.
    pub fn insert_or_replace(&self, event: &Event) -> Result<(), StorageError> {
        let conn = self.pool.get()?;
        insert_row(&conn, event)?;
        Ok(())
    }

    /// Upsert a batch of events in one transaction.
    ///
    /// All-or-nothing; failures roll back, are logged, and are not
    /// surfaced to the caller.
    pub fn insert_or_replace_batch(&self, events: &[Event]) {
        if let Err(e) = self.try_insert_batch(events) {
            tracing::error!(error = %e, count = events.len(), "Event batch upsert rolled back");
        }
    }

    fn try_insert_batch(&self, events: &[Event]) -> Result<(), StorageError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for event in events {
            insert_row(&tx, event)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Events attributed to one user, newest first.
    pub fn select_by_user_id(&self, user_id: i64) -> Result<Vec<Event>, StorageError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, element_id, type, tags, created_at
            FROM event
            WHERE user_id = ?1
            ORDER BY created_at DESC
            "#,
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(Event {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    element_id: row.get(2)?,
                    event_type: row.get(3)?,
                    tags: decode::json_object(row, 4)?,
                    created_at: decode::datetime(row, 5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn select_count(&self) -> Result<i64, StorageError> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT count(*) FROM event", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a row if present; a no-op when absent.
    pub fn delete_by_id(&self, id: i64) -> Result<(), StorageError> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM event WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn insert_row(conn: &Connection, event: &Event) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT OR REPLACE
        INTO event (
            id,
            user_id,
            element_id,
            type,
            tags,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            event.id,
            event.user_id,
            event.element_id,
            event.event_type,
            event.tags.to_string(),
            decode::encode_datetime(event.created_at),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    fn test_pool() -> (TempDir, StoragePool) {
        let temp_dir = TempDir::new().unwrap();
        let pool = StoragePool::open(temp_dir.path().join("test.db"), 4).unwrap();
        (temp_dir, pool)
    }

    fn test_event(id: i64, user_id: i64, created_at: chrono::DateTime<Utc>) -> Event {
        Event {
            id,
            user_id,
            element_id: "node:1".to_string(),
            event_type: "create".to_string(),
            tags: json!({}),
            created_at,
        }
    }

    #[test]
    fn test_select_by_user_id_newest_first() {
        let (_dir, pool) = test_pool();
        let queries = EventQueries::new(pool);

        let now = Utc::now();
        queries
            .insert_or_replace_batch(&[
                test_event(1, 7, now - Duration::hours(2)),
                test_event(2, 7, now),
                test_event(3, 8, now),
            ]);

        let events = queries.select_by_user_id(7).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, 2);
        assert_eq!(events[1].id, 1);
    }

    #[test]
    fn test_delete_by_id() {
        let (_dir, pool) = test_pool();
        let queries = EventQueries::new(pool);

        queries
            .insert_or_replace(&test_event(1, 7, Utc::now()))
            .unwrap();
        queries.delete_by_id(1).unwrap();
        queries.delete_by_id(1).unwrap();

        assert_eq!(queries.select_count().unwrap(), 0);
    }
}
