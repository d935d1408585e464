//! Singleton-row persistence for the configuration value.

use rusqlite::{params, OptionalExtension};

use super::Conf;
use crate::storage::{StorageError, StoragePool};

/// The configuration lives in exactly one row.
const CONF_ROW_ID: i64 = 1;

/// Query object owning the statements against the `conf` table.
#[derive(Clone)]
pub struct ConfQueries {
    pool: StoragePool,
}

impl ConfQueries {
    pub fn new(pool: StoragePool) -> Self {
        Self { pool }
    }

    /// Load the persisted configuration, or `None` if never written.
    ///
    /// A stored row that fails to deserialize is a fatal decode error:
    /// writers only ever store the serialized `Conf`.
    pub fn select(&self) -> Result<Option<Conf>, StorageError> {
        let conn = self.pool.get()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT json FROM conf WHERE id = ?1",
                params![CONF_ROW_ID],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            None => Ok(None),
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        }
    }

    /// Write the configuration, replacing any previous value.
    pub fn insert_or_replace(&self, conf: &Conf) -> Result<(), StorageError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR REPLACE INTO conf (id, json) VALUES (?1, ?2)",
            params![CONF_ROW_ID, serde_json::to_string(conf)?],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn test_pool() -> (TempDir, StoragePool) {
        let temp_dir = TempDir::new().unwrap();
        let pool = StoragePool::open(temp_dir.path().join("test.db"), 4).unwrap();
        (temp_dir, pool)
    }

    #[test]
    fn test_select_empty_is_none() {
        let (_dir, pool) = test_pool();
        let queries = ConfQueries::new(pool);
        assert!(queries.select().unwrap().is_none());
    }

    #[test]
    fn test_roundtrip() {
        let (_dir, pool) = test_pool();
        let queries = ConfQueries::new(pool);

        let conf = Conf {
            last_sync_date: Some(Utc::now()),
            show_atms: true,
            ..Conf::default()
        };
        queries.insert_or_replace(&conf).unwrap();

        assert_eq!(queries.select().unwrap().unwrap(), conf);
    }

    #[test]
    fn test_replaces_previous_value() {
        let (_dir, pool) = test_pool();
        let queries = ConfQueries::new(pool.clone());

        queries.insert_or_replace(&Conf::default()).unwrap();
        queries
            .insert_or_replace(&Conf {
                show_sync_summary: true,
                ..Conf::default()
            })
            .unwrap();

        let count: i64 = pool
            .get()
            .unwrap()
            .query_row("SELECT count(*) FROM conf", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert!(queries.select().unwrap().unwrap().show_sync_summary);
    }
}
