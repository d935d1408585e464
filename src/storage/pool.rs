//! Shared connection pool for all storage access.
//!
//! One pool is shared by the configuration store and every entity query
//! object. SQLite WAL mode allows concurrent readers; writers serialize
//! on the engine's own locking with a busy timeout.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use thiserror::Error;

use super::schema::{apply_pragmas, initialize_schema};

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create connection pool: {0}")]
    PoolCreation(#[from] r2d2::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Stored JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Shared read-write connection pool.
///
/// Cloning is cheap; clones share the same underlying pool.
#[derive(Clone)]
pub struct StoragePool {
    pool: Pool<SqliteConnectionManager>,
}

impl StoragePool {
    /// Open (or create) the database at `db_path` and build the pool.
    ///
    /// The schema is applied before the pool is handed out, so every
    /// connection sees fully created tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or the schema
    /// cannot be applied.
    pub fn open<P: AsRef<Path>>(db_path: P, max_size: u32) -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::file(db_path);

        let pool = Pool::builder()
            .max_size(max_size)
            .connection_customizer(Box::new(StorageConnectionCustomizer))
            .build(manager)?;

        let conn = pool.get()?;
        initialize_schema(&conn)?;

        Ok(Self { pool })
    }

    /// Get a connection from the pool.
    pub fn get(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        Ok(self.pool.get()?)
    }
}

/// Connection customizer that applies the standard pragmas.
#[derive(Debug)]
struct StorageConnectionCustomizer;

impl r2d2::CustomizeConnection<rusqlite::Connection, rusqlite::Error>
    for StorageConnectionCustomizer
{
    fn on_acquire(&self, conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
        apply_pragmas(conn)
    }
}
