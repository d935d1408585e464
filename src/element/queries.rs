//! Prepared-statement operations on the `element` table.

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::Element;
use crate::storage::{decode, StorageError, StoragePool};

/// Query object owning all statements against the `element` table.
#[derive(Clone)]
pub struct ElementQueries {
    pool: StoragePool,
}

impl ElementQueries {
    pub fn new(pool: StoragePool) -> Self {
        Self { pool }
    }

    /// Upsert a single element, replacing all columns.
    pub fn insert_or_replace(&self, element: &Element) -> Result<(), StorageError> {
        let conn = self.pool.get()?;
        insert_row(&conn, element)?;
        Ok(())
    }

    /// Upsert a batch of elements in one transaction.
    ///
    /// All-or-nothing; failures roll back, are logged, and are not
    /// surfaced to the caller.
    pub fn insert_or_replace_batch(&self, elements: &[Element]) {
        if let Err(e) = self.try_insert_batch(elements) {
            tracing::error!(error = %e, count = elements.len(), "Element batch upsert rolled back");
        }
    }

    fn try_insert_batch(&self, elements: &[Element]) -> Result<(), StorageError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for element in elements {
            insert_row(&tx, element)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Point lookup by id. A missing row is `None`, not an error.
    pub fn select_by_id(&self, id: &str) -> Result<Option<Element>, StorageError> {
        let conn = self.pool.get()?;
        let element = conn
            .query_row(
                "SELECT id, osm_json, tags, updated_at FROM element WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Element {
                        id: row.get(0)?,
                        osm_json: decode::json_object(row, 1)?,
                        tags: decode::json_object(row, 2)?,
                        updated_at: decode::datetime(row, 3)?,
                    })
                },
            )
            .optional()?;
        Ok(element)
    }

    /// Elements within a bounding box, positions read from the OSM
    /// document's `lat`/`lon` fields.
    pub fn select_in_bounds(
        &self,
        north_lat: f64,
        east_lon: f64,
        south_lat: f64,
        west_lon: f64,
    ) -> Result<Vec<Element>, StorageError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, osm_json, tags, updated_at
            FROM element
            WHERE json_extract(osm_json, '$.lat') BETWEEN ?1 AND ?2
              AND json_extract(osm_json, '$.lon') BETWEEN ?3 AND ?4
            "#,
        )?;
        let rows = stmt
            .query_map(params![south_lat, north_lat, west_lon, east_lon], |row| {
                Ok(Element {
                    id: row.get(0)?,
                    osm_json: decode::json_object(row, 1)?,
                    tags: decode::json_object(row, 2)?,
                    updated_at: decode::datetime(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Most recent `updated_at` across all rows, or `None` when empty.
    pub fn select_max_updated_at(&self) -> Result<Option<chrono::DateTime<chrono::Utc>>, StorageError> {
        let conn = self.pool.get()?;
        let max = conn.query_row("SELECT max(updated_at) FROM element", [], |row| {
            decode::datetime_or_null(row, 0)
        })?;
        Ok(max)
    }

    pub fn select_count(&self) -> Result<i64, StorageError> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT count(*) FROM element", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a row if present; a no-op when absent.
    pub fn delete_by_id(&self, id: &str) -> Result<(), StorageError> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM element WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn insert_row(conn: &Connection, element: &Element) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT OR REPLACE
        INTO element (
            id,
            osm_json,
            tags,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4)
        "#,
        params![
            element.id,
            element.osm_json.to_string(),
            element.tags.to_string(),
            decode::encode_datetime(element.updated_at),
        ],
    )?;
    Ok(())
}
