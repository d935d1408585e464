//! Prepared-statement operations on the `user` table.

use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::sync::LazyLock;

use super::{User, UserListItem};
use crate::storage::{decode, StorageError, StoragePool};

/// First parenthesised `(lightning:...)` token in a profile description.
static LIGHTNING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(lightning:[^)]*\)").expect("valid pattern"));

/// Query object owning all statements against the `user` table.
#[derive(Clone)]
pub struct UserQueries {
    pool: StoragePool,
}

impl UserQueries {
    pub fn new(pool: StoragePool) -> Self {
        Self { pool }
    }

    /// Upsert a single user, replacing all columns.
    pub fn insert_or_replace(&self, user: &User) -> Result<(), StorageError> {
        let conn = self.pool.get()?;
        insert_row(&conn, user)?;
        Ok(())
    }

    /// Upsert a batch of users in one transaction.
    ///
    /// All-or-nothing: any failure rolls the whole batch back. The error
    /// is not surfaced to the caller; it is recorded on the diagnostic
    /// log only, and rollback guarantees storage is unchanged.
    pub fn insert_or_replace_batch(&self, users: &[User]) {
        if let Err(e) = self.try_insert_batch(users) {
            tracing::error!(error = %e, count = users.len(), "User batch upsert rolled back");
        }
    }

    fn try_insert_batch(&self, users: &[User]) -> Result<(), StorageError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for user in users {
            insert_row(&tx, user)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Contributor projection, most active first.
    ///
    /// Automated events (tags document carries an `automated` key) are
    /// excluded from the count. Ties are broken by ascending id.
    pub fn select_all(&self) -> Result<Vec<UserListItem>, StorageError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                u.id AS id,
                json_extract(u.osm_data, '$.img.href') AS image,
                json_extract(u.osm_data, '$.display_name') AS name,
                json_extract(u.osm_data, '$.description') AS description,
                count(e.user_id) AS changes
            FROM user u
            LEFT JOIN event e ON e.user_id = u.id AND json_extract(e.tags, '$.automated') IS NULL
            GROUP BY u.id
            ORDER BY changes DESC, u.id ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(UserListItem {
                    id: row.get(0)?,
                    image: decode::url_or_null(row, 1)?,
                    name: decode::text_or(row, 2, "")?,
                    tips: lightning_tip(&decode::text_or(row, 3, "")?),
                    changes: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Point lookup by id. A missing row is `None`, not an error.
    pub fn select_by_id(&self, id: i64) -> Result<Option<User>, StorageError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, osm_data, tags, updated_at FROM user WHERE id = ?1",
                params![id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        osm_data: decode::json_object(row, 1)?,
                        tags: decode::json_object(row, 2)?,
                        updated_at: decode::datetime(row, 3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Most recent `updated_at` across all rows, or `None` when empty.
    pub fn select_max_updated_at(&self) -> Result<Option<chrono::DateTime<chrono::Utc>>, StorageError> {
        let conn = self.pool.get()?;
        let max = conn.query_row("SELECT max(updated_at) FROM user", [], |row| {
            decode::datetime_or_null(row, 0)
        })?;
        Ok(max)
    }

    pub fn select_count(&self) -> Result<i64, StorageError> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT count(*) FROM user", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a row if present; a no-op when absent.
    pub fn delete_by_id(&self, id: i64) -> Result<(), StorageError> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM user WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn insert_row(conn: &Connection, user: &User) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT OR REPLACE
        INTO user (
            id,
            osm_data,
            tags,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4)
        "#,
        params![
            user.id,
            user.osm_data.to_string(),
            user.tags.to_string(),
            decode::encode_datetime(user.updated_at),
        ],
    )?;
    Ok(())
}

/// Extract the first `(lightning:...)` token from a description,
/// parentheses stripped. Empty string when absent. The payment
/// identifier's internal syntax is not validated.
fn lightning_tip(description: &str) -> String {
    LIGHTNING_TOKEN
        .find(description)
        .map(|m| m.as_str().trim_matches(|c| c == '(' || c == ')').to_string())
        .unwrap_or_default()
}
