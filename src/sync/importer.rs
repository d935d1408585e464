//! Snapshot document import.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::element::{Element, ElementQueries};
use crate::event::{Event, EventQueries};
use crate::user::{User, UserQueries};

/// Importer collaborator boundary.
///
/// Consumes a parsed snapshot document and performs the entity
/// upserts. Treated as atomic by the orchestrator: it either reports
/// success or failure for the whole document.
pub trait DataImporter: Send + Sync {
    fn import(&self, doc: &Value) -> Result<()>;
}

/// Production importer for full-dataset snapshot documents.
///
/// The document is a JSON object with optional `elements`, `users`,
/// and `events` arrays whose entries mirror the table columns. Unknown
/// top-level keys are ignored; each entity array is upserted as one
/// batch.
pub struct SnapshotImporter {
    elements: ElementQueries,
    users: UserQueries,
    events: EventQueries,
}

impl SnapshotImporter {
    pub fn new(elements: ElementQueries, users: UserQueries, events: EventQueries) -> Self {
        Self {
            elements,
            users,
            events,
        }
    }
}

impl DataImporter for SnapshotImporter {
    fn import(&self, doc: &Value) -> Result<()> {
        if !doc.is_object() {
            bail!("snapshot document is not a JSON object");
        }
        let doc: SnapshotDoc =
            serde_json::from_value(doc.clone()).context("malformed snapshot document")?;

        let elements: Vec<Element> = doc
            .elements
            .into_iter()
            .map(|row| Element {
                id: row.id,
                osm_json: row.osm_json,
                tags: row.tags,
                updated_at: row.updated_at,
            })
            .collect();
        let users: Vec<User> = doc
            .users
            .into_iter()
            .map(|row| User {
                id: row.id,
                osm_data: row.osm_data,
                tags: row.tags,
                updated_at: row.updated_at,
            })
            .collect();
        let events: Vec<Event> = doc
            .events
            .into_iter()
            .map(|row| Event {
                id: row.id,
                user_id: row.user_id,
                element_id: row.element_id,
                event_type: row.event_type,
                tags: row.tags,
                created_at: row.created_at,
            })
            .collect();

        tracing::debug!(
            elements = elements.len(),
            users = users.len(),
            events = events.len(),
            "Importing snapshot"
        );

        self.elements.insert_or_replace_batch(&elements);
        self.users.insert_or_replace_batch(&users);
        self.events.insert_or_replace_batch(&events);

        Ok(())
    }
}

#[derive(Deserialize)]
struct SnapshotDoc {
    #[serde(default)]
    elements: Vec<ElementRow>,
    #[serde(default)]
    users: Vec<UserRow>,
    #[serde(default)]
    events: Vec<EventRow>,
}

#[derive(Deserialize)]
struct ElementRow {
    id: String,
    osm_json: Value,
    #[serde(default = "empty_object")]
    tags: Value,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct UserRow {
    id: i64,
    osm_data: Value,
    #[serde(default = "empty_object")]
    tags: Value,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct EventRow {
    id: i64,
    user_id: i64,
    element_id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default = "empty_object")]
    tags: Value,
    created_at: DateTime<Utc>,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
