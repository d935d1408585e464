//! Replicated edit events, joined against users for the contributor
//! projection.

pub mod queries;

pub use queries::EventQueries;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A replicated edit event.
///
/// An event whose `tags` document carries an `automated` key was
/// produced by a bot and is excluded from contributor counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: i64,
    pub user_id: i64,
    pub element_id: String,
    pub event_type: String,
    pub tags: Value,
    pub created_at: DateTime<Utc>,
}
