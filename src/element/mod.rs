//! Replicated map elements (places), the core of the dataset.

pub mod queries;

pub use queries::ElementQueries;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A replicated place. Ids are upstream identifiers like `node:42`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    pub osm_json: Value,
    pub tags: Value,
    pub updated_at: DateTime<Utc>,
}
