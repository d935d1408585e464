//! Replicated user profiles and the contributor projection.

pub mod queries;

pub use queries::UserQueries;

use chrono::{DateTime, Utc};
use serde_json::Value;
use url::Url;

/// A replicated user record.
///
/// `osm_data` and `tags` are opaque documents owned by the upstream
/// dataset; rows are replaced wholesale on import, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub osm_data: Value,
    pub tags: Value,
    pub updated_at: DateTime<Utc>,
}

/// Read-only projection backing the contributor list.
///
/// `changes` counts non-automated edit events attributed to the user;
/// `tips` is the lightning address extracted from the profile
/// description, or empty.
#[derive(Debug, Clone, PartialEq)]
pub struct UserListItem {
    pub id: i64,
    pub image: Option<Url>,
    pub name: String,
    pub tips: String,
    pub changes: i64,
}
