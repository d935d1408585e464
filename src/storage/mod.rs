//! SQLite storage layer for Waypoint.
//!
//! Provides:
//! - Schema initialization and per-connection pragmas
//! - Shared connection pool used by every query object
//! - Typed column decoding for stored JSON/scalar columns

pub mod decode;
pub mod pool;
pub mod schema;

pub use pool::{StorageError, StoragePool};
