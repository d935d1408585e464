//! Waypoint: a local-first replica of a crowd-sourced places dataset.
//!
//! The replica stays usable offline and converges with the remote
//! authoritative source opportunistically: a primary endpoint, a
//! mirror fallback, and a bundled baseline snapshot for bootstrap.
//!
//! # Modules
//!
//! - [`conf`]: Reactive configuration store with write-through persistence
//! - [`config`]: CLI and environment configuration
//! - [`element`]: Replicated places
//! - [`event`]: Replicated edit events
//! - [`observability`]: Tracing setup
//! - [`storage`]: SQLite pool, schema, and typed column decoding
//! - [`sync`]: Sync orchestrator and snapshot importer
//! - [`user`]: Replicated user profiles and the contributor projection

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions,    // user::queries::UserQueries is fine
    clippy::must_use_candidate,         // Not all functions need #[must_use]
    clippy::missing_errors_doc,         // Error docs can be verbose
    clippy::needless_raw_string_hashes, // r#""# is fine for SQL
    clippy::struct_excessive_bools      // Conf carries feature toggles
)]

pub mod conf;
pub mod config;
pub mod element;
pub mod event;
pub mod observability;
pub mod storage;
pub mod sync;
pub mod user;
