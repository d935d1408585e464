//! Logging infrastructure.
//!
//! Structured tracing with environment-based filtering.

pub mod tracing;
