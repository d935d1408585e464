//! Configuration parsing for the Waypoint CLI.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Sensible defaults for quick start

use clap::Parser;
use std::path::PathBuf;

/// Waypoint: a local-first replica of a crowd-sourced places dataset.
#[derive(Parser, Debug, Clone)]
#[command(name = "waypoint")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Data directory for the SQLite replica
    #[arg(short, long, env = "WAYPOINT_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Override the primary snapshot URL
    #[arg(long, env = "WAYPOINT_DATA_URL")]
    pub data_url: Option<String>,

    /// Override the mirror snapshot URL
    #[arg(long, env = "WAYPOINT_MIRROR_URL")]
    pub mirror_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Size of the storage connection pool
    #[arg(long, env = "WAYPOINT_POOL_SIZE", default_value_t = 8)]
    pub pool_size: u32,

    /// Timeout for a single snapshot fetch, in seconds
    #[arg(long, env = "WAYPOINT_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            data_url: None,
            mirror_url: None,
            log_level: "info".into(),
            pool_size: 8,
            http_timeout_secs: 30,
        }
    }
}
