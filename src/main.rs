//! Waypoint: a local-first replica of a crowd-sourced places dataset.
//!
//! Runs one sync pass against the remote snapshot sources and prints
//! the most active contributors. Sync is externally triggered; this
//! binary is that trigger.
//!
//! ```bash
//! waypoint --data-dir ./data --log-level info
//! ```
//!
//! Environment variables can also be used:
//! - `WAYPOINT_DATA_DIR`: Data directory for the SQLite replica
//! - `WAYPOINT_DATA_URL` / `WAYPOINT_MIRROR_URL`: Endpoint overrides
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use waypoint::conf::{ConfQueries, ConfRepo};
use waypoint::config::Config;
use waypoint::element::ElementQueries;
use waypoint::event::EventQueries;
use waypoint::observability::tracing::init_tracing;
use waypoint::storage::StoragePool;
use waypoint::sync::{SnapshotImporter, SyncSources, Syncer};
use waypoint::user::UserQueries;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    // Ensure data directory exists
    fs::create_dir_all(&config.data_dir)?;

    let pool = StoragePool::open(config.data_dir.join("waypoint.db"), config.pool_size)?;

    let elements = ElementQueries::new(pool.clone());
    let users = UserQueries::new(pool.clone());
    let events = EventQueries::new(pool.clone());

    let conf = Arc::new(ConfRepo::new(ConfQueries::new(pool))?);
    let importer = Arc::new(SnapshotImporter::new(
        elements.clone(),
        users.clone(),
        events,
    ));

    let mut sources = SyncSources::default();
    if let Some(url) = config.data_url {
        sources.primary_url = url;
    }
    if let Some(url) = config.mirror_url {
        sources.mirror_url = url;
    }

    let syncer = Syncer::new(
        importer,
        Arc::clone(&conf),
        elements.clone(),
        sources,
        Duration::from_secs(config.http_timeout_secs),
    )?;

    syncer.sync().await;

    let current = conf.current();
    match current.last_sync_date {
        Some(ts) => tracing::info!(last_sync_date = %ts, "Replica state"),
        None => tracing::info!("Replica state: never synced"),
    }

    let element_count = elements.select_count()?;
    let in_viewport = elements
        .select_in_bounds(
            current.viewport_north_lat,
            current.viewport_east_lon,
            current.viewport_south_lat,
            current.viewport_west_lon,
        )?
        .len();
    tracing::info!(elements = element_count, in_viewport, "Replica size");

    println!("Top contributors:");
    for item in users.select_all()?.iter().take(10) {
        println!("  {:>6} edits  {}", item.changes, item.name);
    }

    // Let the persistence task write the final configuration value
    drop(syncer);
    if let Ok(conf) = Arc::try_unwrap(conf) {
        conf.shutdown().await;
    }

    Ok(())
}
