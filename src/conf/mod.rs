//! Application configuration: a single always-present value, observable
//! in memory and persisted write-through.

pub mod queries;
pub mod repo;

pub use queries::ConfQueries;
pub use repo::ConfRepo;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Default viewport: the dataset's reference locale with fixed margins.
const DEFAULT_CENTER_LAT: f64 = 12.116667;
const DEFAULT_CENTER_LON: f64 = -68.933333;
const VIEWPORT_LAT_MARGIN: f64 = 0.04;
const VIEWPORT_LON_MARGIN: f64 = 0.04;
const VIEWPORT_LON_OFFSET: f64 = 0.03;

/// The application configuration value.
///
/// Always fully defined: reads observe either the persisted value or
/// the default, never a partially constructed one. Mutated only by
/// whole-value replacement through [`ConfRepo::update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conf {
    pub last_sync_date: Option<DateTime<Utc>>,
    pub viewport_north_lat: f64,
    pub viewport_east_lon: f64,
    pub viewport_south_lat: f64,
    pub viewport_west_lon: f64,
    pub show_atms: bool,
    pub show_sync_summary: bool,
    pub notify_of_new_elements_nearby: bool,
}

impl Default for Conf {
    fn default() -> Self {
        Self {
            last_sync_date: None,
            viewport_north_lat: DEFAULT_CENTER_LAT + VIEWPORT_LAT_MARGIN,
            viewport_east_lon: DEFAULT_CENTER_LON + VIEWPORT_LON_MARGIN + VIEWPORT_LON_OFFSET,
            viewport_south_lat: DEFAULT_CENTER_LAT - VIEWPORT_LAT_MARGIN,
            viewport_west_lon: DEFAULT_CENTER_LON - VIEWPORT_LON_MARGIN + VIEWPORT_LON_OFFSET,
            show_atms: false,
            show_sync_summary: false,
            notify_of_new_elements_nearby: false,
        }
    }
}
