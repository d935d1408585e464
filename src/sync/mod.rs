//! Sync orchestration.
//!
//! One `sync()` pass: bootstrap an empty store from the bundled
//! snapshot, skip the network while the replica is fresh, otherwise
//! fetch the full dataset from the primary source with a mirror
//! fallback and hand it to the importer. All failures are absorbed
//! into log records; the only observable effects are storage content
//! and the advancing `last_sync_date`.

pub mod importer;

pub use importer::{DataImporter, SnapshotImporter};

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use crate::conf::{Conf, ConfRepo};
use crate::element::ElementQueries;

/// Primary full-dataset snapshot endpoint.
pub const PRIMARY_DATA_URL: &str = "https://waypoint.community/data.json";

/// Mirror endpoint, used only when the primary fails.
pub const MIRROR_DATA_URL: &str =
    "https://raw.githubusercontent.com/waypoint-community/waypoint-data/main/data.json";

/// Baseline snapshot compiled into the binary, imported once into an
/// empty store.
pub(crate) const BUNDLED_SNAPSHOT: &str = include_str!("../../assets/data.json");

/// Skip the network entirely when the last successful sync is this
/// recent.
const FRESHNESS_WINDOW_MINUTES: i64 = 60;

/// Default bound on a single fetch, so a hung request cannot stall a
/// sync pass indefinitely.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Where snapshots come from. Injectable for tests; defaults to the
/// production endpoints and the compiled-in baseline.
#[derive(Debug, Clone)]
pub struct SyncSources {
    pub primary_url: String,
    pub mirror_url: String,
    pub bundled_snapshot: String,
}

impl Default for SyncSources {
    fn default() -> Self {
        Self {
            primary_url: PRIMARY_DATA_URL.to_string(),
            mirror_url: MIRROR_DATA_URL.to_string(),
            bundled_snapshot: BUNDLED_SNAPSHOT.to_string(),
        }
    }
}

/// The sync orchestrator. Externally triggered, one pass per call.
pub struct Syncer {
    importer: Arc<dyn DataImporter>,
    conf: Arc<ConfRepo>,
    elements: ElementQueries,
    client: reqwest::Client,
    sources: SyncSources,
}

impl Syncer {
    /// Build a syncer with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        importer: Arc<dyn DataImporter>,
        conf: Arc<ConfRepo>,
        elements: ElementQueries,
        sources: SyncSources,
        http_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(http_timeout).build()?;
        Ok(Self {
            importer,
            conf,
            elements,
            client,
            sources,
        })
    }

    /// Run one sync pass. Never returns an error; all failures are
    /// logged and the next pass retries from the freshness check,
    /// since `last_sync_date` only advances on full success.
    pub async fn sync(&self) {
        match self.elements.select_count() {
            Ok(0) => {
                tracing::debug!("Importing bundled data");
                if let Err(e) = self.import_bundled() {
                    tracing::error!(error = %e, "Failed to import bundled data");
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Failed to check replica size"),
        }

        let last_sync_date = self.conf.current().last_sync_date;
        let hour_ago = Utc::now() - chrono::Duration::minutes(FRESHNESS_WINDOW_MINUTES);
        tracing::debug!(?last_sync_date, ?hour_ago, "Checking freshness");

        if let Some(last_sync_date) = last_sync_date {
            if last_sync_date > hour_ago {
                tracing::debug!("Data is up to date");
                return;
            }
        }

        tracing::debug!(url = %self.sources.primary_url, "Syncing");
        if self.sync_from(&self.sources.primary_url).await {
            self.mark_synced();
            tracing::debug!("Finished sync");
            return;
        }
        tracing::warn!(url = %self.sources.primary_url, "Failed to sync with primary source");

        tracing::debug!(url = %self.sources.mirror_url, "Syncing");
        if self.sync_from(&self.sources.mirror_url).await {
            self.mark_synced();
            tracing::debug!("Finished sync");
        } else {
            tracing::warn!(url = %self.sources.mirror_url, "Failed to sync with mirror source");
        }
    }

    fn import_bundled(&self) -> anyhow::Result<()> {
        let doc: Value = serde_json::from_str(&self.sources.bundled_snapshot)?;
        self.importer.import(&doc)
    }

    /// Advance `last_sync_date`, only ever after a fetch and import
    /// fully succeeded.
    fn mark_synced(&self) {
        let now = Utc::now();
        self.conf.update(|conf| Conf {
            last_sync_date: Some(now),
            ..conf
        });
    }

    /// Fetch one source and hand the document to the importer.
    /// Any failure along the way yields `false`.
    async fn sync_from(&self, url: &str) -> bool {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, url, "Fetch failed");
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), url, "Fetch returned non-success status");
            return false;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, url, "Failed to read response body");
                return false;
            }
        };

        let doc: Value = match serde_json::from_str(&body) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(error = %e, url, "Response body is not valid JSON");
                return false;
            }
        };

        match self.importer.import(&doc) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to import new data");
                false
            }
        }
    }
}
