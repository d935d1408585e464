//! Test utilities and fixtures for Waypoint tests.
//!
//! Provides:
//! - Temporary-database replica fixture
//! - Stub HTTP snapshot sources with hit counting

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tempfile::TempDir;
use tokio::sync::oneshot;

use waypoint::conf::{ConfQueries, ConfRepo};
use waypoint::element::ElementQueries;
use waypoint::event::EventQueries;
use waypoint::storage::StoragePool;
use waypoint::sync::{SnapshotImporter, SyncSources, Syncer};
use waypoint::user::UserQueries;

/// A complete replica over a temporary database.
///
/// The directory is cleaned up when the fixture is dropped.
pub struct TestReplica {
    pub temp_dir: TempDir,
    pub pool: StoragePool,
    pub conf: Arc<ConfRepo>,
    pub elements: ElementQueries,
    pub users: UserQueries,
    pub events: EventQueries,
}

impl TestReplica {
    /// Create a replica backed by a fresh temporary database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let pool =
            StoragePool::open(temp_dir.path().join("test.db"), 4).expect("failed to open pool");
        let conf =
            Arc::new(ConfRepo::new(ConfQueries::new(pool.clone())).expect("failed to load conf"));
        Self {
            temp_dir,
            elements: ElementQueries::new(pool.clone()),
            users: UserQueries::new(pool.clone()),
            events: EventQueries::new(pool.clone()),
            pool,
            conf,
        }
    }

    /// Build a syncer over this replica with the given sources.
    pub fn syncer(&self, sources: SyncSources) -> Syncer {
        let importer = Arc::new(SnapshotImporter::new(
            self.elements.clone(),
            self.users.clone(),
            self.events.clone(),
        ));
        Syncer::new(
            importer,
            Arc::clone(&self.conf),
            self.elements.clone(),
            sources,
            Duration::from_secs(5),
        )
        .expect("failed to build syncer")
    }
}

/// A stub snapshot endpoint serving one fixed response.
pub struct StubSource {
    pub url: String,
    hits: Arc<AtomicUsize>,
    shutdown: Option<oneshot::Sender<()>>,
}

struct StubState {
    status: StatusCode,
    body: String,
    hits: Arc<AtomicUsize>,
}

impl StubSource {
    /// Serve `body` with `status` on a random local port.
    pub async fn start(status: u16, body: &str) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = Arc::new(StubState {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.to_string(),
            hits: Arc::clone(&hits),
        });
        let app = Router::new()
            .route("/data.json", get(serve_snapshot))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub source");
        let addr = listener.local_addr().expect("stub source addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(async move {
            let _ = server.await;
        });

        Self {
            url: format!("http://{addr}/data.json"),
            hits,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Number of requests served so far.
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for StubSource {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_snapshot(State(state): State<Arc<StubState>>) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (state.status, state.body.clone())
}

/// A URL that refuses connections: the port was bound and released.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/data.json")
}

/// A snapshot document with one element, one user, and one event,
/// parameterized by element id.
pub fn snapshot_doc(element_id: &str) -> String {
    serde_json::json!({
        "elements": [
            {
                "id": element_id,
                "osm_json": { "lat": 12.11, "lon": -68.93, "tags": { "name": element_id } },
                "tags": {},
                "updated_at": "2024-05-01T10:00:00Z"
            }
        ],
        "users": [
            {
                "id": 7,
                "osm_data": { "display_name": "alice", "description": "(lightning:alice@example.com)" },
                "tags": {},
                "updated_at": "2024-05-01T10:00:00Z"
            }
        ],
        "events": [
            {
                "id": 1,
                "user_id": 7,
                "element_id": element_id,
                "type": "create",
                "tags": {},
                "created_at": "2024-05-01T10:00:00Z"
            }
        ]
    })
    .to_string()
}
