//! Single-slot relay server between the device and the dashboard.
//!
//! The relay keeps exactly one reading: the device overwrites it via
//! `POST /api/data` and the dashboard polls it via `GET /api/latest`. One
//! mutex guards the slot, since writer and reader arrive on different
//! connections. No history, no authentication, no persistence across restart.
//!
//! # Architecture
//!
//! ```text
//! Device ──→ POST /api/data ──→ [latest reading slot] ──→ GET /api/latest ──→ Dashboard
//! ```

use crate::source::types::Reading;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
}

impl ServerConfig {
    /// Create a new server configuration.
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

/// Shared server state: the single most-recent reading.
pub struct ServerState {
    latest: Mutex<Reading>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            latest: Mutex::new(Reading::zero()),
        }
    }
}

/// Response from the ingest endpoint.
#[derive(Serialize)]
pub struct IngestResponse {
    pub status: String,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/data
///
/// Overwrites the latest-reading slot. Missing payload fields deserialize to
/// their defaults; the relay assigns the timestamp on ingest.
async fn receive_data(
    State(state): State<Arc<ServerState>>,
    Json(reading): Json<Reading>,
) -> Json<IngestResponse> {
    let reading = reading.stamped_now();

    tracing::debug!(
        bpm = reading.bpm,
        spo2 = reading.spo2,
        has_finger = reading.has_finger,
        "reading received"
    );

    *state.latest.lock().await = reading;

    Json(IngestResponse {
        status: "success".to_string(),
    })
}

/// GET /api/latest
async fn latest(State(state): State<Arc<ServerState>>) -> Json<Reading> {
    Json(state.latest.lock().await.clone())
}

/// Run the relay server.
///
/// Returns the bound address and a shutdown sender, so callers (and tests)
/// can stop the server cleanly.
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let state = Arc::new(ServerState::new());

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/data", post(receive_data))
        .route("/api/latest", get(latest))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Relay server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Relay shutdown signal received");
            })
            .await
        {
            tracing::error!("Relay server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
