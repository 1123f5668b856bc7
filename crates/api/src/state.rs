use std::sync::Arc;

use reelforge_events::Ingest;
use reelforge_worker::PipelineClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`). All store and client handles are constructed by the
/// process entry point and injected here; nothing lives at module
/// scope.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: reelforge_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Artifact merge service (webhook ingestion path).
    pub ingest: Arc<Ingest>,
    /// Client for the external generation pipeline service.
    pub pipeline: Arc<PipelineClient>,
}
