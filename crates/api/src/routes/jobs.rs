//! Route definitions for the `/jobs` resource.
//!
//! User-facing endpoints require the gateway identity header; the two
//! worker webhook endpoints are authenticated by HMAC signature instead
//! (enforced inside the handlers, since they must read the raw body).

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{decision, jobs, stream, webhooks};
use crate::state::AppState;

/// Routes mounted at `/jobs`.
///
/// ```text
/// POST   /                        -> create_job
/// GET    /{id}                    -> get_job (reopen/resume read)
/// POST   /{id}/cancel             -> cancel_job
/// GET    /{id}/stream             -> stream_job (SSE)
/// POST   /{id}/decision           -> submit_decision (quality gate)
/// PATCH  /{id}/progress           -> patch_progress (worker webhook)
/// POST   /{id}/update-artifacts   -> update_artifacts (worker webhook)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(jobs::create_job))
        .route("/{id}", get(jobs::get_job))
        .route("/{id}/cancel", post(jobs::cancel_job))
        .route("/{id}/stream", get(stream::stream_job))
        .route("/{id}/decision", post(decision::submit_decision))
        .route("/{id}/progress", patch(webhooks::patch_progress))
        .route("/{id}/update-artifacts", post(webhooks::update_artifacts))
}
