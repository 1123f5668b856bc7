pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /jobs                            create (POST)
/// /jobs/{id}                       reopen/resume read (GET)
/// /jobs/{id}/cancel                relay cancellation (POST)
/// /jobs/{id}/stream                SSE progress stream (GET)
/// /jobs/{id}/decision              quality-gate decision (POST)
/// /jobs/{id}/progress              worker progress webhook (PATCH)
/// /jobs/{id}/update-artifacts      worker artifact webhook (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/jobs", jobs::router())
}
