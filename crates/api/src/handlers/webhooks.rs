//! Inbound webhooks from the generation pipeline worker.
//!
//! Both endpoints share the skip policy: a webhook for a job id this
//! database does not know answers 200 with `{"skipped": true}` -- the
//! worker may call back for jobs the orchestrator was never told about
//! (direct worker testing, or a race with job creation), and treating
//! that as an error would make it retry forever.
//!
//! The skip policy only covers well-formed ids: `Path<Uuid>` rejects a
//! non-UUID path segment as malformed input (400) before any handler
//! runs, the same as an unparseable body.
//!
//! Bodies are taken raw so the HMAC signature (when a secret is
//! configured) is verified over the exact bytes the worker signed,
//! before any parsing.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use reelforge_core::error::CoreError;
use reelforge_core::signature::verify_signature;
use reelforge_events::ingest::ProgressUpdate;
use reelforge_events::IngestOutcome;
use reelforge_worker::client::SIGNATURE_HEADER;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify the webhook body signature when a secret is configured.
fn verify_webhook(
    state: &AppState,
    headers: &axum::http::HeaderMap,
    body: &[u8],
) -> AppResult<()> {
    let Some(secret) = &state.config.webhook_secret else {
        return Ok(());
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(format!(
                "Missing {SIGNATURE_HEADER} header"
            )))
        })?;

    if !verify_signature(secret, body, signature) {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid webhook signature".into(),
        )));
    }
    Ok(())
}

/// Parse a JSON webhook body, mapping malformed input to 400.
fn parse_body<T: for<'de> Deserialize<'de>>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook body: {e}")))
}

/// Shared response shape for both webhooks.
fn outcome_response(outcome: IngestOutcome) -> Json<serde_json::Value> {
    match outcome {
        IngestOutcome::Skipped => Json(json!({ "success": true, "skipped": true })),
        IngestOutcome::Merged(_) => Json(json!({ "success": true })),
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// PATCH /api/v1/jobs/{id}/progress
///
/// Worker progress report: status, current step, progress percent,
/// optional message, optional inline data projections. Always answers
/// success for well-formed bodies, even when the job is unknown.
pub async fn patch_progress(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    headers: axum::http::HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    verify_webhook(&state, &headers, &body)?;
    let update: ProgressUpdate = parse_body(&body)?;

    let outcome = state.ingest.ingest_progress(job_id, update).await?;
    Ok(outcome_response(outcome))
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Body for `POST /api/v1/jobs/{id}/update-artifacts`.
#[derive(Debug, Deserialize)]
struct UpdateArtifacts {
    step: Option<String>,
    artifacts: Option<serde_json::Value>,
}

/// POST /api/v1/jobs/{id}/update-artifacts
///
/// Merge a completed step's artifact payload into the job's ledger.
/// `step` and `artifacts` are both required; 400 otherwise with no
/// partial merge applied.
pub async fn update_artifacts(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    headers: axum::http::HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    verify_webhook(&state, &headers, &body)?;
    let input: UpdateArtifacts = parse_body(&body)?;

    let (Some(step), Some(artifacts)) = (input.step, input.artifacts) else {
        return Err(AppError::BadRequest(
            "step and artifacts are required".into(),
        ));
    };

    let outcome = state.ingest.ingest_artifacts(job_id, &step, &artifacts).await?;
    Ok(outcome_response(outcome))
}
