//! Handlers for the `/jobs` resource: creation, the reopen read, and
//! cancellation.
//!
//! Webhook ingestion lives in [`super::webhooks`], the progress stream
//! in [`super::stream`], and quality-gate decisions in
//! [`super::decision`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use reelforge_core::error::CoreError;
use reelforge_db::models::job::{CreateJob, Job};
use reelforge_db::repositories::JobRepo;
use reelforge_worker::StartGeneration;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a job by ID and verify the caller owns it.
///
/// Returns `NotFound` if the job does not exist, `Forbidden` if the
/// caller is not the owner. `action` is used in the error message
/// (e.g. "view", "stream", "cancel").
pub(crate) async fn find_and_authorize(
    pool: &sqlx::PgPool,
    job_id: Uuid,
    auth: &AuthUser,
    action: &str,
) -> AppResult<Job> {
    let job = JobRepo::find_by_id(pool, job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id.to_string(),
        }))?;

    if job.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Cannot {action} another user's job"
        ))));
    }

    Ok(job)
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Body for `POST /api/v1/jobs`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[serde(flatten)]
    pub job: CreateJob,
    /// Set when this job is a regeneration of an earlier one; the new
    /// row starts at the parent's version + 1.
    pub parent_job_id: Option<Uuid>,
}

/// POST /api/v1/jobs
///
/// Create a job row and request a generation run from the pipeline
/// service. Returns 201 with the created job. If the pipeline cannot
/// be reached the row is marked failed and 502 is returned -- the
/// client can retry with a fresh id.
pub async fn create_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateJobRequest>,
) -> AppResult<impl IntoResponse> {
    let job = JobRepo::create(&state.pool, auth.user_id, &input.job, input.parent_job_id).await?;

    tracing::info!(
        job_id = %job.id,
        chat_id = %job.chat_id,
        user_id = %auth.user_id,
        version = job.version,
        "Job created",
    );

    let start = StartGeneration {
        job_id: job.id,
        chat_id: job.chat_id,
        avatar_dna: job.avatar_dna.clone(),
        avatar_ref_images: job.avatar_ref_images.clone(),
        generation_settings: job.generation_settings.clone(),
    };
    if let Err(e) = state.pipeline.start_generation(&start).await {
        tracing::error!(job_id = %job.id, error = %e, "Failed to start generation");
        let patch = reelforge_db::models::job::ProgressPatch {
            status: Some(reelforge_core::status::JobStatus::Failed),
            error_message: Some("Failed to reach the generation service".into()),
            ..Default::default()
        };
        JobRepo::apply_progress(&state.pool, job.id, &patch, None).await?;
        return Err(e.into());
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}

// ---------------------------------------------------------------------------
// Reopen read
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{id}
///
/// Read-only projection of the full job row, used to rehydrate a UI
/// session against an existing job (script, storyboard, video scenes,
/// final URL, avatar snapshot, generation settings, consistency
/// scores). Owners only.
pub async fn get_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let job = find_and_authorize(&state.pool, job_id, &auth, "view").await?;
    Ok(Json(DataResponse { data: job }))
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs/{id}/cancel
///
/// Relay a cancellation to the pipeline service. No local mutation:
/// the worker's subsequent `cancelled` webhook is what moves the row
/// to its terminal state. Returns 409 if the job is already terminal.
pub async fn cancel_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let job = find_and_authorize(&state.pool, job_id, &auth, "cancel").await?;

    if job.status().is_terminal() {
        return Err(AppError::Core(CoreError::Conflict(
            "Job is already in a terminal state and cannot be cancelled".into(),
        )));
    }

    state.pipeline.cancel(job_id).await?;

    tracing::info!(job_id = %job_id, user_id = %auth.user_id, "Cancellation requested");

    Ok(StatusCode::ACCEPTED)
}
