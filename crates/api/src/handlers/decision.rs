//! The quality-gate decision route.
//!
//! The decision path never writes job rows: its only durable effect is
//! the forward call to the pipeline service. The worker's subsequent
//! webhooks are what advance the job's state.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reelforge_core::quality_gate::{build_forward, ConsistencyScore, GateDecision};

use crate::error::{AppError, AppResult};
use crate::handlers::jobs::find_and_authorize;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /api/v1/jobs/{id}/decision`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    /// Required; one of the [`GateDecision`] wire names.
    pub decision: Option<String>,
    #[serde(default)]
    pub scene_numbers: Vec<i32>,
    #[serde(default)]
    pub additional_images: Vec<String>,
}

/// Response payload: what was actually forwarded to the worker.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    pub forwarded: bool,
    pub decision: GateDecision,
    pub scene_numbers: Vec<i32>,
}

/// POST /api/v1/jobs/{id}/decision
///
/// Validate and forward a quality-gate decision. For
/// `regenerate_outliers` the scene list is recomputed from the stored
/// consistency scores -- the same scores the user was shown -- and any
/// client-supplied list is ignored.
pub async fn submit_decision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    let job = find_and_authorize(&state.pool, job_id, &auth, "decide on").await?;

    let decision = match input.decision.as_deref() {
        None => return Err(AppError::BadRequest("decision is required".into())),
        Some("approve") => GateDecision::Approve,
        Some("regenerate_outliers") => GateDecision::RegenerateOutliers,
        Some("regenerate_all") => GateDecision::RegenerateAll,
        Some("add_references") => GateDecision::AddReferences,
        Some(other) => {
            return Err(AppError::BadRequest(format!("Unknown decision: {other}")));
        }
    };

    let stored_scores: Vec<ConsistencyScore> = job
        .consistency_scores
        .as_ref()
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    let forward = build_forward(
        decision,
        &stored_scores,
        input.scene_numbers,
        input.additional_images,
    );

    state.pipeline.submit_decision(job_id, &forward).await?;

    tracing::info!(
        job_id = %job_id,
        user_id = %auth.user_id,
        decision = decision.as_str(),
        "Quality-gate decision submitted",
    );

    Ok(Json(DataResponse {
        data: DecisionResponse {
            forwarded: true,
            decision,
            scene_numbers: forward.scene_numbers,
        },
    }))
}
