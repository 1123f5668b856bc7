//! The per-job progress stream (SSE).
//!
//! One long-lived response per client: an immediate snapshot, then a
//! full re-snapshot on every poll tick (consumers diff client-side).
//! The poll timer lives inside the stream itself, so every exit path --
//! terminal status, poll-bound timeout, client disconnect -- drops the
//! timer with the stream; nothing outlives the response.
//!
//! Ownership is checked once at open: it cannot change mid-stream.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::HeaderName;
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use futures::stream::{self, Stream};
use serde::Serialize;
use uuid::Uuid;

use reelforge_core::types::Timestamp;
use reelforge_db::models::job::Job;
use reelforge_db::repositories::JobRepo;
use reelforge_db::DbPool;

use crate::error::AppResult;
use crate::handlers::jobs::find_and_authorize;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Snapshot wire shape
// ---------------------------------------------------------------------------

/// One SSE event: the job's current state, re-sent in full each tick.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobSnapshot {
    id: Uuid,
    status: &'static str,
    progress: i16,
    metadata: SnapshotMetadata,
    error_message: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotMetadata {
    current_step: Option<String>,
    last_completed_step: Option<String>,
    version: i32,
}

fn snapshot_event(job: &Job) -> Event {
    let snapshot = JobSnapshot {
        id: job.id,
        status: job.status().as_str(),
        progress: job.progress,
        metadata: SnapshotMetadata {
            current_step: job.current_step.clone(),
            last_completed_step: job.last_completed_step.clone(),
            version: job.version,
        },
        error_message: job.error_message.clone(),
        created_at: job.created_at,
        updated_at: job.updated_at,
    };
    let data = serde_json::to_string(&snapshot).expect("snapshot serialization is infallible");
    Event::default().data(data)
}

fn error_event(message: &str) -> Event {
    let data = serde_json::json!({ "error": message }).to_string();
    Event::default().data(data)
}

// ---------------------------------------------------------------------------
// Poll loop
// ---------------------------------------------------------------------------

enum PollState {
    /// Emit the snapshot taken at stream open.
    Initial(Box<Job>),
    /// Sleeping/polling; counts polls performed so far.
    Polling(u32),
    Done,
}

/// Build the snapshot stream for one job.
///
/// Emits the initial snapshot immediately, then re-polls the store at
/// `interval` until a terminal status is observed or `max_polls` is
/// reached (which emits a final `{"error": ...}` event).
fn poll_stream(
    pool: DbPool,
    job: Job,
    interval: Duration,
    max_polls: u32,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let job_id = job.id;

    stream::unfold(PollState::Initial(Box::new(job)), move |state| {
        let pool = pool.clone();
        async move {
            match state {
                PollState::Initial(job) => {
                    let next = if job.status().is_terminal() {
                        PollState::Done
                    } else {
                        PollState::Polling(0)
                    };
                    Some((Ok(snapshot_event(&job)), next))
                }

                PollState::Polling(polls) => {
                    if polls >= max_polls {
                        tracing::warn!(job_id = %job_id, polls, "Progress stream timed out");
                        return Some((
                            Ok(error_event("Stream timeout: no terminal status reached")),
                            PollState::Done,
                        ));
                    }

                    tokio::time::sleep(interval).await;

                    match JobRepo::find_by_id(&pool, job_id).await {
                        Ok(Some(job)) => {
                            let next = if job.status().is_terminal() {
                                PollState::Done
                            } else {
                                PollState::Polling(polls + 1)
                            };
                            Some((Ok(snapshot_event(&job)), next))
                        }
                        // Rows are never deleted by this core; a vanished row
                        // means the database was mangled underneath us.
                        Ok(None) => {
                            tracing::error!(job_id = %job_id, "Job row vanished mid-stream");
                            Some((Ok(error_event("Job no longer exists")), PollState::Done))
                        }
                        Err(e) => {
                            tracing::error!(job_id = %job_id, error = %e, "Stream poll failed");
                            Some((Ok(error_event("Stream read failed")), PollState::Done))
                        }
                    }
                }

                PollState::Done => None,
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{id}/stream
///
/// Open the SSE progress stream for a job. Owners only; the check runs
/// once before the first event is emitted.
pub async fn stream_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let job = find_and_authorize(&state.pool, job_id, &auth, "stream").await?;

    tracing::debug!(job_id = %job_id, user_id = %auth.user_id, "Progress stream opened");

    let stream = poll_stream(
        state.pool.clone(),
        job,
        Duration::from_millis(state.config.stream_poll_interval_ms),
        state.config.stream_max_polls,
    );

    // Disable intermediary buffering so events reach the client as
    // they are produced.
    let buffering = [(HeaderName::from_static("x-accel-buffering"), "no")];

    Ok((buffering, Sse::new(stream)))
}
