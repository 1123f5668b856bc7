//! Timeline event model: chat-visible milestone messages.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use reelforge_core::types::Timestamp;

/// Milestone kind: storyboard ready.
pub const MILESTONE_STORYBOARD: &str = "storyboard";

/// Milestone kind: final video ready.
pub const MILESTONE_FINAL_VIDEO: &str = "final_video";

/// A row from the `timeline_events` table.
///
/// At most one row exists per `(job_id, milestone)` pair, enforced by
/// the `uq_timeline_events_job_milestone` constraint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineEvent {
    pub id: i64,
    pub job_id: Uuid,
    pub chat_id: Uuid,
    pub milestone: String,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}
