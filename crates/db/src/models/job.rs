//! Job entity model and DTOs for the orchestration core.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use reelforge_core::status::{JobStatus, StatusId};
use reelforge_core::types::Timestamp;

/// A row from the `jobs` table.
///
/// Serializes to the camelCase wire shape used by the reopen read:
/// `status_id` appears as a `status` string, never as the raw lookup id.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "status", serialize_with = "serialize_status")]
    pub status_id: StatusId,
    pub current_step: Option<String>,
    pub last_completed_step: Option<String>,
    pub progress: i16,
    pub script: Option<String>,
    pub storyboard: Option<serde_json::Value>,
    pub video_scenes: Option<serde_json::Value>,
    pub audio_url: Option<String>,
    pub final_video_url: Option<String>,
    pub step_artifacts: serde_json::Value,
    pub consistency_scores: Option<serde_json::Value>,
    pub avatar_dna: Option<serde_json::Value>,
    pub avatar_ref_images: Option<serde_json::Value>,
    pub generation_settings: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub version: i32,
    pub parent_job_id: Option<Uuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn serialize_status<S: serde::Serializer>(id: &StatusId, serializer: S) -> Result<S::Ok, S::Error> {
    let status = JobStatus::from_id(*id).unwrap_or(JobStatus::Running);
    serializer.serialize_str(status.as_str())
}

impl Job {
    /// Canonical status of this row.
    ///
    /// `status_id` is FK-constrained to the seeded lookup table, so the
    /// fallback only guards against a manually mangled database.
    pub fn status(&self) -> JobStatus {
        JobStatus::from_id(self.status_id).unwrap_or(JobStatus::Running)
    }
}

/// DTO for creating a new job row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJob {
    /// Caller-supplied opaque job id.
    pub id: Uuid,
    pub chat_id: Uuid,
    /// Snapshot of the avatar identity descriptor, written once.
    pub avatar_dna: Option<serde_json::Value>,
    /// Snapshot of avatar reference image URLs, written once.
    pub avatar_ref_images: Option<serde_json::Value>,
    /// Snapshot of generation settings (incl. product/background).
    pub generation_settings: Option<serde_json::Value>,
}

/// Field-level patch applied by the progress webhook.
///
/// Every field is optional; absent fields leave the stored value
/// untouched. `status`, `current_step`, and `progress` are overwritten
/// by the latest authoritative update (progress monotonically, via
/// `GREATEST` in SQL).
#[derive(Debug, Default)]
pub struct ProgressPatch {
    pub status: Option<JobStatus>,
    pub current_step: Option<String>,
    pub progress: Option<i16>,
    pub error_message: Option<String>,
    /// `data.script` projection.
    pub script: Option<String>,
    /// `data.storyboard` projection.
    pub storyboard: Option<serde_json::Value>,
    /// `data.final_video_url` projection.
    pub final_video_url: Option<String>,
}

/// Well-known artifact keys projected onto dedicated job columns by an
/// artifact merge. Unrecognized keys stay in the ledger only.
#[derive(Debug, Default)]
pub struct ArtifactProjections {
    pub script: Option<String>,
    pub storyboard: Option<serde_json::Value>,
    pub consistency_scores: Option<serde_json::Value>,
    pub video_scenes: Option<serde_json::Value>,
    pub audio_url: Option<String>,
    pub final_video_url: Option<String>,
}
