//! The artifact merge service: applies worker webhook payloads onto
//! job rows, idempotently, and feeds merged rows to the milestone
//! bridge.
//!
//! A webhook for a job id this database has never seen is a supported
//! case (the worker can be exercised directly, racing job creation)
//! and yields [`IngestOutcome::Skipped`], never an error.

use serde::Deserialize;
use uuid::Uuid;

use reelforge_core::status::{map_worker_status, JobStatus};
use reelforge_core::step::PipelineStep;
use reelforge_db::models::job::{ArtifactProjections, Job, ProgressPatch};
use reelforge_db::repositories::JobRepo;
use reelforge_db::DbPool;

use crate::bridge::MilestoneBridge;

/// Error surface for ingestion: only store failures, which the webhook
/// caller sees as a 500 and retries (merges are idempotent).
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Result of applying one webhook payload.
#[derive(Debug)]
pub enum IngestOutcome {
    /// The job id is unknown here; nothing was written.
    Skipped,
    /// The payload was merged; the boxed row is the merged state.
    Merged(Box<Job>),
}

/// Body of the worker's progress webhook.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// Worker-vocabulary status string, mapped via the status mapper.
    pub status: Option<String>,
    pub current_step: Option<String>,
    pub progress: Option<i16>,
    /// Human-readable progress note; logged, not persisted.
    pub message: Option<String>,
    /// Pipeline version; present when the worker restarts a rewound
    /// pipeline after a regeneration decision.
    pub version: Option<i32>,
    #[serde(default)]
    pub data: ProgressData,
}

/// Inline artifact projections carried by a progress update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    pub script: Option<String>,
    pub storyboard: Option<serde_json::Value>,
    #[serde(alias = "final_video_url")]
    pub final_video_url: Option<String>,
}

/// The artifact merge service. Holds its store handle explicitly; the
/// process entry point owns construction and lifecycle.
pub struct Ingest {
    pool: DbPool,
    bridge: MilestoneBridge,
}

impl Ingest {
    pub fn new(pool: DbPool) -> Self {
        let bridge = MilestoneBridge::new(pool.clone());
        Self { pool, bridge }
    }

    /// Apply a progress webhook to a job.
    pub async fn ingest_progress(
        &self,
        job_id: Uuid,
        update: ProgressUpdate,
    ) -> Result<IngestOutcome, IngestError> {
        let status = update.status.as_deref().map(map_worker_status);

        // Steps are stored as reported; the ordered vocabulary only
        // flags drift for observability.
        if let Some(step) = &update.current_step {
            if PipelineStep::parse(step).is_none() {
                tracing::debug!(job_id = %job_id, step, "Step name outside the pipeline vocabulary");
            }
        }

        let patch = ProgressPatch {
            status,
            current_step: update.current_step.clone(),
            progress: update.progress,
            error_message: match status {
                Some(JobStatus::Failed) => update.message.clone(),
                _ => None,
            },
            script: update.data.script,
            storyboard: update.data.storyboard,
            final_video_url: update.data.final_video_url,
        };

        let Some(job) = JobRepo::apply_progress(&self.pool, job_id, &patch, update.version).await?
        else {
            tracing::debug!(job_id = %job_id, "Progress webhook for unknown job, skipping");
            return Ok(IngestOutcome::Skipped);
        };

        if let Some(message) = &update.message {
            tracing::debug!(job_id = %job_id, message, "Worker progress message");
        }
        tracing::info!(
            job_id = %job_id,
            status = job.status().as_str(),
            progress = job.progress,
            step = job.current_step.as_deref().unwrap_or("-"),
            "Progress merged",
        );

        self.bridge
            .observe(&job, patch.current_step.as_deref())
            .await?;

        Ok(IngestOutcome::Merged(Box::new(job)))
    }

    /// Merge a step's artifact payload into a job's ledger.
    pub async fn ingest_artifacts(
        &self,
        job_id: Uuid,
        step: &str,
        artifacts: &serde_json::Value,
    ) -> Result<IngestOutcome, IngestError> {
        let projections = project_artifacts(step, artifacts);

        let Some(job) =
            JobRepo::merge_step_artifacts(&self.pool, job_id, step, artifacts, &projections)
                .await?
        else {
            tracing::debug!(job_id = %job_id, step, "Artifact webhook for unknown job, skipping");
            return Ok(IngestOutcome::Skipped);
        };

        tracing::info!(job_id = %job_id, step, "Step artifacts merged");

        self.bridge.observe(&job, Some(step)).await?;

        Ok(IngestOutcome::Merged(Box::new(job)))
    }
}

/// Project well-known `(step, key)` pairs onto dedicated job columns.
///
/// Everything else stays in the step ledger, retrievable by replay but
/// not projected.
pub fn project_artifacts(step: &str, artifacts: &serde_json::Value) -> ArtifactProjections {
    let mut p = ArtifactProjections::default();
    match step {
        "script_generation" => {
            p.script = artifacts
                .get("script")
                .and_then(|v| v.as_str())
                .map(String::from);
        }
        "storyboard" => {
            p.storyboard = artifacts.get("storyboard").cloned();
            p.consistency_scores = artifacts.get("consistencyScores").cloned();
        }
        "video_generation" => {
            p.video_scenes = artifacts.get("videoScenes").cloned();
        }
        "audio" => {
            p.audio_url = artifacts
                .get("audioUrl")
                .and_then(|v| v.as_str())
                .map(String::from);
        }
        "assembly" => {
            p.final_video_url = artifacts
                .get("finalVideoUrl")
                .and_then(|v| v.as_str())
                .map(String::from);
        }
        _ => {}
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn script_step_projects_script() {
        let p = project_artifacts("script_generation", &json!({"script": "INT. DAY"}));
        assert_eq!(p.script.as_deref(), Some("INT. DAY"));
        assert!(p.storyboard.is_none());
    }

    #[test]
    fn storyboard_step_projects_storyboard_and_scores() {
        let artifacts = json!({
            "storyboard": [{"image_url": "http://img/1.png"}],
            "consistencyScores": [{"scene": 1, "score": 0.9}],
        });
        let p = project_artifacts("storyboard", &artifacts);
        assert!(p.storyboard.is_some());
        assert!(p.consistency_scores.is_some());
    }

    #[test]
    fn auxiliary_steps_project_urls() {
        let p = project_artifacts("audio", &json!({"audioUrl": "http://a/track.mp3"}));
        assert_eq!(p.audio_url.as_deref(), Some("http://a/track.mp3"));

        let p = project_artifacts("assembly", &json!({"finalVideoUrl": "http://v/final.mp4"}));
        assert_eq!(p.final_video_url.as_deref(), Some("http://v/final.mp4"));
    }

    #[test]
    fn unknown_steps_and_keys_project_nothing() {
        let p = project_artifacts("quality_check", &json!({"report": "ok"}));
        assert!(p.script.is_none());
        assert!(p.storyboard.is_none());
        assert!(p.video_scenes.is_none());
        assert!(p.audio_url.is_none());
        assert!(p.final_video_url.is_none());

        // A known step with unrelated keys projects nothing either.
        let p = project_artifacts("storyboard", &json!({"debug": true}));
        assert!(p.storyboard.is_none());
    }

    #[test]
    fn progress_update_deserializes_both_url_spellings() {
        let a: ProgressUpdate =
            serde_json::from_value(json!({"data": {"final_video_url": "http://v/1.mp4"}})).unwrap();
        assert_eq!(a.data.final_video_url.as_deref(), Some("http://v/1.mp4"));

        let b: ProgressUpdate =
            serde_json::from_value(json!({"data": {"finalVideoUrl": "http://v/2.mp4"}})).unwrap();
        assert_eq!(b.data.final_video_url.as_deref(), Some("http://v/2.mp4"));
    }
}
