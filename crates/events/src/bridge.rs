//! The milestone bridge: turns pipeline milestones into chat-visible
//! timeline events, at most once per `(job, milestone)` pair.
//!
//! Detection runs after every successful merge. Dedup is two-layered:
//! an existence check catches the common redelivery case cheaply, and
//! the unique constraint on `timeline_events` absorbs the narrow race
//! where two redeliveries pass the check concurrently.

use reelforge_core::status::JobStatus;
use reelforge_core::storyboard::normalize_storyboard;
use reelforge_db::models::job::Job;
use reelforge_db::models::timeline_event::{
    TimelineEvent, MILESTONE_FINAL_VIDEO, MILESTONE_STORYBOARD,
};
use reelforge_db::repositories::TimelineEventRepo;
use reelforge_db::DbPool;

/// Detects milestones on merged job rows and emits timeline events.
pub struct MilestoneBridge {
    pool: DbPool,
}

impl MilestoneBridge {
    /// Create a bridge writing through the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Inspect a freshly merged job row and emit any milestone events
    /// that fired.
    ///
    /// `touched_step` is the step named by the update that produced
    /// this row (the merged step for artifact updates, the reported
    /// current step for progress updates).
    pub async fn observe(
        &self,
        job: &Job,
        touched_step: Option<&str>,
    ) -> Result<Vec<TimelineEvent>, sqlx::Error> {
        let mut emitted = Vec::new();

        if let Some(event) = self.check_storyboard(job, touched_step).await? {
            emitted.push(event);
        }
        if let Some(event) = self.check_final_video(job).await? {
            emitted.push(event);
        }

        Ok(emitted)
    }

    /// Storyboard milestone: the storyboard step delivered a non-empty
    /// storyboard and the job is not failed.
    async fn check_storyboard(
        &self,
        job: &Job,
        touched_step: Option<&str>,
    ) -> Result<Option<TimelineEvent>, sqlx::Error> {
        if touched_step != Some(MILESTONE_STORYBOARD) || job.status() == JobStatus::Failed {
            return Ok(None);
        }
        let Some(raw) = &job.storyboard else {
            return Ok(None);
        };
        let scenes = normalize_storyboard(raw);
        if scenes.is_empty() {
            return Ok(None);
        }

        if TimelineEventRepo::exists(&self.pool, job.id, MILESTONE_STORYBOARD).await? {
            return Ok(None);
        }

        let payload = serde_json::json!({ "scenes": scenes });
        let inserted = TimelineEventRepo::insert_dedup(
            &self.pool,
            job.id,
            job.chat_id,
            MILESTONE_STORYBOARD,
            &payload,
        )
        .await?;

        if inserted.is_some() {
            tracing::info!(
                job_id = %job.id,
                scene_count = scenes.len(),
                "Storyboard milestone emitted",
            );
        }
        Ok(inserted)
    }

    /// Final-video milestone: the job completed with a final video URL.
    async fn check_final_video(&self, job: &Job) -> Result<Option<TimelineEvent>, sqlx::Error> {
        if job.status() != JobStatus::Completed {
            return Ok(None);
        }
        let Some(url) = &job.final_video_url else {
            return Ok(None);
        };

        if TimelineEventRepo::exists(&self.pool, job.id, MILESTONE_FINAL_VIDEO).await? {
            return Ok(None);
        }

        let payload = serde_json::json!({ "finalVideoUrl": url });
        let inserted = TimelineEventRepo::insert_dedup(
            &self.pool,
            job.id,
            job.chat_id,
            MILESTONE_FINAL_VIDEO,
            &payload,
        )
        .await?;

        if inserted.is_some() {
            tracing::info!(job_id = %job.id, "Final-video milestone emitted");
        }
        Ok(inserted)
    }
}
