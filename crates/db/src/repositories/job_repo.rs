//! Repository for the `jobs` table.
//!
//! Writes are field-level merges: `COALESCE` keeps absent fields
//! untouched, `GREATEST` keeps `progress` monotonic, and `||` appends
//! to the `step_artifacts` JSONB ledger without touching other steps'
//! entries. Every mutation returns the merged row via `RETURNING`, and
//! `fetch_optional` turns unknown job ids into `None` rather than an
//! error -- webhooks for jobs this database has never heard of are a
//! supported, benign case.

use sqlx::PgPool;
use uuid::Uuid;

use reelforge_core::status::JobStatus;

use crate::models::job::{ArtifactProjections, CreateJob, Job, ProgressPatch};

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, chat_id, user_id, status_id, current_step, last_completed_step, \
    progress, script, storyboard, video_scenes, audio_url, final_video_url, \
    step_artifacts, consistency_scores, avatar_dna, avatar_ref_images, \
    generation_settings, error_message, version, parent_job_id, \
    created_at, updated_at";

/// Provides persistence operations for generation jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new job row in `queued` status with progress 0.
    ///
    /// Generation-input snapshots (avatar DNA, reference images,
    /// settings) are written here and only overwritten by an explicit
    /// regeneration. A job created with `parent_job_id` starts at the
    /// parent's version + 1.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        input: &CreateJob,
        parent_job_id: Option<Uuid>,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs \
                (id, chat_id, user_id, status_id, avatar_dna, avatar_ref_images, \
                 generation_settings, parent_job_id, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                 COALESCE((SELECT version + 1 FROM jobs WHERE id = $8), 1)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(input.id)
            .bind(input.chat_id)
            .bind(user_id)
            .bind(JobStatus::Queued.id())
            .bind(&input.avatar_dna)
            .bind(&input.avatar_ref_images)
            .bind(&input.generation_settings)
            .bind(parent_job_id)
            .fetch_one(pool)
            .await
    }

    /// Fetch a job by id.
    pub async fn find_by_id(pool: &PgPool, job_id: Uuid) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a progress patch, returning the merged row.
    ///
    /// `status` and `current_step` are overwritten by the latest
    /// authoritative update, with one exception: terminal states
    /// absorb. Once a row is completed, failed, or cancelled, a stale
    /// or redelivered patch cannot move its status or step; only a
    /// patch carrying a `version` greater than the stored one (the
    /// worker restarting a rewound pipeline after a regeneration
    /// decision) leaves a terminal state.
    ///
    /// `progress` only moves forward, except on that same
    /// version-advancing restart, where the patch's progress value is
    /// taken as-is (defaulting to 0).
    ///
    /// `error_message` is set alongside a failed status, kept while
    /// the terminal row absorbs redeliveries, and cleared when a
    /// restart or an explicit non-failed status supersedes the
    /// failure.
    ///
    /// Returns `None` if the job id is unknown.
    pub async fn apply_progress(
        pool: &PgPool,
        job_id: Uuid,
        patch: &ProgressPatch,
        version: Option<i32>,
    ) -> Result<Option<Job>, sqlx::Error> {
        // True when the row is terminal and the patch does not advance
        // the version: the patch's status/step/error are absorbed.
        let absorbed = format!(
            "status_id IN ({}, {}, {}) AND COALESCE($9, version) <= version",
            JobStatus::Completed.id(),
            JobStatus::Failed.id(),
            JobStatus::Cancelled.id(),
        );
        let query = format!(
            "UPDATE jobs SET \
                status_id = CASE \
                    WHEN {absorbed} THEN status_id \
                    ELSE COALESCE($2, status_id) \
                END, \
                current_step = CASE \
                    WHEN {absorbed} THEN current_step \
                    ELSE COALESCE($3, current_step) \
                END, \
                progress = CASE \
                    WHEN $9::int IS NOT NULL AND $9 > version THEN COALESCE($4, 0) \
                    ELSE GREATEST(progress, COALESCE($4, progress)) \
                END, \
                error_message = CASE \
                    WHEN {absorbed} THEN error_message \
                    WHEN $9::int IS NOT NULL AND $9 > version THEN $5 \
                    WHEN $2::smallint IS NOT NULL AND $2 <> {failed} THEN $5 \
                    ELSE COALESCE($5, error_message) \
                END, \
                script = COALESCE($6, script), \
                storyboard = COALESCE($7, storyboard), \
                final_video_url = COALESCE($8, final_video_url), \
                version = GREATEST(version, COALESCE($9, version)), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}",
            failed = JobStatus::Failed.id(),
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(patch.status.map(JobStatus::id))
            .bind(&patch.current_step)
            .bind(patch.progress)
            .bind(&patch.error_message)
            .bind(&patch.script)
            .bind(&patch.storyboard)
            .bind(&patch.final_video_url)
            .bind(version)
            .fetch_optional(pool)
            .await
    }

    /// Merge a step's artifact payload into the ledger, returning the
    /// merged row.
    ///
    /// The entry for `step` is replaced wholesale; entries for other
    /// steps are never touched. `last_completed_step` is set to `step`
    /// unconditionally -- the worker is the authority on completion
    /// order. Projections of well-known artifact keys overwrite their
    /// dedicated columns when present.
    ///
    /// Re-applying an identical payload yields the same row, so the
    /// worker may retry freely.
    ///
    /// Returns `None` if the job id is unknown.
    pub async fn merge_step_artifacts(
        pool: &PgPool,
        job_id: Uuid,
        step: &str,
        artifacts: &serde_json::Value,
        projections: &ArtifactProjections,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET \
                step_artifacts = step_artifacts || jsonb_build_object($2::text, $3::jsonb), \
                last_completed_step = $2, \
                script = COALESCE($4, script), \
                storyboard = COALESCE($5, storyboard), \
                consistency_scores = COALESCE($6, consistency_scores), \
                video_scenes = COALESCE($7, video_scenes), \
                audio_url = COALESCE($8, audio_url), \
                final_video_url = COALESCE($9, final_video_url), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(step)
            .bind(artifacts)
            .bind(&projections.script)
            .bind(&projections.storyboard)
            .bind(&projections.consistency_scores)
            .bind(&projections.video_scenes)
            .bind(&projections.audio_url)
            .bind(&projections.final_video_url)
            .fetch_optional(pool)
            .await
    }
}
