//! Repository for the `timeline_events` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::timeline_event::TimelineEvent;

/// Column list for `timeline_events` queries.
const COLUMNS: &str = "id, job_id, chat_id, milestone, payload, created_at";

/// Provides read/write operations for chat-visible milestone events.
pub struct TimelineEventRepo;

impl TimelineEventRepo {
    /// Whether a milestone event already exists for this job.
    pub async fn exists(
        pool: &PgPool,
        job_id: Uuid,
        milestone: &str,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1::bigint FROM timeline_events WHERE job_id = $1 AND milestone = $2",
        )
        .bind(job_id)
        .bind(milestone)
        .fetch_optional(pool)
        .await?;
        Ok(found.is_some())
    }

    /// Insert a milestone event, deduplicated by `(job_id, milestone)`.
    ///
    /// Returns `None` when an event for this pair already exists -- the
    /// unique constraint absorbs redelivered webhooks that slip past
    /// the caller's existence check.
    pub async fn insert_dedup(
        pool: &PgPool,
        job_id: Uuid,
        chat_id: Uuid,
        milestone: &str,
        payload: &serde_json::Value,
    ) -> Result<Option<TimelineEvent>, sqlx::Error> {
        let query = format!(
            "INSERT INTO timeline_events (job_id, chat_id, milestone, payload) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT uq_timeline_events_job_milestone DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(job_id)
            .bind(chat_id)
            .bind(milestone)
            .bind(payload)
            .fetch_optional(pool)
            .await
    }

    /// List all milestone events for a job, oldest first.
    pub async fn list_by_job(
        pool: &PgPool,
        job_id: Uuid,
    ) -> Result<Vec<TimelineEvent>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM timeline_events WHERE job_id = $1 ORDER BY id");
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(job_id)
            .fetch_all(pool)
            .await
    }
}
