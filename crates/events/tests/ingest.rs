//! End-to-end ingestion tests: webhook payload → merge → milestone.

use sqlx::PgPool;
use uuid::Uuid;

use reelforge_core::status::JobStatus;
use reelforge_db::models::job::CreateJob;
use reelforge_db::models::timeline_event::{MILESTONE_FINAL_VIDEO, MILESTONE_STORYBOARD};
use reelforge_db::repositories::{JobRepo, TimelineEventRepo};
use reelforge_events::ingest::{Ingest, ProgressUpdate};
use assert_matches::assert_matches;
use reelforge_events::IngestOutcome;

async fn seed_job(pool: &PgPool) -> Uuid {
    let input = CreateJob {
        id: Uuid::new_v4(),
        chat_id: Uuid::new_v4(),
        avatar_dna: None,
        avatar_ref_images: None,
        generation_settings: None,
    };
    JobRepo::create(pool, Uuid::new_v4(), &input, None)
        .await
        .unwrap()
        .id
}

fn storyboard_artifacts() -> serde_json::Value {
    serde_json::json!({
        "storyboard": [
            {"image_url": "http://img/1.png", "scene_number": 1},
            {"image_url": "http://img/2.png", "scene_number": 2},
        ],
        "consistencyScores": [
            {"scene": 1, "score": 0.9},
            {"scene": 2, "score": 0.6},
        ],
    })
}

// ---------------------------------------------------------------------------
// Skip policy
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_job_is_skipped_not_failed(pool: PgPool) {
    let ingest = Ingest::new(pool.clone());

    let outcome = ingest
        .ingest_artifacts(Uuid::new_v4(), "storyboard", &storyboard_artifacts())
        .await
        .unwrap();
    assert_matches!(outcome, IngestOutcome::Skipped);

    let outcome = ingest
        .ingest_progress(Uuid::new_v4(), ProgressUpdate::default())
        .await
        .unwrap();
    assert_matches!(outcome, IngestOutcome::Skipped);
}

// ---------------------------------------------------------------------------
// Storyboard milestone
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn storyboard_merge_emits_one_milestone(pool: PgPool) {
    let job_id = seed_job(&pool).await;
    let ingest = Ingest::new(pool.clone());

    // Redelivered webhook: same payload twice.
    for _ in 0..2 {
        let outcome = ingest
            .ingest_artifacts(job_id, "storyboard", &storyboard_artifacts())
            .await
            .unwrap();
        assert_matches!(outcome, IngestOutcome::Merged(_));
    }

    let events = TimelineEventRepo::list_by_job(&pool, job_id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].milestone, MILESTONE_STORYBOARD);

    // Payload is normalized: canonical sceneNumber/imageUrl keys.
    let scenes = events[0].payload["scenes"].as_array().unwrap();
    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[0]["imageUrl"], "http://img/1.png");
    assert_eq!(scenes[0]["sceneNumber"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_storyboard_emits_nothing(pool: PgPool) {
    let job_id = seed_job(&pool).await;
    let ingest = Ingest::new(pool.clone());

    ingest
        .ingest_artifacts(job_id, "storyboard", &serde_json::json!({"storyboard": []}))
        .await
        .unwrap();

    assert!(TimelineEventRepo::list_by_job(&pool, job_id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_job_storyboard_emits_nothing(pool: PgPool) {
    let job_id = seed_job(&pool).await;
    let ingest = Ingest::new(pool.clone());

    let failed = ProgressUpdate {
        status: Some("failed".into()),
        message: Some("render farm unreachable".into()),
        ..Default::default()
    };
    ingest.ingest_progress(job_id, failed).await.unwrap();

    ingest
        .ingest_artifacts(job_id, "storyboard", &storyboard_artifacts())
        .await
        .unwrap();

    assert!(TimelineEventRepo::list_by_job(&pool, job_id)
        .await
        .unwrap()
        .is_empty());

    let job = JobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(job.error_message.as_deref(), Some("render farm unreachable"));
}

// ---------------------------------------------------------------------------
// Final-video milestone
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_emits_final_video_milestone_once(pool: PgPool) {
    let job_id = seed_job(&pool).await;
    let ingest = Ingest::new(pool.clone());

    let completed: ProgressUpdate = serde_json::from_value(serde_json::json!({
        "status": "completed",
        "progress": 100,
        "data": {"final_video_url": "http://v/final.mp4"},
    }))
    .unwrap();
    ingest.ingest_progress(job_id, completed).await.unwrap();

    // Redelivery of the completion webhook.
    let again: ProgressUpdate = serde_json::from_value(serde_json::json!({
        "status": "completed",
        "data": {"final_video_url": "http://v/final.mp4"},
    }))
    .unwrap();
    ingest.ingest_progress(job_id, again).await.unwrap();

    let events = TimelineEventRepo::list_by_job(&pool, job_id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].milestone, MILESTONE_FINAL_VIDEO);
    assert_eq!(events[0].payload["finalVideoUrl"], "http://v/final.mp4");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_without_url_emits_nothing(pool: PgPool) {
    let job_id = seed_job(&pool).await;
    let ingest = Ingest::new(pool.clone());

    let completed = ProgressUpdate {
        status: Some("completed".into()),
        ..Default::default()
    };
    ingest.ingest_progress(job_id, completed).await.unwrap();

    assert!(TimelineEventRepo::list_by_job(&pool, job_id)
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Status mapping through ingestion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn awaiting_approval_pauses_the_job(pool: PgPool) {
    let job_id = seed_job(&pool).await;
    let ingest = Ingest::new(pool.clone());

    let update = ProgressUpdate {
        status: Some("awaiting_approval".into()),
        current_step: Some("storyboard_review".into()),
        ..Default::default()
    };
    ingest.ingest_progress(job_id, update).await.unwrap();

    let job = JobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Paused);

    // A superseding processing update resumes it.
    let resume = ProgressUpdate {
        status: Some("processing".into()),
        ..Default::default()
    };
    ingest.ingest_progress(job_id, resume).await.unwrap();

    let job = JobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Running);
}
