//! Integration tests for `TimelineEventRepo` dedup behavior.

use sqlx::PgPool;
use uuid::Uuid;

use reelforge_db::models::job::CreateJob;
use reelforge_db::models::timeline_event::{MILESTONE_FINAL_VIDEO, MILESTONE_STORYBOARD};
use reelforge_db::repositories::{JobRepo, TimelineEventRepo};

async fn seed_job(pool: &PgPool) -> (Uuid, Uuid) {
    let input = CreateJob {
        id: Uuid::new_v4(),
        chat_id: Uuid::new_v4(),
        avatar_dna: None,
        avatar_ref_images: None,
        generation_settings: None,
    };
    let job = JobRepo::create(pool, Uuid::new_v4(), &input, None)
        .await
        .unwrap();
    (job.id, job.chat_id)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn insert_then_duplicate_is_absorbed(pool: PgPool) {
    let (job_id, chat_id) = seed_job(&pool).await;
    let payload = serde_json::json!({"scenes": 3});

    let first = TimelineEventRepo::insert_dedup(&pool, job_id, chat_id, MILESTONE_STORYBOARD, &payload)
        .await
        .unwrap();
    assert!(first.is_some());

    let second = TimelineEventRepo::insert_dedup(&pool, job_id, chat_id, MILESTONE_STORYBOARD, &payload)
        .await
        .unwrap();
    assert!(second.is_none());

    let events = TimelineEventRepo::list_by_job(&pool, job_id).await.unwrap();
    assert_eq!(events.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn milestones_deduplicate_independently(pool: PgPool) {
    let (job_id, chat_id) = seed_job(&pool).await;
    let payload = serde_json::json!({});

    TimelineEventRepo::insert_dedup(&pool, job_id, chat_id, MILESTONE_STORYBOARD, &payload)
        .await
        .unwrap();
    let video = TimelineEventRepo::insert_dedup(&pool, job_id, chat_id, MILESTONE_FINAL_VIDEO, &payload)
        .await
        .unwrap();

    assert!(video.is_some());
    assert_eq!(
        TimelineEventRepo::list_by_job(&pool, job_id).await.unwrap().len(),
        2
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn exists_tracks_inserts(pool: PgPool) {
    let (job_id, chat_id) = seed_job(&pool).await;

    assert!(!TimelineEventRepo::exists(&pool, job_id, MILESTONE_STORYBOARD)
        .await
        .unwrap());

    TimelineEventRepo::insert_dedup(&pool, job_id, chat_id, MILESTONE_STORYBOARD, &serde_json::json!({}))
        .await
        .unwrap();

    assert!(TimelineEventRepo::exists(&pool, job_id, MILESTONE_STORYBOARD)
        .await
        .unwrap());
}
