//! CRUD and index behavior against a real Redis instance.
//!
//! Requires a reachable Redis instance (`REDIS_URL`, defaults to
//! `redis://localhost:6379`); run with `cargo test -- --ignored`.

use sf_models::{AspectRatio, JobId, JobRequest, JobState, SubtitlePolicy};
use sf_store::{JobStore, StoreConfig};

fn sample_request() -> JobRequest {
    JobRequest {
        script_text: "A short script for the store tests.".to_string(),
        script_id: "script-1".to_string(),
        locale: "en-US".to_string(),
        platform: "tiktok".to_string(),
        aspect_ratio: AspectRatio::Ratio9x16,
        voice_selector: "voice-1".to_string(),
        subtitle_policy: SubtitlePolicy::default(),
        source_type_preference: Default::default(),
        priority: 5,
    }
}

fn store() -> JobStore {
    JobStore::new(StoreConfig::from_env()).expect("client construction does not connect")
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn create_get_update_delete_round_trip() {
    let store = store();
    let user_id = format!("it-user-{}", JobId::new());

    let job = store.create(user_id.clone(), sample_request(), 3).await.expect("create");
    assert_eq!(job.state, JobState::Pending);

    let fetched = store.get(&job.id).await.expect("get");
    assert_eq!(fetched.id, job.id);
    assert_eq!(fetched.user_id, user_id);

    let started = store.mark_started(&job.id).await.expect("mark_started");
    assert_eq!(started.state, JobState::Started);

    let progressed = store.mark_progress(&job.id, 0.5, "halfway", "video_composition").await.expect("mark_progress");
    assert_eq!(progressed.state, JobState::Processing);
    assert_eq!(progressed.progress, 0.5);

    let deleted = store.delete(&job.id).await.expect("delete");
    assert!(deleted);
    assert!(matches!(store.get(&job.id).await, Err(sf_store::StoreError::NotFound)));
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn list_by_user_is_newest_first() {
    let store = store();
    let user_id = format!("it-user-{}", JobId::new());

    let first = store.create(user_id.clone(), sample_request(), 3).await.expect("create first");
    let second = store.create(user_id.clone(), sample_request(), 3).await.expect("create second");

    let page = store.list_by_user(&user_id, 10, 0).await.expect("list_by_user");
    assert_eq!(page.first().map(|j| &j.id), Some(&second.id));
    assert_eq!(page.get(1).map(|j| &j.id), Some(&first.id));

    store.delete(&first.id).await.ok();
    store.delete(&second.id).await.ok();
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn counts_by_status_reflects_terminal_writes() {
    let store = store();
    let user_id = format!("it-user-{}", JobId::new());

    let job = store.create(user_id, sample_request(), 3).await.expect("create");
    store
        .mark_success(
            &job.id,
            sf_models::ResultBundle {
                artifact_path: "/tmp/does-not-matter.mp4".to_string(),
                thumbnail_path: "/tmp/does-not-matter.jpg".to_string(),
                duration_secs: 5.0,
                file_size_bytes: 1,
                format: "mp4".to_string(),
                resolution: "1080x1920".to_string(),
            },
        )
        .await
        .expect("mark_success");

    let counts = store.counts_by_status().await.expect("counts_by_status");
    assert!(counts.get(&JobState::Success).copied().unwrap_or(0) >= 1);

    store.delete(&job.id).await.ok();
}
