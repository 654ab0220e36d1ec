//! HTTP-surface scenarios against the real router, a real Redis-backed
//! job store, and the in-process queue/push/rate-limiter/cancellation
//! services — no mocked handlers.
//!
//! Requires a reachable Redis instance (`REDIS_URL`, defaults to
//! `redis://localhost:6379`); run with `cargo test -- --ignored`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use sf_api::{create_router, AppState};
use sf_pipeline::CancellationRegistry;
use sf_push::PushChannel;
use sf_queue::PriorityQueue;
use sf_ratelimit::RateLimiter;
use sf_store::{JobStore, StoreConfig};

const BODY_LIMIT: usize = 1024 * 1024;

fn test_state(rate_limiter: RateLimiter) -> AppState {
    AppState::new(
        sf_api::ApiConfig::default(),
        JobStore::new(StoreConfig::from_env()).expect("client construction does not connect"),
        PriorityQueue::new(Duration::from_secs(60)),
        PushChannel::new(),
        rate_limiter,
        Arc::new(CancellationRegistry::new()),
        3,
    )
}

fn submit_request(user_id: &str, script_text: &str) -> Request<Body> {
    let body = json!({
        "script_text": script_text,
        "script_id": "script-1",
        "platform": "tiktok",
        "aspect_ratio": "9:16",
        "voice_selector": "voice-1",
    });
    Request::builder()
        .method("POST")
        .uri("/api/jobs")
        .header("content-type", "application/json")
        .header("X-User-Id", user_id)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn submit_status_and_cancel_round_trip() {
    let state = test_state(RateLimiter::new(100, Duration::from_secs(3600)));
    let job_store = state.store.clone();
    let app = create_router(state, None);
    let user_id = format!("it-user-{}", sf_models::JobId::new());

    let submit_response = app.clone().oneshot(submit_request(&user_id, "Hello there. A short test script.")).await.unwrap();
    assert_eq!(submit_response.status(), StatusCode::ACCEPTED);
    let submitted = body_json(submit_response).await;
    let job_id = submitted["job_id"].as_str().expect("job_id in response").to_string();

    let status_response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/jobs/{job_id}"))
                .header("X-User-Id", &user_id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(status_response.status(), StatusCode::OK);
    let status = body_json(status_response).await;
    assert_eq!(status["job_id"], job_id);
    assert_eq!(status["state"], "pending");

    let cancel_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/jobs/{job_id}/cancel"))
                .header("X-User-Id", &user_id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cancel_response.status(), StatusCode::OK);

    let second_cancel = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/jobs/{job_id}/cancel"))
                .header("X-User-Id", &user_id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second_cancel.status(), StatusCode::BAD_REQUEST);

    job_store.delete(&sf_models::JobId::from_string(job_id)).await.ok();
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn submission_is_rate_limited_per_user() {
    let state = test_state(RateLimiter::new(1, Duration::from_secs(3600)));
    let job_store = state.store.clone();
    let app = create_router(state, None);
    let user_id = format!("it-user-{}", sf_models::JobId::new());

    let first = app.clone().oneshot(submit_request(&user_id, "First submission.")).await.unwrap();
    assert_eq!(first.status(), StatusCode::ACCEPTED);
    let first_body = body_json(first).await;
    let job_id = first_body["job_id"].as_str().unwrap().to_string();

    let second = app.clone().oneshot(submit_request(&user_id, "Second submission.")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    job_store.delete(&sf_models::JobId::from_string(job_id)).await.ok();
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn rejects_submission_missing_user_id_header() {
    let state = test_state(RateLimiter::new(100, Duration::from_secs(3600)));
    let app = create_router(state, None);

    let body = json!({
        "script_text": "No user header here.",
        "script_id": "script-1",
        "platform": "tiktok",
        "aspect_ratio": "9:16",
        "voice_selector": "voice-1",
    });
    let request = Request::builder()
        .method("POST")
        .uri("/api/jobs")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
