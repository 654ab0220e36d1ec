//! Submission, status, listing, cancellation, and aggregate statistics.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use sf_catalog::get_platform;
use sf_models::{estimate_duration_secs, AspectRatio, Job, JobId, JobRequest, JobState, ResultBundle,
    SourceTypePreference, SubtitlePolicy};

use crate::auth::require_user_id;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    pub script_text: String,
    pub script_id: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    pub platform: String,
    pub aspect_ratio: String,
    pub voice_selector: String,
    #[serde(default)]
    pub subtitle_policy: SubtitlePolicy,
    #[serde(default)]
    pub source_type_preference: SourceTypePreference,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_priority() -> u8 {
    5
}

#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub state: JobState,
    pub expected_duration_secs: f64,
}

pub async fn submit_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SubmitJobRequest>,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    let user_id = require_user_id(&headers)?;

    if request.script_text.trim().is_empty() {
        return Err(ApiError::validation("script_text must not be empty"));
    }
    if get_platform(&request.platform).is_none() {
        return Err(ApiError::validation(format!("unknown platform: {}", request.platform)));
    }
    let aspect_ratio = AspectRatio::parse(&request.aspect_ratio)
        .filter(AspectRatio::is_submittable)
        .ok_or_else(|| ApiError::validation(format!("unsupported aspect ratio: {}", request.aspect_ratio)))?;
    if !(1..=10).contains(&request.priority) {
        return Err(ApiError::validation("priority must be in [1, 10]"));
    }
    if !request.subtitle_policy.is_valid() {
        return Err(ApiError::validation("words_per_line must be in [1, 10]"));
    }

    if !state.rate_limiter.check_and_record(&user_id).await {
        metrics::record_rate_limit_hit();
        return Err(ApiError::RateLimited);
    }

    let expected_duration_secs = 2.0 * estimate_duration_secs(&request.script_text);

    let job_request = JobRequest {
        script_text: request.script_text,
        script_id: request.script_id,
        locale: request.locale,
        platform: request.platform,
        aspect_ratio,
        voice_selector: request.voice_selector,
        subtitle_policy: request.subtitle_policy,
        source_type_preference: request.source_type_preference,
        priority: request.priority,
    };

    let job = state.store.create(user_id, job_request, state.max_retries).await?;

    if let Err(e) = state.queue.offer(job.id.clone(), job.priority_class).await {
        warn!(job_id = %job.id, "queue closed while submitting, marking job failed");
        let _ = state.store.mark_failure(&job.id, "queue is shutting down".to_string(), None).await;
        return Err(e.into());
    }

    metrics::record_job_created();
    info!(job_id = %job.id, user_id = %job.user_id, "job submitted");

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitJobResponse {
            job_id: job.id.to_string(),
            state: job.state,
            expected_duration_secs,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub state: JobState,
    pub progress: f64,
    pub progress_message: String,
    pub progress_step: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultBundle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id.to_string(),
            state: job.state,
            progress: job.progress,
            progress_message: job.progress_message,
            progress_step: job.progress_step,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
            retry_count: job.retry_count,
            result: job.result,
            error_message: job.error_message,
        }
    }
}

pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<JobStatusResponse>> {
    let user_id = require_user_id(&headers)?;
    let job = state.store.get(&JobId::from_string(job_id)).await?;
    if job.user_id != user_id {
        return Err(ApiError::NotFound);
    }
    Ok(Json(job.into()))
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    20
}

#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobStatusResponse>,
    pub page: usize,
    pub page_size: usize,
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<ListJobsResponse>> {
    let user_id = require_user_id(&headers)?;
    if query.page < 1 {
        return Err(ApiError::validation("page must be >= 1"));
    }
    if query.page_size == 0 || query.page_size > MAX_PAGE_SIZE {
        return Err(ApiError::validation(format!("page_size must be in [1, {MAX_PAGE_SIZE}]")));
    }

    let offset = (query.page - 1) * query.page_size;
    let jobs = state.store.list_by_user(&user_id, query.page_size, offset).await?;

    Ok(Json(ListJobsResponse {
        jobs: jobs.into_iter().map(JobStatusResponse::from).collect(),
        page: query.page,
        page_size: query.page_size,
    }))
}

pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let user_id = require_user_id(&headers)?;
    let job_id = JobId::from_string(job_id);
    let job = state.store.get(&job_id).await?;
    if job.user_id != user_id {
        return Err(ApiError::NotFound);
    }
    if job.state.is_terminal() {
        return Err(ApiError::conflict("job is already terminal"));
    }

    if state.cancellations.cancel(&job_id).await {
        // an attempt is in flight; its own check_aborted checkpoint marks
        // the job CANCELLED and emits the push event once it observes the
        // token.
        info!(job_id = %job_id, "cancellation requested for in-flight attempt");
    } else {
        state.store.mark_cancelled(&job_id).await?;
        state.push.emit_cancelled(&job_id).await;
        info!(job_id = %job_id, "job cancelled before dispatch");
    }

    metrics::record_job_cancelled();
    Ok(StatusCode::OK)
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub counts: HashMap<String, u64>,
}

pub async fn statistics(State(state): State<AppState>) -> ApiResult<Json<StatisticsResponse>> {
    let counts = state.store.counts_by_status().await?;
    Ok(Json(StatisticsResponse {
        counts: counts.into_iter().map(|(state, n)| (state.as_str().to_string(), n)).collect(),
    }))
}
