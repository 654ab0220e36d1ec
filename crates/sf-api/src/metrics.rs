//! Prometheus metrics for the API process.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Installs the global recorder. Returns a handle the `/metrics` route
/// renders on scrape.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install prometheus recorder")
}

pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "sf_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "sf_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "sf_http_requests_in_flight";

    pub const WS_CONNECTIONS_ACTIVE: &str = "sf_ws_connections_active";

    pub const QUEUE_DEPTH: &str = "sf_queue_depth";
    pub const ACTIVE_WORKERS: &str = "sf_active_workers";

    pub const JOBS_CREATED_TOTAL: &str = "sf_jobs_created_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "sf_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "sf_jobs_failed_total";
    pub const JOBS_RETRIED_TOTAL: &str = "sf_jobs_retried_total";
    pub const JOBS_CANCELLED_TOTAL: &str = "sf_jobs_cancelled_total";

    pub const RATE_LIMIT_HITS_TOTAL: &str = "sf_rate_limit_hits_total";
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];
    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn set_ws_active_connections(count: i64) {
    gauge!(names::WS_CONNECTIONS_ACTIVE).set(count as f64);
}

pub fn set_queue_depth(depth: u64) {
    gauge!(names::QUEUE_DEPTH).set(depth as f64);
}

pub fn set_active_workers(count: u64) {
    gauge!(names::ACTIVE_WORKERS).set(count as f64);
}

pub fn record_job_created() {
    counter!(names::JOBS_CREATED_TOTAL).increment(1);
}

pub fn record_job_completed() {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
}

pub fn record_job_failed() {
    counter!(names::JOBS_FAILED_TOTAL).increment(1);
}

pub fn record_job_retried() {
    counter!(names::JOBS_RETRIED_TOTAL).increment(1);
}

pub fn record_job_cancelled() {
    counter!(names::JOBS_CANCELLED_TOTAL).increment(1);
}

pub fn record_rate_limit_hit() {
    counter!(names::RATE_LIMIT_HITS_TOTAL).increment(1);
}

/// Collapse path segments that carry a job id down to a fixed placeholder,
/// so a label cardinality explosion doesn't follow job volume. Job ids are
/// UUIDs; this swaps any path segment that parses as one.
fn sanitize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| if looks_like_job_id(segment) { ":job_id" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

fn looks_like_job_id(segment: &str) -> bool {
    segment.len() >= 8
        && segment.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
        && segment.contains('-')
}

pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();
    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_path_collapses_job_ids() {
        assert_eq!(sanitize_path("/jobs/9f3a1e20-6b3e-4f8a-9c1d-5e2f6a7b8c9d"), "/jobs/:job_id");
        assert_eq!(sanitize_path("/jobs/9f3a1e20-6b3e-4f8a-9c1d-5e2f6a7b8c9d/cancel"), "/jobs/:job_id/cancel");
        assert_eq!(sanitize_path("/catalog/voices"), "/catalog/voices");
    }
}
