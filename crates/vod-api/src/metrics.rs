//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "vodhub_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vodhub_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vodhub_http_requests_in_flight";

    pub const PAGES_SERVED_TOTAL: &str = "vodhub_pages_served_total";
    pub const JOBS_ENQUEUED_TOTAL: &str = "vodhub_jobs_enqueued_total";
    pub const WEBHOOKS_RECEIVED_TOTAL: &str = "vodhub_webhooks_received_total";
    pub const RATE_LIMIT_HITS_TOTAL: &str = "vodhub_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a served list page.
pub fn record_page_served(listing: &str) {
    let labels = [("listing", listing.to_string())];
    counter!(names::PAGES_SERVED_TOTAL, &labels).increment(1);
}

/// Record a generation job enqueued.
pub fn record_job_enqueued(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::JOBS_ENQUEUED_TOTAL, &labels).increment(1);
}

/// Record a provider webhook delivery.
pub fn record_webhook(event_type: &str) {
    let labels = [("event", event_type.to_string())];
    counter!(names::WEBHOOKS_RECEIVED_TOTAL, &labels).increment(1);
}

/// Record a rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (collapse ids into placeholders).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(
        r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    )
    .unwrap()
    .replace_all(path, ":id");
    let path = regex_lite::Regex::new(r"/videos/[a-zA-Z0-9_-]{16,}")
        .unwrap()
        .replace_all(&path, "/videos/:id");
    let path = regex_lite::Regex::new(r"/playlists/[a-zA-Z0-9_-]{16,}")
        .unwrap()
        .replace_all(&path, "/playlists/:id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
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
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/videos/550e8400-e29b-41d4-a716-446655440000"),
            "/api/videos/:id"
        );
        assert_eq!(
            sanitize_path("/api/playlists/0123456789abcdefghij/videos"),
            "/api/playlists/:id/videos"
        );
        assert_eq!(sanitize_path("/api/videos/trending"), "/api/videos/trending");
    }
}
