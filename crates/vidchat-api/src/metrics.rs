//! Prometheus metrics for the API server.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vidchat_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vidchat_http_request_duration_seconds";

    // Domain metrics (recorded by the services)
    pub const VIDEOS_UPLOADED_TOTAL: &str = "vidchat_videos_uploaded_total";
    pub const VIDEOS_ANALYZED_TOTAL: &str = "vidchat_videos_analyzed_total";
    pub const ANALYSIS_FAILURES_TOTAL: &str = "vidchat_analysis_failures_total";
    pub const CHAT_MESSAGES_TOTAL: &str = "vidchat_chat_messages_total";
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

/// Collapse ID-shaped path segments so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if looks_like_id(segment) {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn looks_like_id(segment: &str) -> bool {
    segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_collapses_uuids() {
        assert_eq!(
            sanitize_path("/api/video/550e8400-e29b-41d4-a716-446655440000"),
            "/api/video/:id"
        );
        assert_eq!(sanitize_path("/api/videos"), "/api/videos");
        assert_eq!(sanitize_path("/"), "/");
    }
}
