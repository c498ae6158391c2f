//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::handlers::chat::{chat_with_video, get_chat_history};
use crate::handlers::health::{health_check, ready, root};
use crate::handlers::videos::{analyze_video, get_video, get_videos, upload_video};
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready))
        .route("/upload-video", post(upload_video))
        .route("/analyze-video/:video_id", post(analyze_video))
        .route("/chat", post(chat_with_video))
        .route("/videos", get(get_videos))
        .route("/video/:video_id", get(get_video))
        .route("/chats/:video_id", get(get_chat_history));

    let mut router = Router::new().route("/", get(root)).nest("/api", api_routes);

    if let Some(handle) = metrics_handle {
        router = router.route("/metrics", get(move || async move { handle.render() }));
    }

    router
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .with_state(state)
}
