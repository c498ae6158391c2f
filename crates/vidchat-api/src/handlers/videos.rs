//! Video API handlers.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;

use vidchat_models::{VideoId, VideoRecord};
use vidchat_mongo::VideoRepository;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Upload response.
#[derive(Serialize)]
pub struct UploadResponse {
    pub video_id: String,
    pub filename: String,
    pub status: String,
    pub message: String,
}

/// Upload a video file.
///
/// Expects a multipart request with the bytes in a `file` field.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.mp4").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        let record = state
            .lifecycle
            .register(&filename, &content_type, &data)
            .await?;

        return Ok(Json(UploadResponse {
            video_id: record.video_id.to_string(),
            filename: record.filename,
            status: record.state.as_str().to_string(),
            message: "Video uploaded successfully".to_string(),
        }));
    }

    Err(ApiError::bad_request("No file field in upload"))
}

/// Analyze response.
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub video_id: String,
    pub status: String,
    pub analysis: String,
    pub message: String,
}

/// Analyze an uploaded video.
pub async fn analyze_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let video_id = VideoId::from_string(video_id);
    let analysis = state.lifecycle.analyze(&video_id).await?;

    Ok(Json(AnalyzeResponse {
        video_id: video_id.to_string(),
        status: "analyzed".to_string(),
        analysis,
        message: "Video analyzed successfully".to_string(),
    }))
}

/// Video list response.
#[derive(Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<VideoRecord>,
}

/// List uploaded videos.
pub async fn get_videos(State(state): State<AppState>) -> ApiResult<Json<VideoListResponse>> {
    let videos = VideoRepository::new(&state.mongo).list().await?;
    Ok(Json(VideoListResponse { videos }))
}

/// Get one video by ID.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoRecord>> {
    let video_id = VideoId::from_string(video_id);
    let video = VideoRepository::new(&state.mongo)
        .get(&video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;
    Ok(Json(video))
}
