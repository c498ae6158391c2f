//! Chat API handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use vidchat_models::{ChatMessage, SessionId, VideoId};

use crate::error::ApiResult;
use crate::state::AppState;

/// Chat request body.
#[derive(Deserialize)]
pub struct ChatRequest {
    pub video_id: String,
    pub message: String,
    pub session_id: Option<String>,
}

/// Chat response.
#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub video_id: String,
    pub session_id: String,
}

/// Chat about an analyzed video.
pub async fn chat_with_video(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let video_id = VideoId::from_string(request.video_id);
    let session_id = request.session_id.map(SessionId::from_string);

    let (response, session_id) = state
        .chat
        .send(&video_id, &request.message, session_id)
        .await?;

    Ok(Json(ChatResponse {
        response,
        video_id: video_id.to_string(),
        session_id: session_id.to_string(),
    }))
}

/// History query params.
#[derive(Deserialize)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
}

/// Chat history response.
#[derive(Serialize)]
pub struct ChatHistoryResponse {
    pub chats: Vec<ChatMessage>,
}

/// Get chat history for a video.
pub async fn get_chat_history(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<ChatHistoryResponse>> {
    let video_id = VideoId::from_string(video_id);
    let session_id = query.session_id.map(SessionId::from_string);

    let chats = state.chat.history(&video_id, session_id.as_ref()).await?;

    Ok(Json(ChatHistoryResponse { chats }))
}
