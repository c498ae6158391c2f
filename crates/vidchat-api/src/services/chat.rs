//! Chat session service.
//!
//! Grounds a multi-turn conversation in the stored analysis of one video
//! and appends every completed exchange to the chat log.

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::info;

use vidchat_gemini::{GatewayError, LlmGateway};
use vidchat_models::{ChatMessage, SessionId, VideoId};
use vidchat_mongo::{ChatRepository, MongoError, VideoRepository};

use crate::metrics::names;

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors from the chat session service.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("Video {0} not yet analyzed. Please analyze the video first.")]
    NotAnalyzed(String),

    #[error("Gateway not configured: {0}")]
    Configuration(String),

    #[error("Failed to process chat: {0}")]
    ChatFailed(#[source] GatewayError),

    #[error("Database error: {0}")]
    Db(#[from] MongoError),
}

/// Build the system prompt grounding the conversation in the analysis.
fn build_grounding_prompt(analysis: &str) -> String {
    format!(
        "You are a helpful AI assistant that can answer questions about a specific video.\n\n\
         Video Analysis:\n{}\n\n\
         Based on this video analysis, answer user questions about the video content. \
         Be specific and reference the video content when possible. If asked about \
         something not in the video, politely explain that the information is not \
         available in the video.",
        analysis
    )
}

/// Forwards user messages to the gateway with the video's analysis as
/// grounding, and maintains the append-only chat log.
pub struct ChatSessionManager {
    videos: VideoRepository,
    chats: ChatRepository,
    gateway: Arc<dyn LlmGateway>,
}

impl ChatSessionManager {
    /// Create a new chat session manager from injected clients.
    pub fn new(
        videos: VideoRepository,
        chats: ChatRepository,
        gateway: Arc<dyn LlmGateway>,
    ) -> Self {
        Self {
            videos,
            chats,
            gateway,
        }
    }

    /// Send one message about an analyzed video.
    ///
    /// Generates a fresh session ID on the first turn. The turn is only
    /// appended to the log after the gateway answered, so a failed call
    /// leaves no partial entry.
    pub async fn send(
        &self,
        video_id: &VideoId,
        message: &str,
        session_id: Option<SessionId>,
    ) -> ChatResult<(String, SessionId)> {
        let record = self
            .videos
            .get(video_id)
            .await?
            .ok_or_else(|| ChatError::NotFound(video_id.to_string()))?;

        let analysis = record
            .state
            .analysis()
            .ok_or_else(|| ChatError::NotAnalyzed(video_id.to_string()))?;

        let session_id = session_id.unwrap_or_else(SessionId::new);
        let system_prompt = build_grounding_prompt(analysis);

        let response = match self.gateway.complete(&system_prompt, message, None).await {
            Ok(response) => response,
            Err(GatewayError::Configuration(msg)) => return Err(ChatError::Configuration(msg)),
            Err(e) => return Err(ChatError::ChatFailed(e)),
        };

        let turn = ChatMessage::new(
            video_id.clone(),
            session_id.clone(),
            message,
            response.as_str(),
        );
        self.chats.append(&turn).await?;

        counter!(names::CHAT_MESSAGES_TOTAL).increment(1);
        info!("Chat completed for video {}", video_id);
        Ok((response, session_id))
    }

    /// Chat history for a video, optionally narrowed to one session.
    ///
    /// No match is an empty sequence, not an error.
    pub async fn history(
        &self,
        video_id: &VideoId,
        session_id: Option<&SessionId>,
    ) -> ChatResult<Vec<ChatMessage>> {
        Ok(self.chats.history(video_id, session_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grounding_prompt_embeds_analysis_verbatim() {
        let prompt = build_grounding_prompt("Video about cats");
        assert!(prompt.contains("Video Analysis:\nVideo about cats"));
        assert!(prompt.contains("not available in the video"));
    }
}
