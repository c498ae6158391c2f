//! Application state.

use std::sync::Arc;

use vidchat_gemini::{GeminiClient, LlmGateway};
use vidchat_mongo::{ChatRepository, MongoClient, VideoRepository};
use vidchat_storage::BlobStore;

use crate::config::ApiConfig;
use crate::services::{AnalysisMode, ChatSessionManager, VideoLifecycleManager};

/// Shared application state.
///
/// All external clients are constructed once and injected into the two
/// managers; there is no ambient global state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub mongo: Arc<MongoClient>,
    pub storage: Arc<BlobStore>,
    pub lifecycle: Arc<VideoLifecycleManager>,
    pub chat: Arc<ChatSessionManager>,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let storage = Arc::new(BlobStore::from_env().await?);
        let mongo = Arc::new(MongoClient::from_env().await?);
        // The API key is checked per call, so a missing credential does not
        // prevent startup.
        let gateway: Arc<dyn LlmGateway> = Arc::new(GeminiClient::from_env());

        Ok(Self::from_parts(config, mongo, storage, gateway))
    }

    /// Assemble state from already-constructed clients.
    pub fn from_parts(
        config: ApiConfig,
        mongo: Arc<MongoClient>,
        storage: Arc<BlobStore>,
        gateway: Arc<dyn LlmGateway>,
    ) -> Self {
        let videos = VideoRepository::new(&mongo);
        let chats = ChatRepository::new(&mongo);

        let exclusive = std::env::var("ANALYZE_EXCLUSIVE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let lifecycle = Arc::new(VideoLifecycleManager::new(
            videos.clone(),
            Arc::clone(&storage),
            Arc::clone(&gateway),
            AnalysisMode::from_env(),
            exclusive,
        ));
        let chat = Arc::new(ChatSessionManager::new(videos, chats, gateway));

        Self {
            config,
            mongo,
            storage,
            lifecycle,
            chat,
        }
    }
}
