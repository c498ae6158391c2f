//! Service-level tests for the lifecycle and chat managers.
//!
//! These exercise the managers directly against a live MongoDB with stubbed
//! gateways, and are ignored by default.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use vidchat_api::services::{
    AnalysisMode, ChatError, ChatSessionManager, LifecycleError, VideoLifecycleManager,
};
use vidchat_gemini::{Attachment, GatewayError, GatewayResult, LlmGateway};
use vidchat_models::{VideoId, VideoState};
use vidchat_mongo::{ChatRepository, MongoClient, MongoConfig, VideoRepository};
use vidchat_storage::{BlobStore, StorageConfig};

/// Gateway stub that pops scripted results, recording whether each call
/// carried an attachment.
struct ScriptedGateway {
    replies: Mutex<VecDeque<GatewayResult<String>>>,
    saw_attachment: Mutex<Vec<bool>>,
}

impl ScriptedGateway {
    fn new(replies: Vec<GatewayResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            saw_attachment: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl LlmGateway for ScriptedGateway {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_text: &str,
        attachment: Option<&Attachment>,
    ) -> GatewayResult<String> {
        self.saw_attachment.lock().unwrap().push(attachment.is_some());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("default reply".to_string()))
    }
}

struct TestEnv {
    videos: VideoRepository,
    chats: ChatRepository,
    storage: Arc<BlobStore>,
}

async fn test_env() -> TestEnv {
    dotenvy::dotenv().ok();
    let mongo = MongoClient::new(MongoConfig {
        uri: std::env::var("MONGO_URL").unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
        database: "video_chat_db_test".to_string(),
    })
    .await
    .expect("Failed to create MongoDB client");

    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(
        BlobStore::new(StorageConfig {
            root: dir.into_path(),
        })
        .await
        .unwrap(),
    );

    TestEnv {
        videos: VideoRepository::new(&mongo),
        chats: ChatRepository::new(&mongo),
        storage,
    }
}

fn lifecycle(
    env: &TestEnv,
    gateway: Arc<ScriptedGateway>,
    mode: AnalysisMode,
    exclusive: bool,
) -> VideoLifecycleManager {
    VideoLifecycleManager::new(
        env.videos.clone(),
        Arc::clone(&env.storage),
        gateway,
        mode,
        exclusive,
    )
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_spec_scenario_upload_analyze_chat_history() {
    let env = test_env().await;
    let gateway = ScriptedGateway::new(vec![
        Ok("Summary: a video about cats".to_string()),
        Ok("The video shows cats.".to_string()),
        Ok("They are playing.".to_string()),
    ]);

    let manager = lifecycle(&env, Arc::clone(&gateway), AnalysisMode::AttachVideo, false);
    let chat = ChatSessionManager::new(env.videos.clone(), env.chats.clone(), gateway.clone());

    // Upload 2 MiB of video/mp4
    let data = vec![0u8; 2 * 1024 * 1024];
    let record = manager.register("clip.mp4", "video/mp4", &data).await.unwrap();
    assert_eq!(record.state, VideoState::Uploaded);
    assert_eq!(record.size, 2_097_152);

    // Analyze
    let analysis = manager.analyze(&record.video_id).await.unwrap();
    assert_eq!(analysis, "Summary: a video about cats");
    let stored = env.videos.get(&record.video_id).await.unwrap().unwrap();
    assert_eq!(stored.state.analysis(), Some("Summary: a video about cats"));
    assert_eq!(gateway.saw_attachment.lock().unwrap().as_slice(), &[true]);

    // First chat turn: fresh session id
    let (response, session_id) = chat
        .send(&record.video_id, "What is this about?", None)
        .await
        .unwrap();
    assert_eq!(response, "The video shows cats.");

    // Second turn continues the same session
    let (_, session_again) = chat
        .send(&record.video_id, "What are they doing?", Some(session_id.clone()))
        .await
        .unwrap();
    assert_eq!(session_again, session_id);

    // History is insertion-ordered and filterable by session
    let history = chat.history(&record.video_id, None).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].user_message, "What is this about?");
    assert_eq!(history[1].user_message, "What are they doing?");

    let session_history = chat
        .history(&record.video_id, Some(&session_id))
        .await
        .unwrap();
    assert_eq!(session_history.len(), 2);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_register_rejects_non_video_without_side_effects() {
    let env = test_env().await;
    let gateway = ScriptedGateway::new(vec![]);
    let manager = lifecycle(&env, gateway, AnalysisMode::AttachVideo, false);

    let err = manager.register("notes.txt", "text/plain", b"text").await.unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidMediaType(_)));
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_gateway_failure_marks_video_error() {
    let env = test_env().await;
    let gateway = ScriptedGateway::new(vec![Err(GatewayError::request_failed(
        "Gemini API returned 500",
    ))]);
    let manager = lifecycle(&env, gateway, AnalysisMode::AttachVideo, false);

    let record = manager.register("clip.mp4", "video/mp4", b"bytes").await.unwrap();
    let err = manager.analyze(&record.video_id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::AnalysisFailed(_)));

    let stored = env.videos.get(&record.video_id).await.unwrap().unwrap();
    assert_eq!(stored.state.as_str(), "error");
    assert!(stored.state.analysis().is_none());
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_missing_credential_does_not_mutate_state() {
    let env = test_env().await;
    let gateway = ScriptedGateway::new(vec![Err(GatewayError::configuration(
        "GEMINI_API_KEY not set",
    ))]);
    let manager = lifecycle(&env, gateway, AnalysisMode::AttachVideo, false);

    let record = manager.register("clip.mp4", "video/mp4", b"bytes").await.unwrap();
    let err = manager.analyze(&record.video_id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Configuration(_)));

    let stored = env.videos.get(&record.video_id).await.unwrap().unwrap();
    assert_eq!(stored.state, VideoState::Uploaded);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_reanalysis_recovers_from_error_state() {
    let env = test_env().await;
    let gateway = ScriptedGateway::new(vec![
        Err(GatewayError::request_failed("transient upstream failure")),
        Ok("Summary: recovered".to_string()),
    ]);
    let manager = lifecycle(&env, gateway, AnalysisMode::AttachVideo, false);

    let record = manager.register("clip.mp4", "video/mp4", b"bytes").await.unwrap();
    assert!(manager.analyze(&record.video_id).await.is_err());

    let analysis = manager.analyze(&record.video_id).await.unwrap();
    assert_eq!(analysis, "Summary: recovered");

    let stored = env.videos.get(&record.video_id).await.unwrap().unwrap();
    assert_eq!(stored.state.analysis(), Some("Summary: recovered"));
    assert!(stored.state.error().is_none());
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_metadata_mode_sends_no_attachment() {
    let env = test_env().await;
    let gateway = ScriptedGateway::new(vec![Ok("Inferred summary".to_string())]);
    let manager = lifecycle(&env, Arc::clone(&gateway), AnalysisMode::MetadataOnly, false);

    let record = manager.register("clip.mp4", "video/mp4", b"bytes").await.unwrap();
    manager.analyze(&record.video_id).await.unwrap();
    assert_eq!(gateway.saw_attachment.lock().unwrap().as_slice(), &[false]);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_chat_on_unanalyzed_video_appends_nothing() {
    let env = test_env().await;
    let gateway = ScriptedGateway::new(vec![]);
    let manager = lifecycle(&env, Arc::clone(&gateway), AnalysisMode::AttachVideo, false);
    let chat = ChatSessionManager::new(env.videos.clone(), env.chats.clone(), gateway);

    let record = manager.register("clip.mp4", "video/mp4", b"bytes").await.unwrap();
    let err = chat
        .send(&record.video_id, "too early", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::NotAnalyzed(_)));

    let history = chat.history(&record.video_id, None).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_chat_failure_leaves_no_partial_log_entry() {
    let env = test_env().await;
    let gateway = ScriptedGateway::new(vec![
        Ok("Summary: fine".to_string()),
        Err(GatewayError::request_failed("Gemini API returned 503")),
    ]);
    let manager = lifecycle(&env, Arc::clone(&gateway), AnalysisMode::AttachVideo, false);
    let chat = ChatSessionManager::new(env.videos.clone(), env.chats.clone(), gateway);

    let record = manager.register("clip.mp4", "video/mp4", b"bytes").await.unwrap();
    manager.analyze(&record.video_id).await.unwrap();

    let err = chat.send(&record.video_id, "hello?", None).await.unwrap_err();
    assert!(matches!(err, ChatError::ChatFailed(_)));

    let history = chat.history(&record.video_id, None).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_chat_on_unknown_video_is_not_found() {
    let env = test_env().await;
    let gateway = ScriptedGateway::new(vec![]);
    let chat = ChatSessionManager::new(env.videos.clone(), env.chats.clone(), gateway);

    let err = chat.send(&VideoId::new(), "anyone?", None).await.unwrap_err();
    assert!(matches!(err, ChatError::NotFound(_)));
}
