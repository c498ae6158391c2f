//! Repository integration tests.
//!
//! These run against a live MongoDB (`MONGO_URL`, defaulting to localhost)
//! and are ignored by default.

use vidchat_models::{ChatMessage, SessionId, VideoId, VideoRecord, VideoState};
use vidchat_mongo::{ChatRepository, MongoClient, MongoConfig, VideoRepository};

async fn test_client() -> MongoClient {
    dotenvy::dotenv().ok();
    let mut config = MongoConfig::from_env();
    config.database = "video_chat_db_test".to_string();
    MongoClient::new(config).await.expect("Failed to create MongoDB client")
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_video_lifecycle_round_trip() {
    let client = test_client().await;
    let repo = VideoRepository::new(&client);

    let video_id = VideoId::new();
    let record = VideoRecord::new(
        video_id.clone(),
        "integration.mp4",
        "video/mp4",
        1024,
        "/tmp/integration.mp4",
    );

    repo.create(&record).await.expect("Failed to create video");

    let fetched = repo.get(&video_id).await.expect("Failed to get video");
    let fetched = fetched.expect("Video missing after insert");
    assert_eq!(fetched.state, VideoState::Uploaded);
    assert_eq!(fetched.size, 1024);

    repo.set_analyzed(&video_id, "Summary: a test clip")
        .await
        .expect("Failed to mark analyzed");

    let analyzed = repo.get(&video_id).await.unwrap().unwrap();
    assert_eq!(analyzed.state.analysis(), Some("Summary: a test clip"));

    repo.set_error(&video_id, "gateway unreachable")
        .await
        .expect("Failed to mark failed");

    let failed = repo.get(&video_id).await.unwrap().unwrap();
    assert_eq!(failed.state.error(), Some("gateway unreachable"));
    assert!(failed.state.analysis().is_none());
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_set_analyzed_unknown_video_is_not_found() {
    let client = test_client().await;
    let repo = VideoRepository::new(&client);

    let err = repo
        .set_analyzed(&VideoId::new(), "whatever")
        .await
        .unwrap_err();
    assert!(matches!(err, vidchat_mongo::MongoError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn test_chat_history_ordering_and_session_filter() {
    let client = test_client().await;
    let repo = ChatRepository::new(&client);

    let video_id = VideoId::new();
    let session_a = SessionId::new();
    let session_b = SessionId::new();

    for (session, question) in [
        (&session_a, "first question"),
        (&session_a, "second question"),
        (&session_b, "other session"),
    ] {
        repo.append(&ChatMessage::new(
            video_id.clone(),
            session.clone(),
            question,
            "an answer",
        ))
        .await
        .expect("Failed to append chat turn");
    }

    let all = repo.history(&video_id, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].user_message, "first question");
    assert_eq!(all[1].user_message, "second question");

    let only_a = repo.history(&video_id, Some(&session_a)).await.unwrap();
    assert_eq!(only_a.len(), 2);
    assert!(only_a.iter().all(|m| m.session_id == session_a));

    let none = repo.history(&VideoId::new(), None).await.unwrap();
    assert!(none.is_empty());
}
