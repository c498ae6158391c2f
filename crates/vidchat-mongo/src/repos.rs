//! Typed repositories for Videos and ChatMessages.

use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneOptions, FindOptions};
use mongodb::Collection;
use tracing::info;

use vidchat_models::{ChatMessage, SessionId, VideoId, VideoRecord};

use crate::client::MongoClient;
use crate::error::{MongoError, MongoResult};

/// Repository for video records.
#[derive(Clone)]
pub struct VideoRepository {
    collection: Collection<VideoRecord>,
}

impl VideoRepository {
    /// Create a new video repository.
    pub fn new(client: &MongoClient) -> Self {
        Self {
            collection: client.videos(),
        }
    }

    /// Insert a freshly uploaded record.
    pub async fn create(&self, video: &VideoRecord) -> MongoResult<()> {
        self.collection.insert_one(video, None).await?;
        info!("Created video record: {}", video.video_id);
        Ok(())
    }

    /// Get a video by ID.
    pub async fn get(&self, video_id: &VideoId) -> MongoResult<Option<VideoRecord>> {
        let options = FindOneOptions::builder()
            .projection(doc! { "_id": 0 })
            .build();
        let record = self
            .collection
            .find_one(doc! { "video_id": video_id.as_str() }, options)
            .await?;
        Ok(record)
    }

    /// List all videos, oldest first.
    pub async fn list(&self) -> MongoResult<Vec<VideoRecord>> {
        let options = FindOptions::builder()
            .projection(doc! { "_id": 0 })
            .sort(doc! { "created_at": 1 })
            .build();
        let cursor = self.collection.find(doc! {}, options).await?;
        let videos = cursor.try_collect().await?;
        Ok(videos)
    }

    /// Transition a video to `analyzed`, storing its analysis text.
    ///
    /// Status and analysis move in a single update, and any stale `error`
    /// field from a previous failed attempt is cleared in the same write.
    pub async fn set_analyzed(&self, video_id: &VideoId, analysis: &str) -> MongoResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "video_id": video_id.as_str() },
                doc! {
                    "$set": {
                        "status": "analyzed",
                        "analysis": analysis,
                        "updated_at": chrono::Utc::now().to_rfc3339(),
                    },
                    "$unset": { "error": "" },
                },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(MongoError::not_found(video_id.as_str()));
        }
        info!("Video {} marked analyzed", video_id);
        Ok(())
    }

    /// Transition a video to `error`, storing the failure description.
    ///
    /// The `analysis` field is cleared in the same write so a reader can
    /// never observe the error status alongside stale analysis text.
    pub async fn set_error(&self, video_id: &VideoId, error: &str) -> MongoResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "video_id": video_id.as_str() },
                doc! {
                    "$set": {
                        "status": "error",
                        "error": error,
                        "updated_at": chrono::Utc::now().to_rfc3339(),
                    },
                    "$unset": { "analysis": "" },
                },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(MongoError::not_found(video_id.as_str()));
        }
        info!("Video {} marked failed: {}", video_id, error);
        Ok(())
    }
}

/// Repository for the chat history log.
#[derive(Clone)]
pub struct ChatRepository {
    collection: Collection<ChatMessage>,
}

impl ChatRepository {
    /// Create a new chat repository.
    pub fn new(client: &MongoClient) -> Self {
        Self {
            collection: client.chats(),
        }
    }

    /// Append one turn to the log.
    pub async fn append(&self, message: &ChatMessage) -> MongoResult<()> {
        self.collection.insert_one(message, None).await?;
        info!(
            "Appended chat turn for video {} session {}",
            message.video_id, message.session_id
        );
        Ok(())
    }

    /// Chat history for a video, in insertion order.
    ///
    /// Filters by session when one is supplied; an empty result is not an
    /// error.
    pub async fn history(
        &self,
        video_id: &VideoId,
        session_id: Option<&SessionId>,
    ) -> MongoResult<Vec<ChatMessage>> {
        let mut filter = doc! { "video_id": video_id.as_str() };
        if let Some(session) = session_id {
            filter.insert("session_id", session.as_str());
        }

        let options = FindOptions::builder()
            .projection(doc! { "_id": 0 })
            .sort(doc! { "timestamp": 1 })
            .build();
        let cursor = self.collection.find(filter, options).await?;
        let messages = cursor.try_collect().await?;
        Ok(messages)
    }
}
