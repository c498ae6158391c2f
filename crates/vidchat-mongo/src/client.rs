//! MongoDB client wrapper.

use mongodb::bson::doc;
use mongodb::{Client, Collection, Database};
use tracing::info;

use vidchat_models::{ChatMessage, VideoRecord};

use crate::error::{MongoError, MongoResult};

/// Collection names.
const VIDEOS_COLLECTION: &str = "videos";
const CHATS_COLLECTION: &str = "chats";

/// MongoDB client configuration.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string
    pub uri: String,
    /// Database name
    pub database: String,
}

impl MongoConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            uri: std::env::var("MONGO_URL")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: std::env::var("MONGO_DB").unwrap_or_else(|_| "video_chat_db".to_string()),
        }
    }
}

/// Typed handle on the video-chat database.
#[derive(Clone)]
pub struct MongoClient {
    db: Database,
}

impl MongoClient {
    /// Create a new client from configuration.
    ///
    /// Connection establishment is lazy; the first operation (or `ping`)
    /// performs the actual handshake.
    pub async fn new(config: MongoConfig) -> MongoResult<Self> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|e| MongoError::config_error(format!("Invalid MongoDB URI: {}", e)))?;
        let db = client.database(&config.database);
        info!("MongoDB client created for database {}", config.database);
        Ok(Self { db })
    }

    /// Create from environment variables.
    pub async fn from_env() -> MongoResult<Self> {
        Self::new(MongoConfig::from_env()).await
    }

    /// Videos collection.
    pub fn videos(&self) -> Collection<VideoRecord> {
        self.db.collection(VIDEOS_COLLECTION)
    }

    /// Chat messages collection.
    pub fn chats(&self) -> Collection<ChatMessage> {
        self.db.collection(CHATS_COLLECTION)
    }

    /// Round-trip to the server, for readiness probes.
    pub async fn ping(&self) -> MongoResult<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}
