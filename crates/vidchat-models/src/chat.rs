//! Chat message models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::video::VideoId;

/// Identifier grouping a sequence of chat turns about one video.
///
/// Generated server-side on the first turn of a session, supplied by the
/// client thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One exchanged turn, stored in the `chats` collection.
///
/// Messages are append-only: once written they are never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Video this turn is about
    pub video_id: VideoId,

    /// Session grouping consecutive turns
    pub session_id: SessionId,

    /// What the user asked
    pub user_message: String,

    /// What the model answered
    pub ai_response: String,

    /// Server-side insert time
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new turn, stamped with the current server time.
    pub fn new(
        video_id: VideoId,
        session_id: SessionId,
        user_message: impl Into<String>,
        ai_response: impl Into<String>,
    ) -> Self {
        Self {
            video_id,
            session_id,
            user_message: user_message.into(),
            ai_response: ai_response.into(),
            timestamp: Utc::now(),
        }
    }
}
