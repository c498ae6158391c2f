//! Video record models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
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

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle state of a video.
///
/// Internally tagged so the stored document carries plain `status`,
/// `analysis` and `error` fields, while the pairing rules (`analysis`
/// present iff analyzed, `error` present iff failed) hold by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VideoState {
    /// Uploaded, not yet analyzed
    Uploaded,
    /// Analysis completed
    Analyzed { analysis: String },
    /// Last analysis attempt failed
    Error { error: String },
}

impl VideoState {
    /// Status label as stored in the `status` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoState::Uploaded => "uploaded",
            VideoState::Analyzed { .. } => "analyzed",
            VideoState::Error { .. } => "error",
        }
    }

    /// Analysis text, when analyzed.
    pub fn analysis(&self) -> Option<&str> {
        match self {
            VideoState::Analyzed { analysis } => Some(analysis),
            _ => None,
        }
    }

    /// Failure description, when in the error state.
    pub fn error(&self) -> Option<&str> {
        match self {
            VideoState::Error { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_analyzed(&self) -> bool {
        matches!(self, VideoState::Analyzed { .. })
    }
}

impl fmt::Display for VideoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Video metadata and lifecycle state, stored in the `videos` collection.
///
/// Timestamps serialize as RFC 3339 strings, so the same shape serves both
/// the wire format and the stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Unique video ID (primary key of the collection)
    pub video_id: VideoId,

    /// Original filename as supplied by the client
    pub filename: String,

    /// Declared media type (always `video/*`)
    pub content_type: String,

    /// Size in bytes at upload time
    pub size: i64,

    /// Locator into the blob store
    pub file_path: String,

    /// Lifecycle state (`status` plus its paired field)
    #[serde(flatten)]
    pub state: VideoState,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Create a freshly uploaded record.
    pub fn new(
        video_id: VideoId,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        size: i64,
        file_path: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            video_id,
            filename: filename.into(),
            content_type: content_type.into(),
            size,
            file_path: file_path.into(),
            state: VideoState::Uploaded,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark as analyzed.
    pub fn with_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.state = VideoState::Analyzed {
            analysis: analysis.into(),
        };
        self.updated_at = Utc::now();
        self
    }

    /// Mark as failed.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.state = VideoState::Error {
            error: error.into(),
        };
        self.updated_at = Utc::now();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_generation() {
        let id1 = VideoId::new();
        let id2 = VideoId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_record_is_uploaded() {
        let record = VideoRecord::new(
            VideoId::new(),
            "clip.mp4",
            "video/mp4",
            2_097_152,
            "/app/uploads/abc.mp4",
        );
        assert_eq!(record.state, VideoState::Uploaded);
        assert!(record.state.analysis().is_none());
        assert_eq!(record.size, 2_097_152);
    }

    #[test]
    fn test_state_serializes_as_flat_fields() {
        let record = VideoRecord::new(VideoId::from("v1"), "a.mp4", "video/mp4", 1, "p");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "uploaded");
        assert!(json.get("analysis").is_none());

        let analyzed = record.with_analysis("Summary: ...");
        let json = serde_json::to_value(&analyzed).unwrap();
        assert_eq!(json["status"], "analyzed");
        assert_eq!(json["analysis"], "Summary: ...");
    }

    #[test]
    fn test_analysis_and_status_cannot_tear() {
        // A document claiming "analyzed" without an analysis text must not
        // deserialize into a valid state.
        let torn = serde_json::json!({
            "video_id": "v1",
            "filename": "a.mp4",
            "content_type": "video/mp4",
            "size": 1,
            "file_path": "p",
            "status": "analyzed",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z",
        });
        assert!(serde_json::from_value::<VideoRecord>(torn).is_err());
    }

    #[test]
    fn test_error_state_round_trip() {
        let record = VideoRecord::new(VideoId::from("v2"), "b.mov", "video/quicktime", 9, "p")
            .with_error("gateway unreachable");
        let json = serde_json::to_string(&record).unwrap();
        let back: VideoRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state.error(), Some("gateway unreachable"));
        assert_eq!(back.state.as_str(), "error");
    }
}
