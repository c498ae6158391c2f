//! Video lifecycle service.
//!
//! Owns the upload → analyze → analyzed/error state machine and the two
//! analysis strategies (video attachment vs metadata-only simulation).

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use metrics::counter;
use thiserror::Error;
use tracing::{error, info};

use vidchat_gemini::{Attachment, GatewayError, LlmGateway};
use vidchat_models::{VideoId, VideoRecord};
use vidchat_mongo::{MongoError, VideoRepository};
use vidchat_storage::{BlobStore, StorageError};

use crate::metrics::names;

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Errors from the video lifecycle service.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("File must be a video, got media type {0:?}")]
    InvalidMediaType(String),

    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("Gateway not configured: {0}")]
    Configuration(String),

    #[error("Analysis already in progress for video {0}")]
    AnalysisInProgress(String),

    #[error("Failed to analyze video: {0}")]
    AnalysisFailed(#[source] GatewayError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Db(#[from] MongoError),
}

/// How the analysis request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Attach the stored video bytes to the completion request
    #[default]
    AttachVideo,
    /// Synthesize the analysis from filename/size metadata only, with no
    /// attachment
    MetadataOnly,
}

impl AnalysisMode {
    /// Read the mode from `ANALYSIS_MODE` (`attach` | `metadata`).
    pub fn from_env() -> Self {
        match std::env::var("ANALYSIS_MODE").as_deref() {
            Ok("metadata") => Self::MetadataOnly,
            _ => Self::AttachVideo,
        }
    }
}

/// System instruction for the analysis request.
const ANALYSIS_SYSTEM_PROMPT: &str = "You are a helpful AI assistant that analyzes videos. \
    Provide detailed, structured analysis of video content including key topics, speakers, \
    main points, and timestamps when possible.";

/// User message for the analysis request.
const ANALYSIS_USER_PROMPT: &str = "Please provide a comprehensive analysis of this video. \
    Include: 1) Summary of main content, 2) Key topics discussed, 3) Important timestamps \
    if applicable, 4) Any notable speakers or participants, 5) Overall structure of the \
    video. Make this analysis detailed enough that I can have meaningful conversations \
    about the video content.";

/// Build the user prompt and optional attachment for an analysis request.
fn analysis_request(record: &VideoRecord, mode: AnalysisMode) -> (String, Option<Attachment>) {
    match mode {
        AnalysisMode::AttachVideo => (
            ANALYSIS_USER_PROMPT.to_string(),
            Some(Attachment {
                path: record.file_path.clone(),
                mime_type: record.content_type.clone(),
            }),
        ),
        AnalysisMode::MetadataOnly => (
            format!(
                "{}\n\nNo video attachment is available. The only known facts are the \
                 file metadata: filename {:?}, media type {}, size {} bytes. Produce the \
                 analysis from this metadata alone and state clearly which parts are \
                 inferred rather than observed.",
                ANALYSIS_USER_PROMPT, record.filename, record.content_type, record.size
            ),
            None,
        ),
    }
}

/// Owns the video state machine: upload, analyze, and the persisted
/// transitions between `uploaded`, `analyzed` and `error`.
pub struct VideoLifecycleManager {
    videos: VideoRepository,
    blobs: Arc<BlobStore>,
    gateway: Arc<dyn LlmGateway>,
    mode: AnalysisMode,
    /// When set, concurrent `analyze` calls on one video are rejected
    /// instead of racing last-writer-wins.
    exclusive: bool,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl VideoLifecycleManager {
    /// Create a new lifecycle manager from injected clients.
    pub fn new(
        videos: VideoRepository,
        blobs: Arc<BlobStore>,
        gateway: Arc<dyn LlmGateway>,
        mode: AnalysisMode,
        exclusive: bool,
    ) -> Self {
        Self {
            videos,
            blobs,
            gateway,
            mode,
            exclusive,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Validate and persist an upload: one blob write, one document insert.
    pub async fn register(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> LifecycleResult<VideoRecord> {
        if !content_type.starts_with("video/") {
            return Err(LifecycleError::InvalidMediaType(content_type.to_string()));
        }

        let video_id = VideoId::new();
        let blob = self.blobs.store_video(&video_id, filename, data).await?;
        let record = VideoRecord::new(video_id, filename, content_type, blob.size, blob.path);
        self.videos.create(&record).await?;

        counter!(names::VIDEOS_UPLOADED_TOTAL).increment(1);
        info!("Video uploaded successfully: {}", record.video_id);
        Ok(record)
    }

    /// Run the analysis and persist the resulting state transition.
    ///
    /// Success writes `analyzed` + analysis text in one document update;
    /// a gateway or IO failure writes `error` + the failure description, so
    /// a concurrent reader never observes a torn pairing. A missing
    /// credential is a precondition failure and mutates nothing.
    pub async fn analyze(&self, video_id: &VideoId) -> LifecycleResult<String> {
        let record = self
            .videos
            .get(video_id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(video_id.to_string()))?;

        let _slot = self.acquire_slot(video_id)?;

        let (user_prompt, attachment) = analysis_request(&record, self.mode);
        match self
            .gateway
            .complete(ANALYSIS_SYSTEM_PROMPT, &user_prompt, attachment.as_ref())
            .await
        {
            Ok(analysis) => {
                self.videos.set_analyzed(video_id, &analysis).await?;
                counter!(names::VIDEOS_ANALYZED_TOTAL).increment(1);
                info!("Video analyzed successfully: {}", video_id);
                Ok(analysis)
            }
            Err(GatewayError::Configuration(msg)) => Err(LifecycleError::Configuration(msg)),
            Err(e) => {
                counter!(names::ANALYSIS_FAILURES_TOTAL).increment(1);
                error!("Error analyzing video {}: {}", video_id, e);
                if let Err(db_err) = self.videos.set_error(video_id, &e.to_string()).await {
                    error!(
                        "Failed to record analysis failure for {}: {}",
                        video_id, db_err
                    );
                }
                Err(LifecycleError::AnalysisFailed(e))
            }
        }
    }

    /// Claim the per-video in-flight slot when exclusive mode is on.
    ///
    /// The returned guard releases the slot when the analysis call
    /// completes, whatever the outcome.
    fn acquire_slot(&self, video_id: &VideoId) -> LifecycleResult<Option<impl Drop + Send>> {
        if !self.exclusive {
            return Ok(None);
        }

        let id = video_id.to_string();
        {
            let mut in_flight = self
                .in_flight
                .lock()
                .expect("in-flight analysis set poisoned");
            if !in_flight.insert(id.clone()) {
                return Err(LifecycleError::AnalysisInProgress(id));
            }
        }

        let set = Arc::clone(&self.in_flight);
        Ok(Some(scopeguard::guard((), move |_| {
            set.lock()
                .expect("in-flight analysis set poisoned")
                .remove(&id);
        })))
    }
}
