//! Gemini API client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio_util::codec::{BytesCodec, FramedRead};
use tracing::{debug, info, warn};

use crate::error::{GatewayError, GatewayResult};

/// A file to attach to a completion request.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Path of the file in the blob store
    pub path: String,
    /// Declared media type
    pub mime_type: String,
}

/// Stateless text-completion gateway.
///
/// One interface for both request shapes: callers pass a system prompt, the
/// user's text, and optionally a file attachment when the backend supports
/// it.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        attachment: Option<&Attachment>,
    ) -> GatewayResult<String>;
}

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; checked per call so a missing credential surfaces as a
    /// call-time configuration error
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// API base URL
    pub api_base: String,
    /// Delay between Files API state polls
    pub file_poll_interval: Duration,
    /// Maximum number of state polls before giving up
    pub file_poll_attempts: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-pro".to_string(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            file_poll_interval: Duration::from_secs(5),
            file_poll_attempts: 60,
        }
    }
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-pro".to_string()),
            api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            file_poll_interval: Duration::from_secs(
                std::env::var("GEMINI_FILE_POLL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            file_poll_attempts: std::env::var("GEMINI_FILE_POLL_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
        }
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file_data: None,
        }
    }

    fn file(mime_type: impl Into<String>, file_uri: impl Into<String>) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                mime_type: mime_type.into(),
                file_uri: file_uri.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct FileData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(rename = "fileUri")]
    file_uri: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct UploadFileResponse {
    file: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    /// Resource name, e.g. `files/abc123` (used for state polling)
    name: String,
    /// URI referenced from `fileData` parts
    uri: String,
}

#[derive(Debug, Deserialize)]
struct FileState {
    #[serde(default)]
    state: Option<String>,
}

/// Extract the first candidate's text from a Gemini response.
fn extract_text(response: GeminiResponse) -> GatewayResult<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| GatewayError::invalid_response("No content in Gemini response"))
}

// =============================================================================
// Client
// =============================================================================

/// Gemini REST API client.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// No request timeout is set: analysis of a long video is a single
    /// blocking call and must not be cut short client-side.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::new(GeminiConfig::from_env())
    }

    fn api_key(&self) -> GatewayResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::configuration("GEMINI_API_KEY not set"))
    }

    /// Upload a video to the Files API, streaming it from disk.
    async fn upload_file(&self, api_key: &str, attachment: &Attachment) -> GatewayResult<UploadedFile> {
        let path = Path::new(&attachment.path);
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload")
            .to_string();

        let file = File::open(path).await?;
        let stream = FramedRead::new(file, BytesCodec::new());
        let body = reqwest::Body::wrap_stream(stream);

        let part = multipart::Part::stream(body)
            .file_name(file_name)
            .mime_str(&attachment.mime_type)
            .map_err(|e| GatewayError::request_failed(format!("Invalid media type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let url = format!("{}/upload/v1beta/files?key={}", self.config.api_base, api_key);
        debug!("Uploading attachment {} to Files API", attachment.path);

        let response = self.http.post(&url).multipart(form).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::request_failed(format!(
                "File upload returned {}: {}",
                status, body
            )));
        }

        let uploaded: UploadFileResponse = response.json().await?;
        info!("Uploaded attachment as {}", uploaded.file.name);
        Ok(uploaded.file)
    }

    /// Poll the Files API until the uploaded video becomes ACTIVE.
    ///
    /// Video files are processed asynchronously by the Files API and cannot
    /// be referenced from a completion request until then.
    async fn wait_until_active(&self, api_key: &str, file_name: &str) -> GatewayResult<()> {
        let url = format!("{}/v1beta/{}?key={}", self.config.api_base, file_name, api_key);

        for attempt in 0..self.config.file_poll_attempts {
            let state: FileState = self.http.get(&url).send().await?.json().await?;
            match state.state.as_deref() {
                Some("ACTIVE") => return Ok(()),
                Some("FAILED") => {
                    return Err(GatewayError::file_processing(
                        "Video processing failed upstream",
                    ))
                }
                other => {
                    debug!(
                        "Attachment {} not ready (state {:?}, attempt {})",
                        file_name, other, attempt
                    );
                }
            }
            tokio::time::sleep(self.config.file_poll_interval).await;
        }

        warn!("Attachment {} never became ACTIVE", file_name);
        Err(GatewayError::file_processing(
            "Timed out waiting for video processing",
        ))
    }
}

#[async_trait]
impl LlmGateway for GeminiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        attachment: Option<&Attachment>,
    ) -> GatewayResult<String> {
        let api_key = self.api_key()?.to_string();

        let mut parts = vec![Part::text(user_text)];
        if let Some(attachment) = attachment {
            let uploaded = self.upload_file(&api_key, attachment).await?;
            self.wait_until_active(&api_key, &uploaded.name).await?;
            parts.push(Part::file(attachment.mime_type.clone(), uploaded.uri));
        }

        let request = GenerateContentRequest {
            system_instruction: Some(Content {
                parts: vec![Part::text(system_prompt)],
            }),
            contents: vec![Content { parts }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.api_base, self.config.model, api_key
        );

        let response = self.http.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::request_failed(format!(
                "Gemini API returned {}: {}",
                status, body
            )));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        extract_text(gemini_response)
    }
}
