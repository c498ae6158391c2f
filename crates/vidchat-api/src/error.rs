//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vidchat_mongo::MongoError;

use crate::services::{ChatError, LifecycleError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("Database error: {0}")]
    Db(#[from] MongoError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Lifecycle(e) => match e {
                LifecycleError::InvalidMediaType(_) => StatusCode::BAD_REQUEST,
                LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
                LifecycleError::AnalysisInProgress(_) => StatusCode::CONFLICT,
                LifecycleError::Configuration(_)
                | LifecycleError::AnalysisFailed(_)
                | LifecycleError::Storage(_)
                | LifecycleError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Chat(e) => match e {
                ChatError::NotFound(_) => StatusCode::NOT_FOUND,
                ChatError::NotAnalyzed(_) => StatusCode::BAD_REQUEST,
                ChatError::Configuration(_) | ChatError::ChatFailed(_) | ChatError::Db(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse { detail };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_error_kinds_map_to_http_statuses() {
        let cases = [
            (
                ApiError::from(LifecycleError::InvalidMediaType("text/plain".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(LifecycleError::NotFound("v1".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(LifecycleError::Configuration("GEMINI_API_KEY not set".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(LifecycleError::AnalysisInProgress("v1".into())),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(ChatError::NotAnalyzed("v1".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(ChatError::NotFound("v1".into())),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{}", error);
        }
    }
}
