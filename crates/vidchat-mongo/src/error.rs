//! Document store error types.

use thiserror::Error;

/// Result type for document store operations.
pub type MongoResult<T> = Result<T, MongoError>;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum MongoError {
    #[error("Failed to configure database client: {0}")]
    ConfigError(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),
}

impl MongoError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }
}
