//! Shared data models for the VidChat backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video records and their lifecycle state
//! - Chat messages and session identifiers

pub mod chat;
pub mod video;

// Re-export common types
pub use chat::{ChatMessage, SessionId};
pub use video::{VideoId, VideoRecord, VideoState};
