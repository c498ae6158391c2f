//! Gemini LLM gateway.
//!
//! This crate provides:
//! - The `LlmGateway` trait: one completion interface for both request
//!   shapes (text-only and file-attachment)
//! - A Gemini REST implementation, including Files API upload with
//!   ACTIVE-state polling for video attachments
//! - Per-call credential checking (a missing API key is a call-time
//!   configuration error, not a startup failure)

pub mod client;
pub mod error;

pub use client::{Attachment, GeminiClient, GeminiConfig, LlmGateway};
pub use error::{GatewayError, GatewayResult};
