//! Local filesystem blob store.
//!
//! This crate provides:
//! - Video byte persistence under a configured root directory
//! - Deterministic `{video_id}.{ext}` key layout
//! - Connectivity check for readiness probes

pub mod client;
pub mod error;

pub use client::{extension_for, BlobStore, StorageConfig, StoredBlob};
pub use error::{StorageError, StorageResult};
