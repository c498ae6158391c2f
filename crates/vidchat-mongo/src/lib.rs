//! MongoDB document store.
//!
//! This crate provides:
//! - Typed repositories for the Videos and ChatMessages collections
//! - Connection-string configuration from the environment
//! - Single-document atomic state transitions for video analysis

pub mod client;
pub mod error;
pub mod repos;

pub use client::{MongoClient, MongoConfig};
pub use error::{MongoError, MongoResult};
pub use repos::{ChatRepository, VideoRepository};
