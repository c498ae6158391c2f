//! Axum HTTP API server.
//!
//! This crate provides:
//! - The video lifecycle and chat session services
//! - REST handlers for upload, analysis, chat and history
//! - Request logging, CORS, security headers and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{ChatSessionManager, VideoLifecycleManager};
pub use state::AppState;
