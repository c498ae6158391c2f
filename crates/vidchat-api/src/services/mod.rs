//! Business-logic services behind the HTTP handlers.

pub mod chat;
pub mod lifecycle;

pub use chat::{ChatError, ChatResult, ChatSessionManager};
pub use lifecycle::{AnalysisMode, LifecycleError, LifecycleResult, VideoLifecycleManager};
