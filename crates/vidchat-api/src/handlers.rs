//! Request handlers.

pub mod chat;
pub mod health;
pub mod videos;

pub use chat::*;
pub use health::*;
pub use videos::*;
