//! chatline - terminal client library for a conversational AI backend
//!
//! This library provides the core functionality for chatline, including the
//! chat send pipeline, conversation grouping, the backend abstraction,
//! session persistence, and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `chat`: Chat state reducer and the send pipeline with its timeout race
//! - `conversation`: Conversation and message types, recency grouping
//! - `api`: Backend abstraction with HTTP and scripted implementations
//! - `format`: Assistant message markup
//! - `session`: Stored token, user record and display preferences
//! - `storage`: SQLite key-value store behind the session
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use chatline::api::HttpBackend;
//! use chatline::{ChatController, Config};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let backend = Arc::new(HttpBackend::new(&config.api, Some("token".into()))?);
//!     let controller = ChatController::from_config(backend, &config, false);
//!     controller.send_message("Hello!").await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod format;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use chat::{ChatController, ChatState, SendFailure};
pub use config::Config;
pub use conversation::{categorize, CategorizedConversations, Conversation, Message};
pub use error::{ChatlineError, Result};
pub use format::format_ai_message;

#[cfg(test)]
pub mod test_utils;
