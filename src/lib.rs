// ABOUTME: Main library module that exports the public API
// Central module for the threadchat application

pub mod api;
pub mod app;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use api::{AssistantApi, OpenAiAssistants, RunStatus, RunUsage};
pub use app::{Answer, AppConfig, CancelToken, RunCoordinator, Session, SessionStore, TurnRequest};
pub use utils::{PricingTable, Result, ThreadChatError};
