// ABOUTME: Remote assistant API access layer
// Typed wire models, the AssistantApi trait seam, and the HTTP client implementation

pub mod assistant;
pub mod client;
pub mod types;

pub use assistant::AssistantApi;
pub use client::OpenAiAssistants;
pub use types::{Run, RunStatus, RunUsage};
