// ABOUTME: AssistantApi trait abstraction for remote assistant access
// Provides a generic interface over the hosted API, enabling mock implementations in tests

use async_trait::async_trait;

use crate::api::types::{
    Assistant, CreateAssistantRequest, CreateMessageRequest, CreateRunRequest, MessageList, Run,
    Thread, ThreadMessage,
};
use crate::utils::error::Result;

/// Trait for the remote assistant service consumed by the coordinator.
///
/// Mirrors the operations this application actually uses: assistant and
/// thread setup, message submission, run creation/polling, and message
/// listing (latest first). All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Create the remote assistant (name, model, instructions, tool config).
    async fn create_assistant(&self, request: &CreateAssistantRequest) -> Result<Assistant>;

    /// Create a fresh conversation thread.
    async fn create_thread(&self) -> Result<Thread>;

    /// Append a message to a thread.
    async fn create_message(
        &self,
        thread_id: &str,
        request: &CreateMessageRequest,
    ) -> Result<ThreadMessage>;

    /// Start a run of the assistant against a thread.
    async fn create_run(&self, thread_id: &str, request: &CreateRunRequest) -> Result<Run>;

    /// Fetch the current state of a run.
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// List a thread's messages, newest first.
    async fn list_messages(&self, thread_id: &str) -> Result<MessageList>;
}

#[cfg(test)]
pub use self::mock::MockAssistantApi;
