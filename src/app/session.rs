// ABOUTME: Session store and usage accumulator
// Holds the conversation history, remote handles, and running token/cost totals

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::api::assistant::AssistantApi;
use crate::api::types::{CreateAssistantRequest, RunUsage};
use crate::app::config::AppConfig;
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry in the displayed history. Immutable once appended;
/// ordering is chronological and significant.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub tokens: u64,
}

/// Live state of one interactive session: the remote handles created at
/// startup, the conversation history, and the running usage totals.
///
/// Owned by main and passed by `&mut` to the coordinator; a single cycle
/// runs at a time, so no locking is involved.
#[derive(Debug)]
pub struct Session {
    pub assistant_id: String,
    pub thread_id: String,
    pub history: Vec<Turn>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cumulative_cost: f64,
    pub started_at: DateTime<Local>,
}

impl Session {
    fn new(assistant_id: String, thread_id: String) -> Self {
        Self {
            assistant_id,
            thread_id,
            history: Vec::new(),
            prompt_tokens: 0,
            completion_tokens: 0,
            cumulative_cost: 0.0,
            started_at: Local::now(),
        }
    }

    /// Append to history. No deduplication, no size bound.
    pub fn append_turn(&mut self, turn: Turn) {
        self.history.push(turn);
    }

    /// Add one cycle's usage and cost to the running totals.
    ///
    /// Must be called exactly once per successfully completed cycle; a
    /// second call for the same cycle double-counts.
    pub fn record(&mut self, usage: RunUsage, cost: f64) {
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.cumulative_cost += cost;
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Initialize-once holder for the session.
///
/// The presentation loop may ask for setup on every refresh; only the
/// first request creates the remote assistant and thread. Subsequent
/// calls return the existing session untouched.
#[derive(Debug, Default)]
pub struct SessionStore {
    session: Option<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self { session: None }
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Create the remote assistant and thread exactly once.
    pub async fn initialize(
        &mut self,
        api: &dyn AssistantApi,
        config: &AppConfig,
        instructions: &str,
    ) -> Result<&mut Session> {
        if self.session.is_none() {
            let request = CreateAssistantRequest::new(
                &config.title,
                &config.default_model,
                instructions,
                config.vectorstore_id.as_deref(),
            );
            let assistant = api.create_assistant(&request).await?;
            let thread = api.create_thread().await?;
            tracing::info!(
                assistant_id = %assistant.id,
                thread_id = %thread.id,
                "session initialized"
            );
            self.session = Some(Session::new(assistant.id, thread.id));
        }
        Ok(self.session.as_mut().unwrap())
    }
}
