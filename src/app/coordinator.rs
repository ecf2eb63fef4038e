// ABOUTME: Run-lifecycle coordinator driving one user turn to completion
// Submits the message, creates a run, polls until terminal, and commits usage atomically

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant};

use crate::api::assistant::AssistantApi;
use crate::api::types::{
    CreateMessageRequest, CreateRunRequest, MessageList, Run, RunStatus, RunUsage,
};
use crate::app::config::AppConfig;
use crate::app::session::{Role, Session, Turn};
use crate::utils::error::{Result, ThreadChatError};
use crate::utils::pricing::PricingTable;

/// Cooperative cancellation handle for an in-flight poll loop.
///
/// The coordinator re-checks the token on every tick; tripping it stops
/// the wait locally (the consumed API surface has no remote run-cancel).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Everything one cycle needs from the user: the query plus the knobs the
/// presentation layer exposes (model selector, temperature slider,
/// instruction override).
#[derive(Debug, Clone)]
pub struct TurnRequest<'a> {
    pub query: &'a str,
    pub model: &'a str,
    pub temperature: f64,
    pub instructions: Option<&'a str>,
}

/// Result of one completed cycle, with the diagnostics the debug panel shows.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub usage: RunUsage,
    pub run: Run,
    /// Raw message listing the answer was extracted from.
    pub messages: MessageList,
    pub poll_count: u32,
}

pub struct RunCoordinator<'a> {
    api: &'a dyn AssistantApi,
    pricing: &'a PricingTable,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl<'a> RunCoordinator<'a> {
    pub fn new(api: &'a dyn AssistantApi, pricing: &'a PricingTable, config: &AppConfig) -> Self {
        Self {
            api,
            pricing,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            poll_timeout: Duration::from_secs(config.poll_timeout_secs),
        }
    }

    /// Drive one user turn from submission to a resolved answer.
    ///
    /// No local state is mutated here; on success the caller commits the
    /// turn via `execute_turn`. A non-completed terminal status is a
    /// `RunFailed` and leaves the conversation untouched.
    pub async fn submit_and_resolve(
        &self,
        session: &Session,
        request: &TurnRequest<'_>,
        cancel: &CancelToken,
    ) -> Result<Answer> {
        if request.query.trim().is_empty() {
            return Err(ThreadChatError::EmptyQuery);
        }
        if !self.pricing.contains(request.model) {
            return Err(ThreadChatError::UnknownModel(request.model.to_string()));
        }

        self.api
            .create_message(
                &session.thread_id,
                &CreateMessageRequest {
                    role: "user",
                    content: request.query.to_string(),
                },
            )
            .await?;

        let run = self
            .api
            .create_run(
                &session.thread_id,
                &CreateRunRequest {
                    assistant_id: session.assistant_id.clone(),
                    model: request.model.to_string(),
                    temperature: request.temperature,
                    instructions: request.instructions.map(str::to_string),
                    stream: false,
                },
            )
            .await?;
        tracing::debug!(run_id = %run.id, model = request.model, "run created");

        let (run, poll_count) = self.poll_until_terminal(session, &run.id, cancel).await?;

        if run.status != RunStatus::Completed {
            tracing::warn!(run_id = %run.id, status = %run.status, "run did not complete");
            return Err(ThreadChatError::RunFailed(run.status));
        }

        let usage = match run.usage {
            Some(usage) => usage,
            None => {
                // The answer is worth more than the accounting; treat
                // missing usage on a completed run as a zero delta.
                tracing::warn!(run_id = %run.id, "completed run reported no usage");
                RunUsage::default()
            }
        };

        let messages = self.api.list_messages(&session.thread_id).await?;
        let text = messages.latest_text()?;

        Ok(Answer {
            text,
            usage,
            run,
            messages,
            poll_count,
        })
    }

    /// Poll the run at a fixed interval until it reaches a terminal status.
    ///
    /// The wait is bounded: an overall timeout converts a stuck run into
    /// `RunTimeout` instead of blocking forever, and a tripped cancel
    /// token stops the loop between fetches.
    async fn poll_until_terminal(
        &self,
        session: &Session,
        run_id: &str,
        cancel: &CancelToken,
    ) -> Result<(Run, u32)> {
        let deadline = Instant::now() + self.poll_timeout;
        let mut ticker = interval(self.poll_interval);
        let mut poll_count = 0u32;

        loop {
            ticker.tick().await;

            if cancel.is_cancelled() {
                tracing::info!(run_id, "poll loop cancelled");
                return Err(ThreadChatError::Cancelled);
            }

            let run = self.api.retrieve_run(&session.thread_id, run_id).await?;
            poll_count += 1;
            tracing::trace!(run_id, status = %run.status, poll_count, "run polled");

            if run.status.is_terminal() {
                return Ok((run, poll_count));
            }

            if Instant::now() >= deadline {
                return Err(ThreadChatError::RunTimeout(self.poll_timeout.as_secs()));
            }
        }
    }

    /// Resolve a turn and commit it to the session.
    ///
    /// Commit is atomic with respect to failure: nothing is appended or
    /// recorded unless the run completed. On success the user and
    /// assistant turns are appended and `record` is called exactly once.
    /// If cost calculation fails for a known-but-misconfigured model, the
    /// answer is still committed and tokens still accumulate; only the
    /// cost increment is skipped.
    pub async fn execute_turn(
        &self,
        session: &mut Session,
        request: &TurnRequest<'_>,
        cancel: &CancelToken,
    ) -> Result<Answer> {
        let answer = self.submit_and_resolve(session, request, cancel).await?;

        session.append_turn(Turn {
            role: Role::User,
            content: request.query.to_string(),
            tokens: answer.usage.prompt_tokens,
        });
        session.append_turn(Turn {
            role: Role::Assistant,
            content: answer.text.clone(),
            tokens: answer.usage.completion_tokens,
        });

        let cost = match self.pricing.cost(
            answer.usage.prompt_tokens,
            answer.usage.completion_tokens,
            request.model,
        ) {
            Ok(cost) => cost,
            Err(e) => {
                tracing::warn!(
                    model = request.model,
                    error = %e,
                    "cost calculation failed; skipping cost update"
                );
                0.0
            }
        };
        session.record(answer.usage, cost);

        Ok(answer)
    }
}
