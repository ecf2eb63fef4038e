// ABOUTME: Centralized error handling for the application
// Provides consistent error types and conversions

use thiserror::Error;

use crate::api::types::RunStatus;

#[derive(Error, Debug)]
pub enum ThreadChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Invalid pricing for model {0}: token divisor is zero")]
    InvalidPricing(String),

    #[error("Run ended with status {0}")]
    RunFailed(RunStatus),

    #[error("Run did not reach a terminal status within {0} seconds")]
    RunTimeout(u64),

    #[error("Run polling was cancelled")]
    Cancelled,

    #[error("Unexpected result shape: {0}")]
    UnexpectedResultShape(String),

    #[error("Assistant API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ThreadChatError>;
