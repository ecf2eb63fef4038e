// ABOUTME: Application configuration with defaults and file loading
// Supports TOML configuration files and environment variable overrides

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::error::{Result, ThreadChatError};

/// Resolved startup configuration: defaults, then the optional TOML file,
/// then environment overrides. Consumed once; no hot-reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub title: String,
    pub base_path: PathBuf,
    pub default_model: String,
    pub default_temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_assistant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vectorstore_id: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    // The credential never goes through the TOML file.
    #[serde(skip)]
    pub api_key: String,
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
    #[serde(skip)]
    pub debug: bool,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_poll_timeout_secs() -> u64 {
    120
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Threadchat".to_string(),
            base_path: PathBuf::from("."),
            default_model: "gpt-4o-mini".to_string(),
            default_temperature: 1.0,
            logo: None,
            avatar_assistant: None,
            avatar_user: None,
            vectorstore_id: None,
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_secs: default_poll_timeout_secs(),
            api_key: String::new(),
            config_path: None,
            debug: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and the process
    /// environment. Malformed values are fatal at startup.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(proj_dirs) = ProjectDirs::from("com", "threadchat", "threadchat") {
            let config_path = proj_dirs.config_dir().join("config.toml");
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str::<Self>(&contents)
                    .map_err(|e| ThreadChatError::Config(format!("config.toml: {e}")))?;
                config.config_path = Some(config_path);
            }
        }

        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply environment overrides through an injected lookup so tests do
    /// not have to mutate the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.api_key = key;
        }
        if let Some(path) = lookup("THREADCHAT_BASE_PATH") {
            self.base_path = PathBuf::from(path);
        }
        if let Some(temp) = lookup("THREADCHAT_DEFAULT_TEMPERATURE") {
            self.default_temperature = temp.parse().map_err(|_| {
                ThreadChatError::Config(format!(
                    "THREADCHAT_DEFAULT_TEMPERATURE is not a number: {temp}"
                ))
            })?;
        }
        if let Some(model) = lookup("THREADCHAT_DEFAULT_MODEL") {
            self.default_model = model;
        }
        if let Some(title) = lookup("THREADCHAT_TITLE") {
            self.title = title;
        }
        if let Some(logo) = lookup("THREADCHAT_LOGO") {
            self.logo = Some(logo);
        }
        if let Some(avatar) = lookup("THREADCHAT_AVATAR_ASSISTANT") {
            self.avatar_assistant = Some(avatar);
        }
        if let Some(avatar) = lookup("THREADCHAT_AVATAR_USER") {
            self.avatar_user = Some(avatar);
        }
        if let Some(id) = lookup("THREADCHAT_VECTORSTORE_ID") {
            self.vectorstore_id = Some(id);
        }
        if let Some(timeout) = lookup("THREADCHAT_POLL_TIMEOUT_SECS") {
            self.poll_timeout_secs = timeout.parse().map_err(|_| {
                ThreadChatError::Config(format!(
                    "THREADCHAT_POLL_TIMEOUT_SECS is not an integer: {timeout}"
                ))
            })?;
        }
        Ok(())
    }

    /// Startup invariants the rest of the application relies on.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ThreadChatError::Config(
                "OPENAI_API_KEY is not set".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ThreadChatError::Config(format!(
                "default temperature {} is outside [0.0, 2.0]",
                self.default_temperature
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ThreadChatError::Config(
                "poll interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn pricing_path(&self) -> PathBuf {
        self.base_path.join("aimodels.json")
    }

    pub fn instructions_path(&self) -> PathBuf {
        self.base_path.join("instructions.md")
    }
}
