// ABOUTME: HTTP implementation of the AssistantApi trait
// Talks to the hosted assistants endpoint over reqwest with a typed request/response model

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::api::assistant::AssistantApi;
use crate::api::types::{
    Assistant, CreateAssistantRequest, CreateMessageRequest, CreateRunRequest, MessageList, Run,
    Thread, ThreadMessage,
};
use crate::utils::error::{Result, ThreadChatError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const BETA_HEADER: &str = "assistants=v2";

/// Client for the hosted assistants API.
pub struct OpenAiAssistants {
    /// Pre-computed `"Bearer <key>"` header value.
    auth_header: String,
    base_url: String,
    client: Client,
}

impl OpenAiAssistants {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at an alternate endpoint (proxies, test servers).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            auth_header: format!("Bearer {api_key}"),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", &self.auth_header)
            .header("OpenAI-Beta", BETA_HEADER)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(500).collect();
            return Err(ThreadChatError::Api {
                status: status.as_u16(),
                body: excerpt,
            });
        }
        Ok(response.json().await?)
    }

    async fn post<B: serde::Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.request(self.client.post(&url)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.request(self.client.get(&url)).send().await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl AssistantApi for OpenAiAssistants {
    async fn create_assistant(&self, request: &CreateAssistantRequest) -> Result<Assistant> {
        self.post("/assistants", request).await
    }

    async fn create_thread(&self) -> Result<Thread> {
        self.post("/threads", &serde_json::json!({})).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        request: &CreateMessageRequest,
    ) -> Result<ThreadMessage> {
        self.post(&format!("/threads/{thread_id}/messages"), request)
            .await
    }

    async fn create_run(&self, thread_id: &str, request: &CreateRunRequest) -> Result<Run> {
        self.post(&format!("/threads/{thread_id}/runs"), request)
            .await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.get(&format!("/threads/{thread_id}/runs/{run_id}")).await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<MessageList> {
        self.get(&format!("/threads/{thread_id}/messages")).await
    }
}
