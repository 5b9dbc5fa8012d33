//! Azure OpenAI chat-completion 后端

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::constants::{
    completions_url, API_KEY_HEADER, API_TIMEOUT_SECS, MAX_COMPLETION_TOKENS, SYSTEM_PROMPT,
    USER_PROMPT_PREFIX,
};
use super::{parse_body, ChatBackend, UpstreamError};
use crate::config::ResolvedUpstream;

#[derive(Debug, Serialize, PartialEq)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// 发往上游的请求体，每个请求单独构造
#[derive(Debug, Serialize, PartialEq)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    max_completion_tokens: u32,
}

impl ChatRequest {
    fn for_incident(incident: &str) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("{USER_PROMPT_PREFIX}{incident}"),
                },
            ],
            max_completion_tokens: MAX_COMPLETION_TOKENS,
        }
    }
}

pub struct AzureOpenAiClient {
    client: Client,
    url: String,
    api_key: String,
    deployment: String,
    timeout: Duration,
}

impl AzureOpenAiClient {
    pub fn new(settings: ResolvedUpstream<'_>) -> Result<Self> {
        Self::with_timeout(settings, Duration::from_secs(API_TIMEOUT_SECS))
    }

    pub fn with_timeout(settings: ResolvedUpstream<'_>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create Azure OpenAI client")?;

        Ok(Self {
            client,
            url: completions_url(settings.endpoint, settings.deployment, settings.api_version),
            api_key: settings.api_key.to_string(),
            deployment: settings.deployment.to_string(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatBackend for AzureOpenAiClient {
    fn name(&self) -> &str {
        &self.deployment
    }

    async fn complete(&self, incident: &str) -> Result<Value, UpstreamError> {
        let body = ChatRequest::for_incident(incident);

        let response = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.timeout))?;
        let body = parse_body(&bytes);

        if !status.is_success() {
            return Err(UpstreamError::Status { status, body });
        }

        Ok(body)
    }
}
