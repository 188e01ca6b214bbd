//! HTTP text-completion client.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::CompletionConfig;
use crate::domain::{AiResponseError, DomainError, DomainResult};
use super::types::{ChatCompletion, CompletionRequest};
use super::TextCompletion;

/// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct HttpCompletionClient {
    http: reqwest::Client,
    config: CompletionConfig,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: [WireMessage<'a>; 2],
}

impl HttpCompletionClient {
    pub fn new(config: CompletionConfig) -> DomainResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| DomainError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> WireRequest<'a> {
        WireRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            response_format: ResponseFormat { kind: "json_object" },
            messages: [
                WireMessage {
                    role: "system",
                    content: &request.system_instruction,
                },
                WireMessage {
                    role: "user",
                    content: &request.user_content,
                },
            ],
        }
    }
}

#[async_trait]
impl TextCompletion for HttpCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> DomainResult<ChatCompletion> {
        let mut builder = self.http.post(&self.config.endpoint).json(&self.body(&request));
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                DomainError::network(None, "completion request timed out")
            } else {
                DomainError::network(e.status().map(|s| s.as_u16()), e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            log::warn!("Completion endpoint returned {}", status);
            return Err(DomainError::network(Some(status.as_u16()), truncate(&detail, 500)));
        }

        response
            .json::<ChatCompletion>()
            .await
            .map_err(|e| AiResponseError::InvalidJson(format!("completion envelope: {}", e)).into())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
