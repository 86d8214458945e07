//! Ollama chat client used as a completion backend.
//!
//! Sends one non-streaming `/api/chat` request per prompt with a fixed
//! system prompt and returns the assistant message content.

use super::CompletionBackend;
use crate::error::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub ollama_url: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            temperature: 0.1,
            timeout_seconds: 300,
        }
    }
}

/// Message in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

/// Completion backend backed by a local or remote Ollama server.
pub struct OllamaBackend {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaBackend {
    /// Create a client; fails only if the HTTP client cannot be built.
    pub fn new(config: OllamaConfig) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.ollama_url.trim_end_matches('/'))
    }

    fn build_request(&self, prompt: &str, model: &str) -> OllamaChatRequest {
        OllamaChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        }
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<String, BackendError> {
        let url = self.chat_url();
        let request = self.build_request(prompt, model);

        debug!("POST {} (model {})", url, model);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    BackendError::Connect(self.config.ollama_url.clone())
                } else {
                    BackendError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, body });
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(chat_response.message.content)
    }
}

const SYSTEM_PROMPT: &str = r#"You are a careful document analyst.
Read the document excerpt you are given and answer exactly what is asked.
Use short plain-text lines; start list entries with "- "."#;
