//! HTTP model client for OpenAI-compatible APIs.
//!
//! Talks directly to any `/chat/completions` endpoint (OpenAI, OpenRouter,
//! DeepSeek, vLLM, Ollama's compatibility layer, ...).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use switchboard_core::config::schema::ProviderConfig;
use switchboard_core::error::{Collaborator, CollaboratorError, CollaboratorResult};
use switchboard_core::types::{ChatCompletionRequest, ChatCompletionResponse, Message};

use crate::traits::{LlmProvider, LlmRequestConfig};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Request timeout for a single completion.
const REQUEST_TIMEOUT_SECS: u64 = 120;

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A model client that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    model: String,
    /// Extra headers to send with each request.
    extra_headers: HeaderMap,
    request_config: LlmRequestConfig,
    /// Sent as a system message ahead of every prompt.
    system_prompt: Option<String>,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpProvider {
    /// Create a provider from the user's provider config and a model name.
    pub fn new(config: &ProviderConfig, model: &str) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let mut extra_headers = HeaderMap::new();
        if let Some(ref headers) = config.extra_headers {
            for (key, value) in headers {
                if let (Ok(name), Ok(val)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    extra_headers.insert(name, val);
                } else {
                    warn!("Invalid header: {}={}", key, value);
                }
            }
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        HttpProvider {
            client,
            api_base,
            api_key: config.api_key.clone(),
            model: model.to_string(),
            extra_headers,
            request_config: LlmRequestConfig::default(),
            system_prompt: None,
        }
    }

    /// Override temperature and max_tokens.
    pub fn with_request_config(mut self, request_config: LlmRequestConfig) -> Self {
        self.request_config = request_config;
        self
    }

    /// Prepend a system message to every request.
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt.filter(|s| !s.trim().is_empty());
        self
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    fn build_messages(&self, prompt: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = self.system_prompt {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(prompt));
        messages
    }
}

fn unavailable(reason: String) -> CollaboratorError {
    CollaboratorError::unavailable(Collaborator::ModelClient, reason)
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn get_response(&self, prompt: &str) -> CollaboratorResult<String> {
        let messages = self.build_messages(prompt);

        debug!(
            model = %self.model,
            messages = messages.len(),
            prompt_len = prompt.len(),
            "Calling LLM"
        );

        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(self.request_config.max_tokens),
            temperature: Some(self.request_config.temperature),
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                unavailable(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %error_text, "API error");
            return Err(unavailable(format!("{status}: {error_text}")));
        }

        let chat_resp = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "Failed to parse LLM response");
            unavailable(format!("invalid response body: {e}"))
        })?;

        debug!(
            finish_reason = chat_resp
                .choices
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("?"),
            total_tokens = chat_resp.usage.as_ref().map_or(0, |u| u.total_tokens),
            "LLM response received"
        );

        // A choice with null content is a valid, empty reply.
        match chat_resp.choices.first() {
            Some(_) => Ok(chat_resp.first_content().unwrap_or_default().to_string()),
            None => Err(unavailable("no choices in response".into())),
        }
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    fn display_name(&self) -> &str {
        "OpenAI-compatible"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
