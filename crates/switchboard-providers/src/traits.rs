//! LLM provider trait: the model-client boundary of the orchestrator.

use async_trait::async_trait;
use switchboard_core::error::CollaboratorResult;

/// Generation settings passed with each request.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// Turns a prompt into a response.
///
/// Implementations report transport and API failures as
/// `CollaboratorError::Unavailable` rather than as response text, so the
/// orchestrator never routes on an error message.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send `prompt` as a single user message and return the reply text.
    async fn get_response(&self, prompt: &str) -> CollaboratorResult<String>;

    /// The model this provider instance talks to.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
