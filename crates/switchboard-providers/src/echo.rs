//! Offline model that answers by quoting its prompt.
//!
//! Any trigger phrase present in the prompt (and therefore in the user's
//! query) reappears in the response, which makes the echo model useful for
//! exercising the dispatch paths without network access.

use async_trait::async_trait;
use tracing::debug;

use switchboard_core::error::CollaboratorResult;

use crate::traits::LlmProvider;

pub struct EchoProvider {
    model: String,
}

impl EchoProvider {
    pub fn new() -> Self {
        Self {
            model: "echo".to_string(),
        }
    }

    /// The reply the echo model produces for `prompt`.
    pub fn reply_for(prompt: &str) -> String {
        format!("LLM response to '{prompt}'")
    }
}

impl Default for EchoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for EchoProvider {
    async fn get_response(&self, prompt: &str) -> CollaboratorResult<String> {
        debug!(prompt_len = prompt.len(), "echo model responding");
        Ok(Self::reply_for(prompt))
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    fn display_name(&self) -> &str {
        "Echo"
    }
}
