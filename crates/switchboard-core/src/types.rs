//! Chat completion wire types for OpenAI-compatible model endpoints.
//!
//! The orchestrator only ever sends a single prompt, so the message model is
//! text-only: an optional system message followed by one user message.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format, tagged by `role`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Request / response bodies
// ─────────────────────────────────────────────

/// Request body for `POST {api_base}/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Raw chat completion response. Only the fields we read are modelled.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<UsageInfo>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant message within a choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

/// Token usage statistics.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the model produced any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_role_tags() {
        let sys = serde_json::to_value(Message::system("be brief")).unwrap();
        assert_eq!(sys["role"], "system");
        assert_eq!(sys["content"], "be brief");

        let user = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(user["role"], "user");
        assert_eq!(user["content"], "hi");
    }

    #[test]
    fn test_request_skips_unset_fields() {
        let req = ChatCompletionRequest {
            model: "gpt-4o".into(),
            messages: vec![Message::user("hi")],
            max_tokens: None,
            temperature: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_first_content() {
        let raw = json!({
            "id": "chatcmpl-1",
            "choices": [
                { "message": { "content": "Paris." }, "finish_reason": "stop" }
            ],
            "usage": { "prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4 }
        });
        let resp: ChatCompletionResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.first_content(), Some("Paris."));
        assert_eq!(resp.usage.unwrap().total_tokens, 4);
    }

    #[test]
    fn test_assistant_role_is_not_sent() {
        let raw = json!({ "role": "assistant", "content": "earlier reply" });
        assert!(serde_json::from_value::<Message>(raw).is_err());
    }

    #[test]
    fn test_response_without_choices() {
        let resp: ChatCompletionResponse =
            serde_json::from_value(json!({ "choices": [], "usage": null })).unwrap();
        assert!(resp.first_content().is_none());
    }
}
