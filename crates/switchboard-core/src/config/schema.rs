//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProviderConfig`, `ToolsConfig`,
//! `SubagentConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.switchboard/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub provider: ProviderConfig,
    pub tools: ToolsConfig,
    pub subagent: SubagentConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Orchestrator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Workspace directory (holds `memory/`).
    pub workspace: String,
    /// Model identifier sent to the provider.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Optional system prompt sent ahead of the augmented query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Upper bound on the context text returned by the memory store.
    pub max_context_chars: usize,
    /// How many days of daily notes feed the context.
    pub recent_days: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            workspace: "~/.switchboard/workspace".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            system_prompt: None,
            max_context_chars: 8000,
            recent_days: 3,
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Which model client backs the orchestrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible `/chat/completions` endpoint.
    #[default]
    Http,
    /// Offline echo model, no network.
    Echo,
}

/// Model client connection settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// API key for bearer authentication.
    pub api_key: String,
    /// Custom API base URL (defaults to the OpenAI endpoint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Tool configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    pub web: WebToolsConfig,
}

/// Web tools configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebToolsConfig {
    pub search: WebSearchConfig,
}

/// Web search configuration (Brave API).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebSearchConfig {
    /// Brave Search API key. Falls back to `BRAVE_API_KEY` when empty.
    pub api_key: String,
    /// Override for the Brave API base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Maximum number of search results to return.
    pub max_results: u32,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: None,
            max_results: 5,
        }
    }
}

// ─────────────────────────────────────────────
// Sub-agent
// ─────────────────────────────────────────────

/// Sub-agent launcher configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubagentConfig {
    /// Model for sub-agent calls; the agent model is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Seconds a sub-agent may run before it is reported as failed.
    pub timeout_secs: u64,
}

impl Default for SubagentConfig {
    fn default() -> Self {
        Self {
            model: None,
            timeout_secs: 300,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agent.max_tokens, 4096);
        assert_eq!(config.agent.temperature, 0.7);
        assert_eq!(config.agent.recent_days, 3);
        assert_eq!(config.provider.kind, ProviderKind::Http);
        assert_eq!(config.tools.web.search.max_results, 5);
        assert_eq!(config.subagent.timeout_secs, 300);
    }

    #[test]
    fn test_config_from_json_camel_case() {
        let json = serde_json::json!({
            "agent": {
                "model": "deepseek-chat",
                "maxTokens": 1024,
                "systemPrompt": "Be terse.",
                "maxContextChars": 500
            },
            "provider": {
                "kind": "echo",
                "apiBase": "http://localhost:8000/v1"
            },
            "subagent": { "timeoutSecs": 30 }
        });

        let config: Config = serde_json::from_value(json).unwrap();
        assert_eq!(config.agent.model, "deepseek-chat");
        assert_eq!(config.agent.max_tokens, 1024);
        assert_eq!(config.agent.system_prompt.as_deref(), Some("Be terse."));
        assert_eq!(config.agent.max_context_chars, 500);
        assert_eq!(config.provider.kind, ProviderKind::Echo);
        assert_eq!(
            config.provider.api_base.as_deref(),
            Some("http://localhost:8000/v1")
        );
        assert_eq!(config.subagent.timeout_secs, 30);
        // Defaults preserved for missing fields
        assert_eq!(config.agent.temperature, 0.7);
        assert_eq!(config.tools.web.search.max_results, 5);
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json["agent"].get("maxTokens").is_some());
        assert!(json["agent"].get("maxContextChars").is_some());
        assert!(json["subagent"].get("timeoutSecs").is_some());
        assert!(json["agent"].get("max_tokens").is_none());
        assert_eq!(json["provider"]["kind"], "http");
    }

    #[test]
    fn test_provider_config_is_configured() {
        assert!(!ProviderConfig::default().is_configured());
        let with_key = ProviderConfig {
            api_key: "sk-123".to_string(),
            ..Default::default()
        };
        assert!(with_key.is_configured());
    }

    #[test]
    fn test_tools_config_from_json() {
        let json = serde_json::json!({
            "tools": {
                "web": {
                    "search": { "apiKey": "brave-key-123", "maxResults": 8 }
                }
            }
        });
        let config: Config = serde_json::from_value(json).unwrap();
        assert_eq!(config.tools.web.search.api_key, "brave-key-123");
        assert_eq!(config.tools.web.search.max_results, 8);
        assert!(config.tools.web.search.api_base.is_none());
    }

    #[test]
    fn test_unknown_provider_kind_rejected() {
        let json = serde_json::json!({ "provider": { "kind": "carrier-pigeon" } });
        assert!(serde_json::from_value::<Config>(json).is_err());
    }
}
