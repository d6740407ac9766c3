//! Tool Registry: tools keyed by name, selected by trigger phrase.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use switchboard_core::error::{CollaboratorError, CollaboratorResult};

use super::base::Tool;
use super::calculator::CalculatorTool;
use crate::dispatch::Trigger;

/// Result returned by [`ToolRegistry::use_tool`] for an unknown tool name.
pub const TOOL_NOT_FOUND: &str = "Tool not found.";

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name and dispatches calls.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// A registry holding the built-in tools (currently the calculator).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CalculatorTool));
        registry
    }

    /// Register a tool. Overwrites any previous tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        info!(tool = tool.name(), trigger = tool.trigger().unwrap_or("-"), "registered tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Unregister a tool by name. Returns the removed tool, if any.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        let removed = self.tools.remove(name);
        if removed.is_some() {
            info!(tool = name, "unregistered tool");
        }
        removed
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> CollaboratorResult<&Arc<dyn Tool>> {
        self.tools
            .get(name)
            .ok_or_else(|| CollaboratorError::UnregisteredTool(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Names of all registered tools, sorted for determinism.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Pick the tool whose trigger occurs in `response_text`.
    ///
    /// Matching is case-insensitive. When several triggers match, the tool
    /// with the alphabetically first name wins.
    pub fn determine_tool(&self, response_text: &str) -> Option<String> {
        let lowered = response_text.to_lowercase();
        self.tool_names().into_iter().find(|name| {
            self.tools[name]
                .trigger()
                .is_some_and(|phrase| Trigger::new(phrase).found_in_lowercase(&lowered))
        })
    }

    /// Run a tool by name.
    ///
    /// Always yields a string: [`TOOL_NOT_FOUND`] for an unknown name, and an
    /// error description when the tool itself fails.
    pub async fn use_tool(&self, name: &str, input: &str) -> String {
        let tool = match self.get(name) {
            Ok(t) => t,
            Err(e) => {
                warn!(tool = name, error = %e, "tool lookup failed");
                return TOOL_NOT_FOUND.to_string();
            }
        };

        match tool.execute(input).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = name, error = %e, "tool execution failed");
                format!("Error executing {name}: {e}")
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
