//! Response classification: decides which capabilities a model response
//! should be routed through.
//!
//! Classification is keyword based: each capability has a trigger phrase that
//! is matched case-insensitively anywhere in the response. More than one
//! capability may fire for the same response. The orchestrator consumes only
//! the resulting [`DispatchPlan`], so the keyword rules can be swapped for a
//! structured output schema by providing another [`ResponseClassifier`].

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::tools::ToolRegistry;

/// Trigger for the web-search branch.
pub const SEARCH_TRIGGER: &str = "search for";

/// Trigger for the sub-agent branch.
pub const SUB_AGENT_TRIGGER: &str = "launch sub-agent";

// ─────────────────────────────────────────────
// Trigger
// ─────────────────────────────────────────────

/// A case-insensitive substring trigger.
///
/// Matching lowercases the inspected text, so a phrase is found regardless of
/// how the model capitalized it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trigger {
    phrase: String,
}

impl Trigger {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into().to_lowercase(),
        }
    }

    /// The lowercased trigger phrase.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Whether the trigger occurs in `text`. An empty phrase never matches.
    pub fn matches(&self, text: &str) -> bool {
        self.found_in_lowercase(&text.to_lowercase())
    }

    /// Same as [`Trigger::matches`] for text that is already lowercased.
    pub fn found_in_lowercase(&self, lowered: &str) -> bool {
        !self.phrase.is_empty() && lowered.contains(&self.phrase)
    }

    /// The lowercased, trimmed text after the last occurrence of the trigger.
    ///
    /// Returns `None` when the trigger does not occur, and `Some("")` when it
    /// occurs with nothing after it.
    pub fn tail_after_last(&self, text: &str) -> Option<String> {
        if self.phrase.is_empty() {
            return None;
        }
        let lowered = text.to_lowercase();
        lowered
            .rsplit_once(self.phrase.as_str())
            .map(|(_, tail)| tail.trim().to_string())
    }
}

// ─────────────────────────────────────────────
// DispatchPlan
// ─────────────────────────────────────────────

/// A capability a response can be routed to.
///
/// Ordering follows evaluation order: tool, then web search, then sub-agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DispatchKind {
    Tool,
    WebSearch,
    SubAgent,
}

impl std::fmt::Display for DispatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchKind::Tool => f.write_str("tool"),
            DispatchKind::WebSearch => f.write_str("web_search"),
            DispatchKind::SubAgent => f.write_str("sub_agent"),
        }
    }
}

/// The routing decision for one model response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchPlan {
    /// Tool to invoke with the model response as input.
    pub tool: Option<String>,
    /// Query for the web-search client. May be empty.
    pub search_query: Option<String>,
    /// Whether to hand the model response to the sub-agent launcher.
    pub sub_agent: bool,
}

impl DispatchPlan {
    /// The capabilities this plan routes to.
    pub fn kinds(&self) -> BTreeSet<DispatchKind> {
        let mut kinds = BTreeSet::new();
        if self.tool.is_some() {
            kinds.insert(DispatchKind::Tool);
        }
        if self.search_query.is_some() {
            kinds.insert(DispatchKind::WebSearch);
        }
        if self.sub_agent {
            kinds.insert(DispatchKind::SubAgent);
        }
        kinds
    }

    pub fn is_empty(&self) -> bool {
        self.tool.is_none() && self.search_query.is_none() && !self.sub_agent
    }
}

// ─────────────────────────────────────────────
// Classifiers
// ─────────────────────────────────────────────

/// Turns a model response into a [`DispatchPlan`].
pub trait ResponseClassifier: Send + Sync {
    fn classify(&self, response: &str, tools: &ToolRegistry) -> DispatchPlan;
}

/// Substring classifier over the tool registry's triggers plus the
/// `"search for"` and `"launch sub-agent"` phrases.
#[derive(Clone, Debug)]
pub struct KeywordClassifier {
    search: Trigger,
    sub_agent: Trigger,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::with_triggers(SEARCH_TRIGGER, SUB_AGENT_TRIGGER)
    }

    /// Use custom phrases for the search and sub-agent branches.
    pub fn with_triggers(search: &str, sub_agent: &str) -> Self {
        Self {
            search: Trigger::new(search),
            sub_agent: Trigger::new(sub_agent),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseClassifier for KeywordClassifier {
    fn classify(&self, response: &str, tools: &ToolRegistry) -> DispatchPlan {
        let search_query = self.search.tail_after_last(response);
        if search_query.as_deref() == Some("") {
            warn!(
                trigger = self.search.phrase(),
                "search trigger has no query text, searching with an empty query"
            );
        }

        let plan = DispatchPlan {
            tool: tools.determine_tool(response),
            search_query,
            sub_agent: self.sub_agent.matches(response),
        };

        debug!(
            tool = plan.tool.as_deref().unwrap_or("-"),
            search = plan.search_query.is_some(),
            sub_agent = plan.sub_agent,
            "classified model response"
        );
        plan
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
