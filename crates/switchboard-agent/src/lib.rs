//! Switchboard Agent: the turn orchestrator and its collaborators.
//!
//! This crate contains:
//! - **orchestrator**: context → model → dispatch → memory, last writer wins
//! - **dispatch**: keyword classification of model responses
//! - **tools**: Tool trait, registry, and the built-in calculator
//! - **memory**: file-backed and in-process context stores
//! - **search**: Brave Search client and offline stub
//! - **subagent**: model-backed sub-agent launcher and offline stub

pub mod dispatch;
pub mod memory;
pub mod orchestrator;
pub mod search;
pub mod subagent;
pub mod tools;

pub use dispatch::{DispatchKind, DispatchPlan, KeywordClassifier, ResponseClassifier};
pub use memory::{ContextStore, FileMemoryStore, InMemoryStore};
pub use orchestrator::{augment, Orchestrator, ResponseSource, Superseded, TurnOutcome};
pub use search::{BraveSearchClient, StubSearchClient, WebSearchClient};
pub use subagent::{LlmSubAgent, StubSubAgent, SubAgentLauncher};
pub use tools::{Tool, ToolRegistry};
