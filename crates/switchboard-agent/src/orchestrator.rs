//! Orchestrator: runs one conversational turn through its collaborators.
//!
//! Flow of a turn:
//! 1. Look up context for the query
//! 2. Append the context to the query and call the model
//! 3. Classify the model response into a [`DispatchPlan`]
//! 4. Run the tool branch, then the web-search branch, then the sub-agent
//!    branch. Every branch that fires overwrites the final response, so the
//!    last one to run wins.
//! 5. Record memory entries for the tool/plain-response and search branches

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use switchboard_core::error::{CollaboratorError, TurnError, TurnStage};
use switchboard_providers::LlmProvider;

use crate::dispatch::{DispatchKind, DispatchPlan, KeywordClassifier, ResponseClassifier};
use crate::memory::ContextStore;
use crate::search::WebSearchClient;
use crate::subagent::SubAgentLauncher;
use crate::tools::ToolRegistry;

/// Build the prompt sent to the model: the query followed by its context.
///
/// The context header is present even when the context is empty.
pub fn augment(query: &str, context: &str) -> String {
    format!("{query}\n\nContext:\n{context}")
}

// ─────────────────────────────────────────────
// TurnOutcome
// ─────────────────────────────────────────────

/// Which step produced the current final response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseSource {
    Model,
    Tool,
    WebSearch,
    SubAgent,
}

impl std::fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseSource::Model => f.write_str("model"),
            ResponseSource::Tool => f.write_str("tool"),
            ResponseSource::WebSearch => f.write_str("web_search"),
            ResponseSource::SubAgent => f.write_str("sub_agent"),
        }
    }
}

/// A branch result that a later branch overwrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Superseded {
    pub source: ResponseSource,
    pub text: String,
}

/// Everything a turn produced.
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    /// UUID v4 identifying this turn in logs.
    pub turn_id: String,
    pub final_response: String,
    pub source: ResponseSource,
    /// The raw model response the dispatch was computed from.
    pub model_response: String,
    /// Branches that fired, in evaluation order.
    pub dispatched: Vec<DispatchKind>,
    /// Memory entries successfully recorded, in write order.
    pub memory_entries: Vec<String>,
    /// Branch results discarded by a later branch, oldest first.
    pub superseded: Vec<Superseded>,
    /// Collaborator failures that did not abort the turn.
    pub failures: Vec<CollaboratorError>,
}

impl TurnOutcome {
    fn new(turn_id: String, model_response: String) -> Self {
        Self {
            turn_id,
            final_response: model_response.clone(),
            source: ResponseSource::Model,
            model_response,
            dispatched: Vec::new(),
            memory_entries: Vec::new(),
            superseded: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Replace the final response, keeping any discarded branch result.
    fn overwrite(&mut self, source: ResponseSource, text: String) {
        let previous = std::mem::replace(&mut self.final_response, text);
        if self.source != ResponseSource::Model {
            warn!(
                turn_id = %self.turn_id,
                discarded = %self.source,
                by = %source,
                "branch result overwritten by a later branch"
            );
            self.superseded.push(Superseded {
                source: self.source,
                text: previous,
            });
        }
        self.source = source;
    }
}

// ─────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────

/// Routes a query through context lookup, the model, and the dispatch branches.
///
/// Holds no per-turn state; `run_turn` may be called concurrently.
pub struct Orchestrator {
    memory: Arc<dyn ContextStore>,
    provider: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    search: Arc<dyn WebSearchClient>,
    sub_agents: Arc<dyn SubAgentLauncher>,
    classifier: Box<dyn ResponseClassifier>,
}

impl Orchestrator {
    pub fn new(
        memory: Arc<dyn ContextStore>,
        provider: Arc<dyn LlmProvider>,
        tools: ToolRegistry,
        search: Arc<dyn WebSearchClient>,
        sub_agents: Arc<dyn SubAgentLauncher>,
    ) -> Self {
        info!(
            model = provider.default_model(),
            provider = provider.display_name(),
            tools = tools.len(),
            "orchestrator initialized"
        );
        Self {
            memory,
            provider,
            tools,
            search,
            sub_agents,
            classifier: Box::new(KeywordClassifier::new()),
        }
    }

    /// Replace the keyword classifier.
    pub fn with_classifier(mut self, classifier: impl ResponseClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> &str {
        self.provider.default_model()
    }

    /// Run a turn and return its final response.
    ///
    /// Never fails: a turn that cannot reach the model yields an error message.
    pub async fn run_turn(&self, query: &str) -> String {
        match self.process_turn(query).await {
            Ok(outcome) => outcome.final_response,
            Err(e) => {
                error!(error = %e, "turn aborted");
                format!("I encountered an error: {e}")
            }
        }
    }

    /// Run a turn and return everything it produced.
    pub async fn process_turn(&self, query: &str) -> Result<TurnOutcome, TurnError> {
        let turn_id = uuid::Uuid::new_v4().to_string();
        info!(turn_id = %turn_id, query_len = query.len(), "turn started");

        let context = self
            .memory
            .get_context(query)
            .await
            .map_err(|e| TurnError::new(TurnStage::ContextLookup, e))?;

        let augmented = augment(query, &context);
        debug!(turn_id = %turn_id, context_len = context.len(), "prompt augmented");

        let model_response = self
            .provider
            .get_response(&augmented)
            .await
            .map_err(|e| TurnError::new(TurnStage::ModelCall, e))?;

        let plan = self.classifier.classify(&model_response, &self.tools);
        let mut outcome = TurnOutcome::new(turn_id, model_response);
        outcome.dispatched = plan.kinds().into_iter().collect();

        self.run_branches(query, &plan, &mut outcome).await;

        info!(
            turn_id = %outcome.turn_id,
            source = %outcome.source,
            dispatched = outcome.dispatched.len(),
            superseded = outcome.superseded.len(),
            "turn finished"
        );
        Ok(outcome)
    }

    async fn run_branches(&self, query: &str, plan: &DispatchPlan, outcome: &mut TurnOutcome) {
        // Tool branch, or the plain model response when no tool matched.
        match plan.tool.as_deref() {
            Some(tool) => {
                let result = self.tools.use_tool(tool, &outcome.model_response).await;
                info!(turn_id = %outcome.turn_id, tool, "tool branch fired");
                let entry = format!("Tool used: {tool} with result: {result}");
                outcome.overwrite(ResponseSource::Tool, result);
                self.remember(outcome, entry).await;
            }
            None => {
                let entry = format!("LLM response to '{query}': {}", outcome.model_response);
                self.remember(outcome, entry).await;
            }
        }

        if let Some(search_query) = plan.search_query.as_deref() {
            info!(turn_id = %outcome.turn_id, query = %search_query, "web search branch fired");
            match self.search.search(search_query).await {
                Ok(results) => {
                    let entry = format!("Web search for '{search_query}' yielded: {results}");
                    outcome.overwrite(ResponseSource::WebSearch, results);
                    self.remember(outcome, entry).await;
                }
                Err(e) => {
                    warn!(turn_id = %outcome.turn_id, error = %e, "web search failed");
                    outcome.overwrite(ResponseSource::WebSearch, format!("Web search failed: {e}"));
                    outcome.failures.push(e);
                }
            }
        }

        if plan.sub_agent {
            info!(turn_id = %outcome.turn_id, "sub-agent branch fired");
            let task = outcome.model_response.clone();
            match self.sub_agents.launch_sub_agent(&task).await {
                Ok(result) => outcome.overwrite(ResponseSource::SubAgent, result),
                Err(e) => {
                    warn!(turn_id = %outcome.turn_id, error = %e, "sub-agent failed");
                    outcome.overwrite(ResponseSource::SubAgent, format!("Sub-agent failed: {e}"));
                    outcome.failures.push(e);
                }
            }
        }
    }

    /// Record a memory entry. Failures are logged and kept on the outcome.
    async fn remember(&self, outcome: &mut TurnOutcome, entry: String) {
        match self.memory.add_memory(&entry).await {
            Ok(()) => outcome.memory_entries.push(entry),
            Err(e) => {
                warn!(turn_id = %outcome.turn_id, error = %e, "failed to record memory entry");
                outcome.failures.push(e);
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::search::StubSearchClient;
    use crate::subagent::{StubSubAgent, STUB_SUB_AGENT_RESULT};
    use crate::tools::{Tool, CALCULATOR_RESULT, TOOL_NOT_FOUND};
    use async_trait::async_trait;
    use switchboard_core::error::{Collaborator, CollaboratorResult};

    /// Returns a fixed reply and remembers the prompts it saw.
    struct MockProvider {
        reply: String,
        prompts: std::sync::Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.into(),
                prompts: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn get_response(&self, prompt: &str) -> CollaboratorResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
        fn default_model(&self) -> &str {
            "mock-model"
        }
        fn display_name(&self) -> &str {
            "MockProvider"
        }
    }

    struct DownProvider;

    #[async_trait]
    impl LlmProvider for DownProvider {
        async fn get_response(&self, _prompt: &str) -> CollaboratorResult<String> {
            Err(CollaboratorError::unavailable(Collaborator::ModelClient, "connection refused"))
        }
        fn default_model(&self) -> &str {
            "down"
        }
        fn display_name(&self) -> &str {
            "Down"
        }
    }

    struct DownStore;

    #[async_trait]
    impl ContextStore for DownStore {
        async fn get_context(&self, _query: &str) -> CollaboratorResult<String> {
            Err(CollaboratorError::unavailable(Collaborator::ContextStore, "disk gone"))
        }
        async fn add_memory(&self, _entry: &str) -> CollaboratorResult<()> {
            Err(CollaboratorError::unavailable(Collaborator::ContextStore, "disk gone"))
        }
    }

    /// Context lookups work, writes fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl ContextStore for ReadOnlyStore {
        async fn get_context(&self, _query: &str) -> CollaboratorResult<String> {
            Ok(String::new())
        }
        async fn add_memory(&self, _entry: &str) -> CollaboratorResult<()> {
            Err(CollaboratorError::unavailable(Collaborator::ContextStore, "read-only"))
        }
    }

    struct DownSearch;

    #[async_trait]
    impl WebSearchClient for DownSearch {
        async fn search(&self, _query: &str) -> CollaboratorResult<String> {
            Err(CollaboratorError::unavailable(Collaborator::WebSearch, "rate limited"))
        }
    }

    struct DownSubAgent;

    #[async_trait]
    impl SubAgentLauncher for DownSubAgent {
        async fn launch_sub_agent(&self, _task: &str) -> CollaboratorResult<String> {
            Err(CollaboratorError::unavailable(Collaborator::SubAgent, "timed out"))
        }
    }

    /// Tool triggered by "tally" that remembers every input it ran on.
    #[derive(Default)]
    struct RecordingTool {
        inputs: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Tool for RecordingTool {
        fn name(&self) -> &str {
            "tally"
        }
        fn description(&self) -> &str {
            "Records its input"
        }
        fn trigger(&self) -> Option<&str> {
            Some("tally")
        }
        async fn execute(&self, input: &str) -> anyhow::Result<String> {
            self.inputs.lock().unwrap().push(input.to_string());
            Ok("tallied".into())
        }
    }

    #[derive(Default)]
    struct RecordingSubAgent {
        tasks: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SubAgentLauncher for RecordingSubAgent {
        async fn launch_sub_agent(&self, task: &str) -> CollaboratorResult<String> {
            self.tasks.lock().unwrap().push(task.to_string());
            Ok("delegated".into())
        }
    }

    /// Routes every response to one tool, whatever the text says.
    struct AlwaysTool(&'static str);

    impl ResponseClassifier for AlwaysTool {
        fn classify(&self, _response: &str, _tools: &ToolRegistry) -> DispatchPlan {
            DispatchPlan {
                tool: Some(self.0.to_string()),
                ..Default::default()
            }
        }
    }

    fn orchestrator(
        memory: Arc<dyn ContextStore>,
        provider: Arc<dyn LlmProvider>,
    ) -> Orchestrator {
        Orchestrator::new(
            memory,
            provider,
            ToolRegistry::with_defaults(),
            Arc::new(StubSearchClient),
            Arc::new(StubSubAgent),
        )
    }

    #[test]
    fn test_augment_keeps_header_for_empty_context() {
        assert_eq!(augment("hi", ""), "hi\n\nContext:\n");
        assert_eq!(augment("hi", "likes tea"), "hi\n\nContext:\nlikes tea");
    }

    #[tokio::test]
    async fn test_plain_response() {
        let store = Arc::new(InMemoryStore::new("User is in Paris."));
        let provider = Arc::new(MockProvider::new("The capital of France is Paris."));
        let orch = orchestrator(store.clone(), provider.clone());

        let outcome = orch.process_turn("capital of France?").await.unwrap();
        assert_eq!(outcome.final_response, "The capital of France is Paris.");
        assert_eq!(outcome.source, ResponseSource::Model);
        assert!(outcome.dispatched.is_empty());
        assert!(outcome.superseded.is_empty());
        assert_eq!(
            store.entries(),
            vec!["LLM response to 'capital of France?': The capital of France is Paris."]
        );
        assert_eq!(
            provider.prompts.lock().unwrap().as_slice(),
            ["capital of France?\n\nContext:\nUser is in Paris."]
        );
        assert!(uuid::Uuid::parse_str(&outcome.turn_id).is_ok());
    }

    #[tokio::test]
    async fn test_tool_branch() {
        let store = Arc::new(InMemoryStore::default());
        let orch = orchestrator(store.clone(), Arc::new(MockProvider::new("I will calculate.")));

        let outcome = orch.process_turn("6*7?").await.unwrap();
        assert_eq!(outcome.final_response, CALCULATOR_RESULT);
        assert_eq!(outcome.source, ResponseSource::Tool);
        assert_eq!(outcome.dispatched, vec![DispatchKind::Tool]);
        assert_eq!(
            store.entries(),
            vec![format!("Tool used: calculator with result: {CALCULATOR_RESULT}")]
        );
    }

    #[tokio::test]
    async fn test_tool_and_sub_agent_receive_model_response() {
        let reply = "Let me tally the votes, then launch sub-agent to verify.";
        let tool = Arc::new(RecordingTool::default());
        let sub_agent = Arc::new(RecordingSubAgent::default());
        let mut tools = ToolRegistry::new();
        tools.register(tool.clone());

        let orch = Orchestrator::new(
            Arc::new(InMemoryStore::new("votes are in")),
            Arc::new(MockProvider::new(reply)),
            tools,
            Arc::new(StubSearchClient),
            sub_agent.clone(),
        );

        let outcome = orch.process_turn("who won?").await.unwrap();
        assert_eq!(outcome.final_response, "delegated");
        assert_eq!(outcome.dispatched, vec![DispatchKind::Tool, DispatchKind::SubAgent]);
        assert_eq!(tool.inputs.lock().unwrap().as_slice(), [reply]);
        assert_eq!(sub_agent.tasks.lock().unwrap().as_slice(), [reply]);
    }

    #[tokio::test]
    async fn test_query_triggers_do_not_route() {
        let store = Arc::new(InMemoryStore::default());
        let tool = Arc::new(RecordingTool::default());
        let sub_agent = Arc::new(RecordingSubAgent::default());
        let mut tools = ToolRegistry::with_defaults();
        tools.register(tool.clone());

        let orch = Orchestrator::new(
            store.clone(),
            Arc::new(MockProvider::new("Nothing to do here.")),
            tools,
            Arc::new(StubSearchClient),
            sub_agent.clone(),
        );

        let query = "calculate and tally, search for x, then launch sub-agent";
        let outcome = orch.process_turn(query).await.unwrap();
        assert_eq!(outcome.final_response, "Nothing to do here.");
        assert_eq!(outcome.source, ResponseSource::Model);
        assert!(outcome.dispatched.is_empty());
        assert!(tool.inputs.lock().unwrap().is_empty());
        assert!(sub_agent.tasks.lock().unwrap().is_empty());
        assert_eq!(
            store.entries(),
            vec![format!("LLM response to '{query}': Nothing to do here.")]
        );
    }

    #[tokio::test]
    async fn test_all_branches_last_writer_wins() {
        let store = Arc::new(InMemoryStore::default());
        let reply = "calculate, then search for Kittens, then launch sub-agent";
        let orch = orchestrator(store.clone(), Arc::new(MockProvider::new(reply)));

        let outcome = orch.process_turn("q").await.unwrap();
        assert_eq!(outcome.final_response, STUB_SUB_AGENT_RESULT);
        assert_eq!(outcome.source, ResponseSource::SubAgent);
        assert_eq!(
            outcome.dispatched,
            vec![DispatchKind::Tool, DispatchKind::WebSearch, DispatchKind::SubAgent]
        );
        // "then launch sub-agent" follows the search trigger, so it is part of the query.
        let search_results = "Web search results for 'kittens, then launch sub-agent'";
        assert_eq!(
            outcome.superseded,
            vec![
                Superseded {
                    source: ResponseSource::Tool,
                    text: CALCULATOR_RESULT.into()
                },
                Superseded {
                    source: ResponseSource::WebSearch,
                    text: search_results.into()
                },
            ]
        );
        // The sub-agent branch writes no memory.
        assert_eq!(store.entries().len(), 2);
        assert_eq!(outcome.memory_entries, store.entries());
    }

    #[tokio::test]
    async fn test_context_failure_aborts_turn() {
        let orch = orchestrator(Arc::new(DownStore), Arc::new(MockProvider::new("unused")));

        let err = orch.process_turn("q").await.unwrap_err();
        assert_eq!(err.stage, TurnStage::ContextLookup);

        let text = orch.run_turn("q").await;
        assert!(text.starts_with("I encountered an error: context lookup failed"));
    }

    #[tokio::test]
    async fn test_model_failure_aborts_turn() {
        let store = Arc::new(InMemoryStore::default());
        let orch = orchestrator(store.clone(), Arc::new(DownProvider));

        let err = orch.process_turn("q").await.unwrap_err();
        assert_eq!(err.stage, TurnStage::ModelCall);
        assert!(orch.run_turn("q").await.contains("connection refused"));
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_is_diagnostic_without_memory() {
        let store = Arc::new(InMemoryStore::default());
        let orch = Orchestrator::new(
            store.clone(),
            Arc::new(MockProvider::new("search for news")),
            ToolRegistry::with_defaults(),
            Arc::new(DownSearch),
            Arc::new(StubSubAgent),
        );

        let outcome = orch.process_turn("q").await.unwrap();
        assert!(outcome.final_response.starts_with("Web search failed:"));
        assert!(outcome.final_response.contains("rate limited"));
        assert_eq!(outcome.failures.len(), 1);
        // Only the plain-response entry is recorded.
        assert_eq!(store.entries(), vec!["LLM response to 'q': search for news"]);
    }

    #[tokio::test]
    async fn test_sub_agent_failure_is_diagnostic() {
        let orch = Orchestrator::new(
            Arc::new(InMemoryStore::default()),
            Arc::new(MockProvider::new("launch sub-agent")),
            ToolRegistry::with_defaults(),
            Arc::new(StubSearchClient),
            Arc::new(DownSubAgent),
        );

        let outcome = orch.process_turn("q").await.unwrap();
        assert_eq!(
            outcome.final_response,
            "Sub-agent failed: sub-agent launcher unavailable: timed out"
        );
        assert_eq!(outcome.source, ResponseSource::SubAgent);
    }

    #[tokio::test]
    async fn test_memory_write_failure_does_not_abort() {
        let orch = orchestrator(Arc::new(ReadOnlyStore), Arc::new(MockProvider::new("calculate")));

        let outcome = orch.process_turn("q").await.unwrap();
        assert_eq!(outcome.final_response, CALCULATOR_RESULT);
        assert!(outcome.memory_entries.is_empty());
        assert_eq!(outcome.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_unregistered_tool_yields_sentinel() {
        let store = Arc::new(InMemoryStore::default());
        let orch = orchestrator(store.clone(), Arc::new(MockProvider::new("anything")))
            .with_classifier(AlwaysTool("abacus"));

        let outcome = orch.process_turn("q").await.unwrap();
        assert_eq!(outcome.final_response, TOOL_NOT_FOUND);
        assert_eq!(
            store.entries(),
            vec![format!("Tool used: abacus with result: {TOOL_NOT_FOUND}")]
        );
    }

    #[tokio::test]
    async fn test_concurrent_turns() {
        let store = Arc::new(InMemoryStore::default());
        let orch = Arc::new(orchestrator(store.clone(), Arc::new(MockProvider::new("plain"))));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let orch = Arc::clone(&orch);
                tokio::spawn(async move { orch.run_turn(&format!("query {i}")).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "plain");
        }
        assert_eq!(store.entries().len(), 8);
    }
}
