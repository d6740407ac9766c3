//! Switchboard CLI: entry point.
//!
//! # Commands
//!
//! - `switchboard agent [-m MESSAGE] [--offline]`: run turns (single-shot or REPL)
//! - `switchboard onboard`: initialize config + workspace
//! - `switchboard status`: show configuration and collaborator status

mod helpers;
mod onboard;
mod repl;
mod status;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use switchboard_agent::{
    BraveSearchClient, ContextStore, FileMemoryStore, LlmSubAgent, Orchestrator, StubSearchClient,
    StubSubAgent, SubAgentLauncher, ToolRegistry, WebSearchClient,
};
use switchboard_core::config::{load_config, Config, ProviderKind};
use switchboard_providers::{EchoProvider, HttpProvider, LlmProvider, LlmRequestConfig};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🔀 Switchboard: routes each turn through context, a model, and its tools
#[derive(Parser)]
#[command(name = "switchboard", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run turns against the orchestrator (single-shot or interactive REPL)
    Agent {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Use the echo model and stub search/sub-agent (no network)
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Initialize configuration and workspace
    Onboard,

    /// Show configuration and collaborator status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Agent {
            message,
            offline,
            logs,
        } => {
            init_logging(logs);
            run_agent(message, offline).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Agent command
// ─────────────────────────────────────────────

async fn run_agent(message: Option<String>, offline: bool) -> Result<()> {
    let config = load_config(None);
    let orchestrator = build_orchestrator(&config, offline)?;

    match message {
        Some(msg) => {
            info!("processing single message");
            let response = orchestrator.run_turn(&msg).await;
            helpers::print_response(&response);
        }
        None => {
            repl::run(orchestrator).await?;
        }
    }

    Ok(())
}

/// Build an `Orchestrator` from the loaded configuration.
///
/// With `offline`, or `provider.kind = "echo"`, no collaborator touches the
/// network.
pub fn build_orchestrator(config: &Config, offline: bool) -> Result<Orchestrator> {
    let agent = &config.agent;

    // Resolve workspace path (expand ~)
    let workspace = helpers::expand_tilde(&agent.workspace);
    std::fs::create_dir_all(&workspace)
        .with_context(|| format!("failed to create workspace: {}", workspace.display()))?;

    let memory: Arc<dyn ContextStore> = Arc::new(
        FileMemoryStore::new(&workspace)
            .context("failed to open memory store")?
            .with_limits(agent.recent_days, agent.max_context_chars),
    );

    let offline = offline || config.provider.kind == ProviderKind::Echo;
    if offline {
        return Ok(Orchestrator::new(
            memory,
            Arc::new(EchoProvider::new()),
            ToolRegistry::with_defaults(),
            Arc::new(StubSearchClient),
            Arc::new(StubSubAgent),
        ));
    }

    if !config.provider.is_configured() {
        anyhow::bail!(
            "no API key configured. Set provider.apiKey in {} or SWITCHBOARD_PROVIDER__API_KEY, \
             or run with --offline",
            switchboard_core::config::get_config_path().display()
        );
    }

    let provider = http_provider(config, &agent.model);

    if config.tools.web.search.api_key.is_empty() && std::env::var("BRAVE_API_KEY").is_err() {
        warn!("no Brave API key configured, web search turns will report a failure");
    }
    let search: Arc<dyn WebSearchClient> = Arc::new(BraveSearchClient::new(&config.tools.web.search));

    let sub_agent_provider = match config.subagent.model.as_deref() {
        Some(model) => http_provider(config, model),
        None => Arc::clone(&provider),
    };
    let sub_agents: Arc<dyn SubAgentLauncher> = Arc::new(LlmSubAgent::new(
        sub_agent_provider,
        Duration::from_secs(config.subagent.timeout_secs),
    ));

    Ok(Orchestrator::new(
        memory,
        provider,
        ToolRegistry::with_defaults(),
        search,
        sub_agents,
    ))
}

fn http_provider(config: &Config, model: &str) -> Arc<dyn LlmProvider> {
    Arc::new(
        HttpProvider::new(&config.provider, model)
            .with_request_config(LlmRequestConfig {
                max_tokens: config.agent.max_tokens,
                temperature: config.agent.temperature,
            })
            .with_system_prompt(config.agent.system_prompt.clone()),
    )
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("switchboard=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
