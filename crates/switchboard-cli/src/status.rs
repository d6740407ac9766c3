//! `switchboard status`: show configuration and collaborator status.

use anyhow::Result;
use colored::Colorize;

use switchboard_agent::ToolRegistry;
use switchboard_core::config::{get_config_path, load_config, Config, ProviderKind};

use crate::helpers::{exists_marker, expand_tilde};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🔀 Switchboard Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        exists_marker(config_path.exists())
    );

    let workspace = expand_tilde(&config.agent.workspace);
    println!(
        "  {:<18} {} {}",
        "Workspace:".bold(),
        workspace.display(),
        exists_marker(workspace.exists())
    );
    let memory_file = workspace.join("memory").join("MEMORY.md");
    println!(
        "  {:<18} {} {}",
        "Memory:".bold(),
        memory_file.display(),
        exists_marker(memory_file.exists())
    );

    println!("  {:<18} {}", "Model:".bold(), config.agent.model);
    println!(
        "  {:<18} {} | max_tokens: {}",
        "Parameters:".bold(),
        format!("temp: {}", config.agent.temperature).dimmed(),
        format!("{}", config.agent.max_tokens).dimmed(),
    );

    println!();
    println!("  {:<18} {}", "Provider:".bold(), provider_status(&config));
    println!("  {:<18} {}", "Brave Search:".bold(), search_status(&config));
    println!(
        "  {:<18} {}",
        "Sub-agent:".bold(),
        format!(
            "model: {} | timeout: {}s",
            config.subagent.model.as_deref().unwrap_or(&config.agent.model),
            config.subagent.timeout_secs
        )
        .dimmed()
    );
    println!(
        "  {:<18} {}",
        "Tools:".bold(),
        ToolRegistry::with_defaults().tool_names().join(", ")
    );

    println!();

    Ok(())
}

fn provider_status(config: &Config) -> String {
    match config.provider.kind {
        ProviderKind::Echo => format!("{}", "echo (offline)".dimmed()),
        ProviderKind::Http => {
            let base = config
                .provider
                .api_base
                .as_deref()
                .unwrap_or("https://api.openai.com/v1");
            if config.provider.is_configured() {
                format!("{} http {} (key set)", "✓".green(), base)
            } else {
                format!("{} http {}", "· not configured".dimmed(), base)
            }
        }
    }
}

fn search_status(config: &Config) -> String {
    if !config.tools.web.search.api_key.is_empty() {
        format!("{} (key set)", "✓".green())
    } else if std::env::var("BRAVE_API_KEY").is_ok() {
        format!("{} (BRAVE_API_KEY)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    }
}
