//! `switchboard onboard`: initialize configuration and workspace.
//!
//! - Creates `~/.switchboard/config.json` with defaults
//! - Creates the workspace and its `memory/` directory
//! - Seeds `memory/MEMORY.md`

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use switchboard_core::config::{get_config_path, load_config, save_config};
use switchboard_core::utils::get_data_path;

use crate::helpers::expand_tilde;

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔀 Switchboard — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    let config = load_config(None);

    // 1. Create config if it doesn't exist
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        save_config(&config, Some(&config_path))
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    // 2. Workspace + memory
    let workspace = expand_tilde(&config.agent.workspace);
    init_workspace(&workspace)?;
    println!("  {} workspace at {}", "✓".green(), workspace.display());

    // 3. REPL history directory
    std::fs::create_dir_all(get_data_path().join("history"))?;

    println!();
    println!(
        "{}",
        "  Setup complete! Run `switchboard agent` to start, or `switchboard agent --offline` to try it without an API key."
            .green()
    );
    println!();

    Ok(())
}

/// Create the workspace, its memory directory, and the long-term memory file.
fn init_workspace(workspace: &Path) -> Result<()> {
    let memory_dir = workspace.join("memory");
    std::fs::create_dir_all(&memory_dir)
        .with_context(|| format!("failed to create {}", memory_dir.display()))?;
    create_template(&memory_dir.join("MEMORY.md"), MEMORY_TEMPLATE)
}

/// Create a template file if it doesn't exist.
fn create_template(path: &Path, content: &str) -> Result<()> {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if path.exists() {
        println!("  {} {} already exists", "✓".green(), name);
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("  {} created {}", "✓".green(), name);
    }
    Ok(())
}

const MEMORY_TEMPLATE: &str = r#"# Long-term Memory

Facts and preferences written here are included as context in every turn.
Daily notes next to this file record what each turn did.
"#;
