//! `iscool onboard` — initialize configuration.
//!
//! Creates `~/.iscool/config.json` with defaults and the history directory.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use iscool_core::config::{get_config_path, save_config, Config};
use iscool_core::utils::get_history_path;

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🎓 IsCool — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if write_default_config(&config_path)? {
        println!(
            "  {} created config at {}",
            "✓".green(),
            crate::helpers::display_path(&config_path)
        );
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            crate::helpers::display_path(&config_path)
        );
    }

    if let Some(history_dir) = get_history_path().parent() {
        std::fs::create_dir_all(history_dir)
            .with_context(|| format!("failed to create {}", history_dir.display()))?;
    }

    println!();
    println!(
        "  Add API keys under {} (or export {}).",
        "providers.<name>.apiKey".bold(),
        "GEMINI_API_KEY / HUGGINGFACE_API_KEY / ...".bold()
    );
    println!(
        "{}",
        "  Setup complete! Run `iscool ask \"O que é EC2?\"` to try it.".green()
    );
    println!();

    Ok(())
}

/// Write a default config unless one exists. Returns whether it wrote.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
