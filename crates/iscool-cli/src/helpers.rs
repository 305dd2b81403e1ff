//! Shared CLI helpers — provider lists, path display, response printing, banner.

use std::path::Path;

use colored::Colorize;

use iscool_core::types::FUSION_SENTINEL;
use iscool_core::utils::home_dir;
use iscool_core::AggregatedResponse;
use iscool_providers::ProviderRegistry;

/// Requested providers, or `["fusion"]` when none were given.
pub fn default_providers(providers: Vec<String>) -> Vec<String> {
    if providers.is_empty() {
        vec![FUSION_SENTINEL.to_string()]
    } else {
        providers
    }
}

/// Split a comma-separated provider list.
pub fn parse_provider_list(raw: &str) -> Vec<String> {
    default_providers(
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
    )
}

/// Everything a user can request: the fusion sentinel, then each answerer.
pub fn known_providers(registry: &ProviderRegistry) -> Vec<&'static str> {
    std::iter::once(FUSION_SENTINEL)
        .chain(registry.answerer_names())
        .collect()
}

/// Render `path` with the home directory collapsed to `~`.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

/// Print an aggregated response to stdout.
pub fn print_response(response: &AggregatedResponse) {
    println!();
    println!("{}", "🎓 IsCool".cyan().bold());
    if response.final_answer.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{}", response.final_answer);
    }

    if !response.answers.is_empty() {
        println!();
        println!("{}", "Individual answers:".bold());
        for answer in &response.answers {
            let marker = if answer.answer.starts_with("[ERROR") {
                "✗".red()
            } else {
                "✓".green()
            };
            println!("  {marker} {}", answer.provider.bold());
            for line in answer.answer.lines() {
                println!("    {}", line.dimmed());
            }
        }
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(providers: &[String]) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🎓 IsCool".cyan().bold(), version.dimmed());
    println!("{} {}", "Providers:".dimmed(), providers.join(", "));
    println!("{}", "Type a question, or \"exit\" to quit.".dimmed());
    println!();
}

/// Print a "thinking" spinner placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
