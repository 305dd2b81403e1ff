//! `iscool status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use iscool_aggregator::FusionPlan;
use iscool_core::config::{get_config_path, load_config, Config};
use iscool_providers::registry::{ProviderSpec, PROVIDERS};

/// Where a provider's API key would come from.
#[derive(Debug, PartialEq, Eq)]
enum KeySource {
    Config,
    Env,
    Missing,
}

fn key_source(spec: &ProviderSpec, config: &Config) -> KeySource {
    let configured = config
        .providers
        .get_by_name(spec.section)
        .is_some_and(|p| p.is_configured());
    if configured {
        KeySource::Config
    } else if std::env::var(spec.env_key).is_ok_and(|k| !k.is_empty()) {
        KeySource::Env
    } else {
        KeySource::Missing
    }
}

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🎓 IsCool Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        crate::helpers::display_path(&config_path),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let status = match key_source(spec, &config) {
            KeySource::Config => format!("{} (key set)", "✓".green()),
            KeySource::Env => format!("{} (key from {})", "✓".green(), spec.env_key),
            KeySource::Missing => format!("{}", "· not configured".dimmed()),
        };
        println!("    {:<20} {:<20} {}", spec.name, spec.display_name, status);
    }

    let plan = FusionPlan::from_config(&config.fusion);
    println!();
    println!(
        "  {:<18} {} + {} → {}",
        "Fusion:".bold(),
        plan.sources[0].name(),
        plan.sources[1].name(),
        plan.reasoner.name()
    );

    let header = config
        .aggregator
        .summary_header
        .as_deref()
        .unwrap_or("(none)");
    println!("  {:<18} {}", "Summary header:".bold(), header.dimmed());
    println!();

    Ok(())
}
