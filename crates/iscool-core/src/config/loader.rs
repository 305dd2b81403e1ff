//! Config loader — reads `~/.iscool/config.json`, merges env vars, and
//! applies legacy migrations.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.iscool/config.json`
//! 3. Environment variables `ISCOOL_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};

/// Vendors that accept `ISCOOL_PROVIDERS__<NAME>__*` overrides.
const PROVIDER_NAMES: &[&str] = &["openai", "huggingface", "gemini", "deepseek"];

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    migrate_config(&mut raw);

    let config: Config = match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply legacy config migrations.
///
/// Moves a top-level `summaryHeader` → `aggregator.summaryHeader`.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(root) = raw.as_object_mut() else {
        return;
    };
    let Some(header) = root.remove("summaryHeader") else {
        return;
    };

    let aggregator = root
        .entry("aggregator")
        .or_insert_with(|| serde_json::json!({}));
    if let Some(section) = aggregator.as_object_mut() {
        if !section.contains_key("summaryHeader") {
            section.insert("summaryHeader".to_string(), header);
            debug!("Migrated summaryHeader → aggregator.summaryHeader");
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `ISCOOL_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `ISCOOL_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.api_key`
/// - `ISCOOL_PROVIDERS__<NAME>__API_BASE` → `providers.<name>.api_base`
/// - `ISCOOL_PROVIDERS__<NAME>__MODEL` → `providers.<name>.model`
/// - `ISCOOL_PROVIDERS__<NAME>__REASONER_MODEL` → `providers.<name>.reasoner_model`
/// - `ISCOOL_PROVIDERS__<NAME>__TIMEOUT_SECS` → `providers.<name>.timeout_secs`
/// - `ISCOOL_AGGREGATOR__SUMMARY_HEADER` → `aggregator.summary_header`
/// - `ISCOOL_AGGREGATOR__SYSTEM_PROMPT` → `aggregator.system_prompt`
/// - `ISCOOL_FUSION__REASONER` → `fusion.reasoner`
fn apply_env_overrides(mut config: Config) -> Config {
    for name in PROVIDER_NAMES {
        if let Some(provider) = config.providers.get_by_name_mut(name) {
            apply_provider_env(provider, &name.to_uppercase());
        }
    }

    if let Ok(val) = std::env::var("ISCOOL_AGGREGATOR__SUMMARY_HEADER") {
        config.aggregator.summary_header = Some(val);
    }
    if let Ok(val) = std::env::var("ISCOOL_AGGREGATOR__SYSTEM_PROMPT") {
        config.aggregator.system_prompt = Some(val);
    }
    if let Ok(val) = std::env::var("ISCOOL_FUSION__REASONER") {
        config.fusion.reasoner = val;
    }

    config
}

/// Apply env var overrides for a single provider.
fn apply_provider_env(provider: &mut ProviderConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("ISCOOL_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Ok(val) = std::env::var(format!("ISCOOL_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if let Ok(val) = std::env::var(format!("ISCOOL_PROVIDERS__{name}__MODEL")) {
        provider.model = Some(val);
    }
    if let Ok(val) = std::env::var(format!("ISCOOL_PROVIDERS__{name}__REASONER_MODEL")) {
        provider.reasoner_model = Some(val);
    }
    if let Ok(val) = std::env::var(format!("ISCOOL_PROVIDERS__{name}__TIMEOUT_SECS")) {
        match val.parse::<u64>() {
            Ok(secs) => provider.timeout_secs = Some(secs),
            Err(_) => warn!(provider = name, value = %val, "ignoring invalid timeout override"),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
