//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProvidersConfig`, `AggregatorConfig`, `FusionConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.iscool/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub aggregator: AggregatorConfig,
    pub fusion: FusionConfig,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Connection settings for one LLM vendor.
///
/// Every field is optional on disk; empty values fall back to the vendor
/// defaults baked into the provider registry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication. Empty = use the vendor's env var.
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Model for plain question answering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Model used when this vendor acts as the fusion reasoner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoner_model: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether this provider has an API key in the config itself.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// One `ProviderConfig` per supported vendor.
///
/// `deepseek` and `gemini` also drive their reasoner variants.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub huggingface: ProviderConfig,
    pub gemini: ProviderConfig,
    pub deepseek: ProviderConfig,
}

impl ProvidersConfig {
    /// Get a vendor config by name (e.g. `"gemini"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        match name {
            "openai" => Some(&self.openai),
            "huggingface" => Some(&self.huggingface),
            "gemini" => Some(&self.gemini),
            "deepseek" => Some(&self.deepseek),
            _ => None,
        }
    }

    /// Mutable variant of [`get_by_name`](Self::get_by_name).
    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut ProviderConfig> {
        match name {
            "openai" => Some(&mut self.openai),
            "huggingface" => Some(&mut self.huggingface),
            "gemini" => Some(&mut self.gemini),
            "deepseek" => Some(&mut self.deepseek),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────
// Aggregation
// ─────────────────────────────────────────────

/// Presentation settings for fan-out answers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregatorConfig {
    /// Optional header prepended to the concatenated fan-out answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_header: Option<String>,
    /// Replaces the built-in tutor system prompt when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// Fusion pipeline settings. The two stage-1 sources are fixed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FusionConfig {
    /// Reasoner identifier: `"gemini-reasoner"` or `"deepseek-reasoner"`.
    pub reasoner: String,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            reasoner: "gemini-reasoner".to_string(),
        }
    }
}
