//! Provider capabilities — the seams the aggregation engine depends on.
//!
//! `LlmClient` is the one capability every provider offers. `Reasoner` is a
//! narrower, separate capability only synthesis-capable providers implement;
//! a concrete client may implement both.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ProviderError;

/// Answers a single question with a single block of text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send `question` to the provider and return its reply verbatim.
    async fn ask(&self, question: &str) -> Result<String, ProviderError>;
}

/// Merges two answers to the same question into one final answer.
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn synthesize(
        &self,
        question: &str,
        first: &str,
        second: &str,
    ) -> Result<String, ProviderError>;
}

/// Fully resolved connection settings for one client instance.
///
/// Produced by the registry from config + vendor defaults; clients never read
/// config or environment themselves.
#[derive(Clone, Debug)]
pub struct ClientSettings {
    /// Human-readable name for logs (e.g. `"Gemini"`).
    pub display_name: &'static str,
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    /// System prompt sent with every `ask`.
    pub system_prompt: String,
    pub temperature: Option<f64>,
    pub timeout_secs: u64,
    pub extra_headers: HashMap<String, String>,
}
