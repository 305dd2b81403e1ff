//! LLM provider layer for IsCool.
//!
//! # Architecture
//!
//! - [`traits::LlmClient`] / [`traits::Reasoner`] — the two capabilities
//! - [`registry`] — provider kinds, static specs, and lazy factories
//! - [`http_provider::HttpProvider`] — OpenAI-compatible HTTP client
//! - [`gemini::GeminiProvider`] — Gemini `generateContent` client

pub mod error;
pub mod gemini;
pub mod http_provider;
pub mod prompts;
pub mod registry;
pub mod traits;

#[cfg(test)]
mod test_util;

// Re-export main types for convenience
pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use http_provider::HttpProvider;
pub use registry::{ProviderKind, ProviderRegistry, ProviderSpec, PROVIDERS};
pub use traits::{ClientSettings, LlmClient, Reasoner};
