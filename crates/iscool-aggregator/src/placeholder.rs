//! Placeholder text substituted for failed calls, so every answer stays text.

use iscool_providers::ProviderError;

/// Fan-out slot: `[ERROR provider '<name>'] <kind>: <detail>`.
pub fn provider_failure(name: &str, err: &ProviderError) -> String {
    format!("[ERROR provider '{name}'] {}: {err}", err.kind())
}

/// Fusion stage-1 slot: `[ERROR <label>] <kind>: <detail>`.
pub fn stage_failure(label: &str, err: &ProviderError) -> String {
    format!("[ERROR {label}] {}: {err}", err.kind())
}

/// Fusion final answer when synthesis fails.
pub fn reasoner_failure(err: &ProviderError) -> String {
    stage_failure("reasoner", err)
}
