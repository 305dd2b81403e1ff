//! Provider error taxonomy.
//!
//! Every failure a provider client can produce, from construction (missing
//! key) to the HTTP round-trip. Callers turn these into placeholder text via
//! [`ProviderError::kind`] and the `Display` detail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API key in config or in the vendor's environment variable.
    #[error("{provider} API key not found (set providers.{section}.apiKey or {env_key})")]
    MissingApiKey {
        provider: &'static str,
        section: &'static str,
        env_key: &'static str,
    },

    /// A capability was requested from a provider that does not offer it.
    #[error("{0}")]
    NotSupported(String),

    /// The registry has no factory for this provider.
    #[error("provider '{0}' is not registered")]
    NotRegistered(String),

    /// Transport-level failure (DNS, connection refused, TLS, ...).
    #[error("request failed: {0}")]
    Network(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The API answered with a non-success status.
    #[error("{status}: {body}")]
    Status { status: u16, body: String },

    /// The body could not be decoded into the expected shape.
    #[error("could not decode response: {0}")]
    MalformedResponse(String),

    /// The body decoded but carried no usable text.
    #[error("{0}")]
    EmptyResponse(String),
}

impl ProviderError {
    /// Stable, human-readable failure kind used in placeholder answers.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::MissingApiKey { .. } | ProviderError::NotRegistered(_) => {
                "ConfigError"
            }
            ProviderError::NotSupported(_) => "NotSupported",
            ProviderError::Network(_) => "NetworkError",
            ProviderError::Timeout(_) => "TimeoutError",
            ProviderError::Status { .. } => "HttpStatusError",
            ProviderError::MalformedResponse(_) => "MalformedResponse",
            ProviderError::EmptyResponse(_) => "EmptyResponse",
        }
    }

    /// Map a `reqwest` transport error, distinguishing timeouts.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout_secs)
        } else if err.is_decode() {
            ProviderError::MalformedResponse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}
