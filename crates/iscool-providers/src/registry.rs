//! Provider registry — the known provider kinds, their static specs, and the
//! lazily-invoked factories that build clients at request time.
//!
//! Construction is deferred so a missing key for one vendor never prevents
//! the process from starting or from serving the other vendors.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use iscool_core::config::{Config, ProviderConfig};

use crate::error::ProviderError;
use crate::gemini::GeminiProvider;
use crate::http_provider::HttpProvider;
use crate::prompts::DEFAULT_SYSTEM_PROMPT;
use crate::traits::{ClientSettings, LlmClient, Reasoner};

// ─────────────────────────────────────────────
// ProviderKind + ProviderSpec
// ─────────────────────────────────────────────

/// Every provider identifier the registry understands.
///
/// Discriminants index into [`PROVIDERS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi = 0,
    HuggingFace = 1,
    Gemini = 2,
    DeepSeek = 3,
    GeminiReasoner = 4,
    DeepSeekReasoner = 5,
}

impl ProviderKind {
    /// Parse a requested identifier. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        PROVIDERS.iter().find(|s| s.name == name).map(|s| s.kind)
    }

    /// Static spec for this kind.
    pub fn spec(self) -> &'static ProviderSpec {
        &PROVIDERS[self as usize]
    }

    /// Stable identifier (e.g. `"gemini-reasoner"`).
    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

/// Wire protocol spoken by a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// OpenAI-compatible `/chat/completions`.
    OpenAiCompatible,
    /// Gemini `generateContent`.
    Gemini,
}

/// What a provider kind can be used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Ask,
    Synthesize,
}

/// Static specification describing one provider kind.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Requested identifier (e.g. `"huggingface"`).
    pub name: &'static str,
    /// Human-readable name for logs.
    pub display_name: &'static str,
    /// Config section under `providers` (reasoners share their vendor's).
    pub section: &'static str,
    /// Vendor env var consulted when the config has no key.
    pub env_key: &'static str,
    pub backend: Backend,
    pub capability: Capability,
    pub default_api_base: &'static str,
    pub default_model: &'static str,
    pub default_temperature: Option<f64>,
    pub default_timeout_secs: u64,
}

/// All known providers, in [`ProviderKind`] discriminant order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::OpenAi,
        name: "openai",
        display_name: "OpenAI",
        section: "openai",
        env_key: "OPENAI_API_KEY",
        backend: Backend::OpenAiCompatible,
        capability: Capability::Ask,
        default_api_base: "https://api.openai.com/v1",
        default_model: "gpt-4o-mini",
        default_temperature: Some(0.7),
        default_timeout_secs: 40,
    },
    ProviderSpec {
        kind: ProviderKind::HuggingFace,
        name: "huggingface",
        display_name: "HuggingFace",
        section: "huggingface",
        env_key: "HUGGINGFACE_API_KEY",
        backend: Backend::OpenAiCompatible,
        capability: Capability::Ask,
        default_api_base: "https://router.huggingface.co/v1",
        default_model: "meta-llama/Llama-3.1-8B-Instruct",
        default_temperature: Some(0.7),
        default_timeout_secs: 40,
    },
    ProviderSpec {
        kind: ProviderKind::Gemini,
        name: "gemini",
        display_name: "Gemini",
        section: "gemini",
        env_key: "GEMINI_API_KEY",
        backend: Backend::Gemini,
        capability: Capability::Ask,
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
        default_model: "gemini-2.5-flash",
        default_temperature: Some(0.7),
        default_timeout_secs: 40,
    },
    ProviderSpec {
        kind: ProviderKind::DeepSeek,
        name: "deepseek",
        display_name: "DeepSeek",
        section: "deepseek",
        env_key: "DEEPSEEK_API_KEY",
        backend: Backend::OpenAiCompatible,
        capability: Capability::Ask,
        default_api_base: "https://api.deepseek.com",
        default_model: "deepseek-chat",
        default_temperature: None,
        default_timeout_secs: 40,
    },
    ProviderSpec {
        kind: ProviderKind::GeminiReasoner,
        name: "gemini-reasoner",
        display_name: "Gemini Reasoner",
        section: "gemini",
        env_key: "GEMINI_API_KEY",
        backend: Backend::Gemini,
        capability: Capability::Synthesize,
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
        default_model: "gemini-2.5-flash",
        default_temperature: Some(0.3),
        default_timeout_secs: 50,
    },
    ProviderSpec {
        kind: ProviderKind::DeepSeekReasoner,
        name: "deepseek-reasoner",
        display_name: "DeepSeek Reasoner",
        section: "deepseek",
        env_key: "DEEPSEEK_API_KEY",
        backend: Backend::OpenAiCompatible,
        capability: Capability::Synthesize,
        default_api_base: "https://api.deepseek.com",
        default_model: "deepseek-reasoner",
        default_temperature: None,
        default_timeout_secs: 50,
    },
];

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    ProviderKind::from_name(name).map(ProviderKind::spec)
}

/// Merge vendor config with the spec's defaults.
///
/// Key precedence: config `apiKey` → the spec's env var → `MissingApiKey`.
/// Reasoner kinds read `reasonerModel` and ignore the configured temperature.
pub fn resolve_settings(
    spec: &'static ProviderSpec,
    config: &ProviderConfig,
    system_prompt: &str,
) -> Result<ClientSettings, ProviderError> {
    let api_key = if config.is_configured() {
        config.api_key.clone()
    } else {
        std::env::var(spec.env_key)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::MissingApiKey {
                provider: spec.display_name,
                section: spec.section,
                env_key: spec.env_key,
            })?
    };

    let (model, temperature) = match spec.capability {
        Capability::Ask => (
            config.model.clone(),
            config.temperature.or(spec.default_temperature),
        ),
        Capability::Synthesize => (config.reasoner_model.clone(), spec.default_temperature),
    };

    Ok(ClientSettings {
        display_name: spec.display_name,
        api_base: config
            .api_base
            .clone()
            .unwrap_or_else(|| spec.default_api_base.to_string()),
        api_key,
        model: model.unwrap_or_else(|| spec.default_model.to_string()),
        system_prompt: system_prompt.to_string(),
        temperature,
        timeout_secs: config.timeout_secs.unwrap_or(spec.default_timeout_secs),
        extra_headers: config.extra_headers.clone().unwrap_or_default(),
    })
}

/// Build a question-answering client for `spec`.
pub fn build_client(
    spec: &'static ProviderSpec,
    config: &ProviderConfig,
    system_prompt: &str,
) -> Result<Arc<dyn LlmClient>, ProviderError> {
    if spec.capability != Capability::Ask {
        return Err(ProviderError::NotSupported(format!(
            "'{}' only synthesizes answers; it cannot answer questions directly",
            spec.name
        )));
    }

    let settings = resolve_settings(spec, config, system_prompt)?;
    debug!(
        provider = spec.display_name,
        model = %settings.model,
        api_base = %settings.api_base,
        "Creating LLM client"
    );

    let client: Arc<dyn LlmClient> = match spec.backend {
        Backend::OpenAiCompatible => Arc::new(HttpProvider::new(settings)?),
        Backend::Gemini => Arc::new(GeminiProvider::new(settings)?),
    };
    Ok(client)
}

/// Build a synthesis client for `spec`.
pub fn build_reasoner(
    spec: &'static ProviderSpec,
    config: &ProviderConfig,
) -> Result<Arc<dyn Reasoner>, ProviderError> {
    if spec.capability != Capability::Synthesize {
        return Err(ProviderError::NotSupported(format!(
            "'{}' cannot act as a reasoner",
            spec.name
        )));
    }

    let settings = resolve_settings(spec, config, "")?;
    debug!(
        provider = spec.display_name,
        model = %settings.model,
        "Creating reasoner"
    );

    let reasoner: Arc<dyn Reasoner> = match spec.backend {
        Backend::OpenAiCompatible => Arc::new(HttpProvider::new(settings)?),
        Backend::Gemini => Arc::new(GeminiProvider::new(settings)?.with_relaxed_safety()),
    };
    Ok(reasoner)
}

// ─────────────────────────────────────────────
// ProviderRegistry
// ─────────────────────────────────────────────

/// Zero-argument constructor for a question-answering client.
pub type ClientFactory = Arc<dyn Fn() -> Result<Arc<dyn LlmClient>, ProviderError> + Send + Sync>;

/// Zero-argument constructor for a reasoner.
pub type ReasonerFactory = Arc<dyn Fn() -> Result<Arc<dyn Reasoner>, ProviderError> + Send + Sync>;

/// Maps provider kinds to factories. Read-only once built; share it via `Arc`.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    clients: HashMap<ProviderKind, ClientFactory>,
    reasoners: HashMap<ProviderKind, ReasonerFactory>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut clients: Vec<&str> = self.clients.keys().map(|k| k.name()).collect();
        let mut reasoners: Vec<&str> = self.reasoners.keys().map(|k| k.name()).collect();
        clients.sort_unstable();
        reasoners.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("clients", &clients)
            .field("reasoners", &reasoners)
            .finish()
    }
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for every known provider, reading keys and
    /// overrides from `config` at construction time.
    ///
    /// Reasoner-only kinds also get a client factory that always fails with
    /// `NotSupported`, so requesting them as answerers is reported rather
    /// than silently treated as unknown.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        let system_prompt: Arc<str> = config
            .aggregator
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
            .into();

        for spec in PROVIDERS {
            let vendor = config
                .providers
                .get_by_name(spec.section)
                .cloned()
                .unwrap_or_default();

            match spec.capability {
                Capability::Ask => {
                    let prompt = Arc::clone(&system_prompt);
                    registry.register_client(spec.kind, move || {
                        build_client(spec, &vendor, &prompt)
                    });
                }
                Capability::Synthesize => {
                    let client_vendor = vendor.clone();
                    registry.register_reasoner(spec.kind, move || build_reasoner(spec, &vendor));
                    registry.register_client(spec.kind, move || {
                        build_client(spec, &client_vendor, "")
                    });
                }
            }
        }

        registry
    }

    /// Register (or replace) the client factory for `kind`.
    pub fn register_client<F>(&mut self, kind: ProviderKind, factory: F)
    where
        F: Fn() -> Result<Arc<dyn LlmClient>, ProviderError> + Send + Sync + 'static,
    {
        self.clients.insert(kind, Arc::new(factory));
    }

    /// Register (or replace) the reasoner factory for `kind`.
    pub fn register_reasoner<F>(&mut self, kind: ProviderKind, factory: F)
    where
        F: Fn() -> Result<Arc<dyn Reasoner>, ProviderError> + Send + Sync + 'static,
    {
        self.reasoners.insert(kind, Arc::new(factory));
    }

    /// Look up a client factory by requested identifier.
    pub fn lookup(&self, name: &str) -> Option<(ProviderKind, &ClientFactory)> {
        let kind = ProviderKind::from_name(name)?;
        self.clients.get(&kind).map(|factory| (kind, factory))
    }

    pub fn client_factory(&self, kind: ProviderKind) -> Option<&ClientFactory> {
        self.clients.get(&kind)
    }

    pub fn reasoner_factory(&self, kind: ProviderKind) -> Option<&ReasonerFactory> {
        self.reasoners.get(&kind)
    }

    /// Identifiers that can be requested for fan-out, in registry order.
    pub fn answerer_names(&self) -> Vec<&'static str> {
        PROVIDERS
            .iter()
            .filter(|s| s.capability == Capability::Ask && self.clients.contains_key(&s.kind))
            .map(|s| s.name)
            .collect()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Spec whose env var is never set, so key resolution is deterministic.
    static TEST_SPEC: ProviderSpec = ProviderSpec {
        kind: ProviderKind::OpenAi,
        name: "openai",
        display_name: "TestVendor",
        section: "openai",
        env_key: "ISCOOL_TEST_NEVER_SET_API_KEY",
        backend: Backend::OpenAiCompatible,
        capability: Capability::Ask,
        default_api_base: "https://api.test/v1",
        default_model: "test-model",
        default_temperature: Some(0.7),
        default_timeout_secs: 40,
    };

    fn keyed(api_base: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: "key".to_string(),
            api_base: api_base.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_discriminants_index_providers() {
        for (i, spec) in PROVIDERS.iter().enumerate() {
            assert_eq!(spec.kind as usize, i, "{} out of order", spec.name);
        }
    }

    #[test]
    fn test_all_providers_have_unique_names() {
        let mut names: Vec<&str> = PROVIDERS.iter().map(|s| s.name).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total, "Duplicate provider names found");
        assert!(!names.contains(&"fusion"));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ProviderKind::from_name("gemini"), Some(ProviderKind::Gemini));
        assert_eq!(
            ProviderKind::from_name("deepseek-reasoner"),
            Some(ProviderKind::DeepSeekReasoner)
        );
        assert_eq!(ProviderKind::from_name("doesnotexist"), None);
        assert_eq!(ProviderKind::from_name("Gemini"), None);
        assert_eq!(ProviderKind::HuggingFace.name(), "huggingface");
    }

    #[test]
    fn test_find_by_name() {
        let spec = find_by_name("deepseek").unwrap();
        assert_eq!(spec.display_name, "DeepSeek");
        assert_eq!(spec.env_key, "DEEPSEEK_API_KEY");
    }

    #[test]
    fn test_resolve_settings_defaults() {
        let settings = resolve_settings(&TEST_SPEC, &keyed(None), "prompt").unwrap();
        assert_eq!(settings.api_key, "key");
        assert_eq!(settings.api_base, "https://api.test/v1");
        assert_eq!(settings.model, "test-model");
        assert_eq!(settings.temperature, Some(0.7));
        assert_eq!(settings.timeout_secs, 40);
        assert_eq!(settings.system_prompt, "prompt");
    }

    #[test]
    fn test_resolve_settings_config_overrides() {
        let config = ProviderConfig {
            api_key: "key".to_string(),
            api_base: Some("https://proxy.example/v1".to_string()),
            model: Some("gpt-4o".to_string()),
            timeout_secs: Some(5),
            temperature: Some(0.2),
            ..Default::default()
        };
        let settings = resolve_settings(&TEST_SPEC, &config, "").unwrap();
        assert_eq!(settings.api_base, "https://proxy.example/v1");
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.temperature, Some(0.2));
    }

    #[test]
    fn test_resolve_settings_missing_key() {
        let err = resolve_settings(&TEST_SPEC, &ProviderConfig::default(), "").unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
        assert!(err.to_string().contains("ISCOOL_TEST_NEVER_SET_API_KEY"));
    }

    #[test]
    fn test_reasoner_reads_reasoner_model() {
        let spec = ProviderKind::GeminiReasoner.spec();
        let config = ProviderConfig {
            api_key: "g".to_string(),
            model: Some("gemini-2.0-flash".to_string()),
            reasoner_model: Some("gemini-2.5-pro".to_string()),
            temperature: Some(1.0),
            ..Default::default()
        };
        let settings = resolve_settings(spec, &config, "").unwrap();
        assert_eq!(settings.model, "gemini-2.5-pro");
        assert_eq!(settings.temperature, Some(0.3));
        assert_eq!(settings.timeout_secs, 50);
    }

    #[test]
    fn test_build_client_rejects_reasoner_only_kind() {
        let spec = ProviderKind::DeepSeekReasoner.spec();
        let err = build_client(spec, &keyed(None), "").err().unwrap();
        assert_eq!(err.kind(), "NotSupported");
    }

    #[test]
    fn test_build_reasoner_rejects_answerer_kind() {
        let spec = ProviderKind::HuggingFace.spec();
        let err = build_reasoner(spec, &keyed(None)).err().unwrap();
        assert_eq!(err.kind(), "NotSupported");
    }

    #[test]
    fn test_registry_lookup() {
        let mut config = Config::default();
        config.providers.gemini.api_key = "g".to_string();
        let registry = ProviderRegistry::from_config(&config);

        let (kind, factory) = registry.lookup("gemini").unwrap();
        assert_eq!(kind, ProviderKind::Gemini);
        assert!(factory().is_ok());

        assert!(registry.lookup("doesnotexist").is_none());
        assert!(registry.lookup("fusion").is_none());

        let (_, factory) = registry.lookup("gemini-reasoner").unwrap();
        assert_eq!(factory().err().unwrap().kind(), "NotSupported");

        let reasoner = registry.reasoner_factory(ProviderKind::GeminiReasoner).unwrap();
        assert!(reasoner().is_ok());
    }

    #[test]
    fn test_answerer_names() {
        let registry = ProviderRegistry::from_config(&Config::default());
        assert_eq!(
            registry.answerer_names(),
            vec!["openai", "huggingface", "gemini", "deepseek"]
        );
        assert!(ProviderRegistry::new().answerer_names().is_empty());
    }

    #[tokio::test]
    async fn test_factory_builds_working_client() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "content": "Resposta HF OK" },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&mock_server)
            .await;

        let mut config = Config::default();
        config.providers.huggingface = keyed(Some(&mock_server.uri()));
        let registry = ProviderRegistry::from_config(&config);

        let (_, factory) = registry.lookup("huggingface").unwrap();
        let client = factory().unwrap();
        assert_eq!(client.ask("O que é VPC?").await.unwrap(), "Resposta HF OK");
    }
}
