//! Aggregation engine — mode selection and fan-out.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use iscool_core::config::Config;
use iscool_core::types::FUSION_SENTINEL;
use iscool_core::{AggregatedResponse, ProviderAnswer, QuestionRequest};
use iscool_providers::{LlmClient, ProviderRegistry};

use crate::error::AggregateError;
use crate::fusion::{FusionPipeline, FusionPlan};
use crate::placeholder;

/// Routes a question to the requested providers and merges what comes back.
///
/// Holds no per-request state; one instance can serve concurrent requests.
#[derive(Clone, Debug)]
pub struct Aggregator {
    registry: Arc<ProviderRegistry>,
    fusion: FusionPlan,
    summary_header: Option<String>,
}

impl Aggregator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            fusion: FusionPlan::default(),
            summary_header: None,
        }
    }

    /// Registry, fusion reasoner and presentation header from config.
    pub fn from_config(config: &Config) -> Self {
        let mut aggregator = Self::new(Arc::new(ProviderRegistry::from_config(config)))
            .with_fusion_plan(FusionPlan::from_config(&config.fusion));
        aggregator.summary_header = config
            .aggregator
            .summary_header
            .clone()
            .filter(|h| !h.trim().is_empty());
        aggregator
    }

    pub fn with_fusion_plan(mut self, plan: FusionPlan) -> Self {
        self.fusion = plan;
        self
    }

    /// Prepend `header` and a blank line to every fan-out `final_answer`.
    pub fn with_summary_header(mut self, header: impl Into<String>) -> Self {
        self.summary_header = Some(header.into());
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn fusion_plan(&self) -> FusionPlan {
        self.fusion
    }

    /// Entry point for a boundary layer holding a decoded request.
    pub async fn aggregate_answers(
        &self,
        request: &QuestionRequest,
    ) -> Result<AggregatedResponse, AggregateError> {
        self.aggregate(&request.question, &request.providers).await
    }

    /// Answer `question` with the requested providers.
    ///
    /// A `"fusion"` entry anywhere in `providers` switches to the fusion
    /// pipeline and every other entry is ignored.
    pub async fn aggregate(
        &self,
        question: &str,
        providers: &[String],
    ) -> Result<AggregatedResponse, AggregateError> {
        if providers.iter().any(|p| p == FUSION_SENTINEL) {
            if providers.len() > 1 {
                debug!(requested = ?providers, "Fusion requested, ignoring other providers");
            }
            return Ok(self.fuse(question).await);
        }
        self.fan_out(question, providers).await
    }

    /// Run the fusion pipeline. Never fails.
    pub async fn fuse(&self, question: &str) -> AggregatedResponse {
        info!(
            sources = ?self.fusion.sources.map(|k| k.name()),
            reasoner = self.fusion.reasoner.name(),
            "Running fusion"
        );
        FusionPipeline::new(&self.registry, self.fusion, question)
            .run()
            .await
    }

    async fn fan_out(
        &self,
        question: &str,
        providers: &[String],
    ) -> Result<AggregatedResponse, AggregateError> {
        let clients = self.resolve_clients(providers);
        if clients.is_empty() {
            return Err(AggregateError::NoValidProvider {
                requested: providers.to_vec(),
            });
        }

        info!(
            providers = ?clients.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            "Dispatching question"
        );

        let results = join_all(clients.iter().map(|(_, client)| client.ask(question))).await;

        let answers: Vec<ProviderAnswer> = clients
            .iter()
            .zip(results)
            .map(|((name, _), result)| match result {
                Ok(text) => {
                    debug!(provider = name, chars = text.len(), "Provider answered");
                    ProviderAnswer::new(*name, text)
                }
                Err(e) => {
                    error!(provider = name, kind = e.kind(), error = %e, "Provider call failed");
                    ProviderAnswer::new(*name, placeholder::provider_failure(name, &e))
                }
            })
            .collect();

        Ok(AggregatedResponse {
            final_answer: format_final_answer(self.summary_header.as_deref(), &answers),
            answers,
        })
    }

    /// Look up and construct clients in request order, first occurrence wins.
    fn resolve_clients(&self, providers: &[String]) -> Vec<(&'static str, Arc<dyn LlmClient>)> {
        let mut seen = HashSet::new();
        let mut clients = Vec::new();

        for name in providers {
            if !seen.insert(name.as_str()) {
                debug!(provider = %name, "Duplicate provider in request, skipping");
                continue;
            }
            let Some((kind, factory)) = self.registry.lookup(name) else {
                warn!(provider = %name, "Unknown provider, skipping");
                continue;
            };
            match factory() {
                Ok(client) => clients.push((kind.name(), client)),
                Err(e) => {
                    warn!(provider = %name, kind = e.kind(), error = %e, "Could not create provider, skipping")
                }
            }
        }

        clients
    }
}

/// `NAME: answer` lines in answer order, under an optional header.
pub fn format_final_answer(header: Option<&str>, answers: &[ProviderAnswer]) -> String {
    let body = answers
        .iter()
        .map(|a| format!("{}: {}", a.provider.to_uppercase(), a.answer))
        .collect::<Vec<_>>()
        .join("\n");

    match header {
        Some(header) => format!("{header}\n\n{body}"),
        None => body,
    }
}
