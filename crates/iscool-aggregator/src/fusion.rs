//! Fusion pipeline: two fixed sources answer in parallel, then a reasoner
//! merges both texts into the final answer.
//!
//! The run is an explicit state machine,
//! `Dispatched → Gathered → Synthesizing → Done`, advanced by
//! [`FusionPipeline::step`]. No transition can fail: every failure becomes
//! placeholder text, and `Gathered` always moves on to `Synthesizing`.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use iscool_core::config::FusionConfig;
use iscool_core::{AggregatedResponse, ProviderAnswer};
use iscool_providers::registry::{find_by_name, Capability};
use iscool_providers::{ProviderError, ProviderKind, ProviderRegistry, Reasoner};

use crate::placeholder;

/// Which providers take part in fusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FusionPlan {
    /// Stage-1 sources, in answer order.
    pub sources: [ProviderKind; 2],
    pub reasoner: ProviderKind,
}

impl Default for FusionPlan {
    fn default() -> Self {
        Self::new(ProviderKind::GeminiReasoner)
    }
}

impl FusionPlan {
    /// Fixed sources (`gemini`, `huggingface`) with the given reasoner.
    pub fn new(reasoner: ProviderKind) -> Self {
        Self {
            sources: [ProviderKind::Gemini, ProviderKind::HuggingFace],
            reasoner,
        }
    }

    /// Resolve the configured reasoner. Anything that is not a
    /// synthesis-capable identifier falls back to the default.
    pub fn from_config(config: &FusionConfig) -> Self {
        match find_by_name(&config.reasoner) {
            Some(spec) if spec.capability == Capability::Synthesize => Self::new(spec.kind),
            _ => {
                warn!(
                    reasoner = %config.reasoner,
                    "Configured fusion reasoner is not a reasoner, using default"
                );
                Self::default()
            }
        }
    }
}

/// Where a fusion run currently is.
pub enum FusionState {
    /// Stage-1 asks are about to be dispatched.
    Dispatched,
    /// Both stage-1 slots hold text (answer or placeholder).
    Gathered(Vec<ProviderAnswer>),
    /// The reasoner has been resolved and is about to synthesize.
    Synthesizing {
        answers: Vec<ProviderAnswer>,
        reasoner: Result<Arc<dyn Reasoner>, ProviderError>,
    },
    Done(AggregatedResponse),
}

impl FusionState {
    pub fn name(&self) -> &'static str {
        match self {
            FusionState::Dispatched => "dispatched",
            FusionState::Gathered(_) => "gathered",
            FusionState::Synthesizing { .. } => "synthesizing",
            FusionState::Done(_) => "done",
        }
    }
}

/// One fusion run over a single question.
pub struct FusionPipeline<'a> {
    registry: &'a ProviderRegistry,
    plan: FusionPlan,
    question: &'a str,
}

impl<'a> FusionPipeline<'a> {
    pub fn new(registry: &'a ProviderRegistry, plan: FusionPlan, question: &'a str) -> Self {
        Self {
            registry,
            plan,
            question,
        }
    }

    /// Drive the state machine to `Done`.
    pub async fn run(&self) -> AggregatedResponse {
        let mut state = FusionState::Dispatched;
        loop {
            state = match state {
                FusionState::Done(response) => return response,
                other => self.step(other).await,
            };
        }
    }

    /// Perform exactly one transition. `Done` is terminal and returned as is.
    pub async fn step(&self, state: FusionState) -> FusionState {
        let next = match state {
            FusionState::Dispatched => FusionState::Gathered(self.gather().await),
            FusionState::Gathered(answers) => FusionState::Synthesizing {
                answers,
                reasoner: self.build_reasoner(),
            },
            FusionState::Synthesizing { answers, reasoner } => {
                let final_answer = self.synthesize(&answers, reasoner).await;
                FusionState::Done(AggregatedResponse {
                    final_answer,
                    answers,
                })
            }
            done @ FusionState::Done(_) => done,
        };
        debug!(state = next.name(), "Fusion transition");
        next
    }

    async fn gather(&self) -> Vec<ProviderAnswer> {
        let question = self.question;
        let calls = self.plan.sources.iter().map(|&kind| async move {
            let result = match self.registry.client_factory(kind) {
                Some(factory) => match factory() {
                    Ok(client) => client.ask(question).await,
                    Err(e) => Err(e),
                },
                None => Err(ProviderError::NotRegistered(kind.name().to_string())),
            };
            (kind, result)
        });

        join_all(calls)
            .await
            .into_iter()
            .map(|(kind, result)| {
                let label = kind.name();
                match result {
                    Ok(text) => {
                        debug!(provider = label, chars = text.len(), "Fusion source answered");
                        ProviderAnswer::new(label, text)
                    }
                    Err(e) => {
                        warn!(provider = label, kind = e.kind(), error = %e, "Fusion source failed");
                        ProviderAnswer::new(label, placeholder::stage_failure(label, &e))
                    }
                }
            })
            .collect()
    }

    fn build_reasoner(&self) -> Result<Arc<dyn Reasoner>, ProviderError> {
        let kind = self.plan.reasoner;
        match self.registry.reasoner_factory(kind) {
            Some(factory) => factory(),
            None => Err(ProviderError::NotRegistered(kind.name().to_string())),
        }
    }

    async fn synthesize(
        &self,
        answers: &[ProviderAnswer],
        reasoner: Result<Arc<dyn Reasoner>, ProviderError>,
    ) -> String {
        let result = match (reasoner, answers) {
            (Ok(reasoner), [first, second]) => {
                info!(reasoner = self.plan.reasoner.name(), "Synthesizing fusion answer");
                reasoner
                    .synthesize(self.question, &first.answer, &second.answer)
                    .await
            }
            (Ok(_), _) => Err(ProviderError::NotSupported(format!(
                "reasoner expects exactly two answers, got {}",
                answers.len()
            ))),
            (Err(e), _) => Err(e),
        };

        result.unwrap_or_else(|e| {
            warn!(
                reasoner = self.plan.reasoner.name(),
                kind = e.kind(),
                error = %e,
                "Fusion synthesis failed"
            );
            placeholder::reasoner_failure(&e)
        })
    }
}
