//! Aggregation engine for IsCool.
//!
//! [`Aggregator`] fans a question out to the requested providers and collects
//! every outcome, or runs the fixed two-stage [`fusion`] pipeline when the
//! request names the `"fusion"` sentinel.

pub mod engine;
pub mod error;
pub mod fusion;
pub mod placeholder;

pub use engine::Aggregator;
pub use error::AggregateError;
pub use fusion::{FusionPipeline, FusionPlan, FusionState};
