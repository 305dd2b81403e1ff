//! Core types, configuration, and utilities shared by every IsCool crate.

pub mod config;
pub mod types;
pub mod utils;

pub use types::{AggregatedResponse, ProviderAnswer, QuestionRequest};
