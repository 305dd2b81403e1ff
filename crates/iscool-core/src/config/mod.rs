//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use iscool_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Reasoner: {}", cfg.fusion.reasoner);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config, save_config};
pub use schema::{AggregatorConfig, Config, FusionConfig, ProviderConfig, ProvidersConfig};
