//! Insta-Maintain triage
//!
//! Deterministic keyword classification of issue descriptions and contractor
//! assignment by category.
//!
//! # Core Concepts
//!
//! - [`Classifier`]: scores text against an ordered [`CategoryTable`]
//! - [`ConfidencePolicy`]: capped, non-decreasing score-to-confidence curve
//! - [`ContractorAssigner`]: picks a pool member through a [`PoolSelector`]
//! - [`Triage`]: both, built from one [`TriageConfig`]
//!
//! # Example
//!
//! ```rust
//! use maint_triage::{Category, Classifier, Priority};
//!
//! let result = Classifier::default().classify("water leaking from the pipe under the sink");
//! assert_eq!(result.category, Category::Plumbing);
//! assert_eq!(result.priority, Priority::High);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod assigner;
mod category;
mod classifier;
mod confidence;
mod config;
mod error;

pub use assigner::{
    ContractorAssigner, ContractorId, FixedSelector, PoolConfig, PoolSelector, RandomSelector,
    RoundRobinSelector,
};
pub use category::{Category, CategoryProfile, CategoryTable, Priority};
pub use classifier::{Classification, Classifier};
pub use confidence::ConfidencePolicy;
pub use config::{Triage, TriageConfig, TriageOutcome};
pub use error::TriageConfigError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
