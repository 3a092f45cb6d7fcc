//! Fitgate Scheduler - Node filtering for a scheduler extender
//!
//! This crate provides:
//! - The predicate contract and the built-in predicates
//! - An ordered, immutable predicate registry
//! - Per-node evaluation that aggregates every predicate's reasons
//! - The filter service partitioning candidates into admissible and rejected

pub mod error;
pub mod evaluator;
pub mod predicate;
pub mod registry;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use error::{PredicateError, Result, SchedulerError};
pub use evaluator::evaluate_node;
pub use predicate::{from_fn, AvxPredicate, Predicate};
pub use registry::{default_registry, PredicateRegistry, RegistryBuilder};
pub use service::{FilterConfig, FilterService, PredicateErrorPolicy};
pub use types::{Fit, FilterOutcome, FilterResponse, REASON_DELIMITER};
