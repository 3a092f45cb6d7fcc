// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Raised by a predicate that could not determine whether a node fits
#[derive(Error, Debug, Diagnostic)]
#[error("{message}")]
#[diagnostic(
    code(scheduler::predicate_error),
    help("The predicate could not reach a decision; check the dependency it consults")
)]
pub struct PredicateError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PredicateError {
    /// Create a predicate error with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a predicate error wrapping an underlying cause
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Message describing why the predicate failed
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Scheduler error type
#[derive(Error, Debug, Diagnostic)]
pub enum SchedulerError {
    /// Two predicates registered under the same name
    #[error("Predicate {name} is registered more than once")]
    #[diagnostic(
        code(scheduler::duplicate_predicate),
        help("Predicate names must be unique; rename or drop one of the registrations")
    )]
    DuplicatePredicate {
        #[allow(unused)]
        name: String,
    },

    /// Evaluation order or lookup names a predicate that is not registered
    #[error("Predicate {name} is not registered")]
    #[diagnostic(
        code(scheduler::unknown_predicate),
        help("Register the predicate before listing it in the evaluation order")
    )]
    UnknownPredicate {
        #[allow(unused)]
        name: String,
    },

    /// A registered predicate is missing from the evaluation order
    #[error("Predicate {name} is registered but absent from the evaluation order")]
    #[diagnostic(
        code(scheduler::unordered_predicate),
        help("Add the predicate to the evaluation order or remove its registration")
    )]
    UnorderedPredicate {
        #[allow(unused)]
        name: String,
    },

    /// A predicate could not evaluate a node
    #[error("Predicate {predicate} could not evaluate node {node}: {source}")]
    #[diagnostic(
        code(scheduler::predicate_failed),
        help("Node fitness is unknown; the filter call did not produce a partition")
    )]
    PredicateFailed {
        #[allow(unused)]
        predicate: String,
        #[allow(unused)]
        node: String,
        #[source]
        source: PredicateError,
    },

    /// Candidate node list cannot be partitioned
    #[error("Invalid candidate nodes: {reason}")]
    #[diagnostic(
        code(scheduler::invalid_candidate),
        help("Every candidate node needs a unique, non-empty metadata.name")
    )]
    InvalidCandidate {
        #[allow(unused)]
        reason: String,
    },

    /// Internal error
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(scheduler::internal_error),
        help("This is likely a bug. Please report it")
    )]
    InternalError {
        #[allow(unused)]
        message: String,
    },
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

impl SchedulerError {
    /// Create a DuplicatePredicate error
    pub fn duplicate_predicate(name: impl Into<String>) -> Self {
        Self::DuplicatePredicate { name: name.into() }
    }

    /// Create an UnknownPredicate error
    pub fn unknown_predicate(name: impl Into<String>) -> Self {
        Self::UnknownPredicate { name: name.into() }
    }

    /// Create an UnorderedPredicate error
    pub fn unordered_predicate(name: impl Into<String>) -> Self {
        Self::UnorderedPredicate { name: name.into() }
    }

    /// Create a PredicateFailed error
    pub fn predicate_failed(
        predicate: impl Into<String>,
        node: impl Into<String>,
        source: PredicateError,
    ) -> Self {
        Self::PredicateFailed {
            predicate: predicate.into(),
            node: node.into(),
            source,
        }
    }

    /// Create an InvalidCandidate error
    pub fn invalid_candidate(reason: impl Into<String>) -> Self {
        Self::InvalidCandidate {
            reason: reason.into(),
        }
    }

    /// Create an InternalError
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Whether this error comes from a malformed predicate registry
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicatePredicate { .. }
                | Self::UnknownPredicate { .. }
                | Self::UnorderedPredicate { .. }
        )
    }
}
