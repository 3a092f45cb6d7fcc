use crate::Result;
use fitgate_core::{Descriptor, Node};
use std::collections::BTreeMap;

/// Delimiter placed between the reasons of a rejected node
pub const REASON_DELIMITER: &str = ",";

/// Fitness of a node for a workload
///
/// Returned by a single predicate and also used as the accumulated outcome of
/// every predicate evaluated for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fit {
    /// Whether the node is admissible
    pub fits: bool,
    /// Human-readable reasons, in evaluation order
    pub reasons: Vec<String>,
}

impl Fit {
    /// The node is admissible
    pub fn pass() -> Self {
        Self {
            fits: true,
            reasons: Vec::new(),
        }
    }

    /// The node is rejected for one reason
    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            fits: false,
            reasons: vec![reason.into()],
        }
    }

    /// The node is rejected for several reasons
    pub fn fail_with<I, S>(reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fits: false,
            reasons: reasons.into_iter().map(Into::into).collect(),
        }
    }

    /// Fold another result into this one: AND the flags, append the reasons
    pub fn absorb(&mut self, other: Fit) {
        self.fits = self.fits && other.fits;
        self.reasons.extend(other.reasons);
    }

    /// Reasons joined with [`REASON_DELIMITER`]
    pub fn joined_reasons(&self) -> String {
        self.reasons.join(REASON_DELIMITER)
    }
}

/// Partition of the candidate nodes produced by one filter call
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Admissible nodes, in candidate order
    pub admissible: Vec<Node>,
    /// Rejected node name to joined reasons
    pub rejected: BTreeMap<String, String>,
}

impl FilterOutcome {
    /// Names of the admissible nodes, in candidate order
    pub fn admissible_names(&self) -> Vec<String> {
        self.admissible
            .iter()
            .filter_map(|node| node.name().map(str::to_string))
            .collect()
    }
}

/// Result of a filter call as handed to the transport
///
/// When `error` is set the partitions are empty and must not be acted on.
#[derive(Debug, Clone, Default)]
pub struct FilterResponse {
    /// Admissible nodes, in candidate order
    pub nodes: Vec<Node>,
    /// Rejected node name to joined reasons
    pub failed_nodes: BTreeMap<String, String>,
    /// Top-level error, if the call failed
    pub error: Option<String>,
}

impl FilterResponse {
    /// Build a response from the outcome of a filter call
    pub fn from_result(result: Result<FilterOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                nodes: outcome.admissible,
                failed_nodes: outcome.rejected,
                error: None,
            },
            Err(e) => Self {
                nodes: Vec::new(),
                failed_nodes: BTreeMap::new(),
                error: Some(e.to_string()),
            },
        }
    }

    /// Whether the call failed as a whole
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Names of the admissible nodes, in candidate order
    pub fn node_names(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter_map(|node| node.name().map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchedulerError;
    use fitgate_core::node_from_name;

    #[test]
    fn test_fit_absorb() {
        let mut fit = Fit::pass();
        fit.absorb(Fit::fail("too old"));
        fit.absorb(Fit::pass());
        fit.absorb(Fit::fail_with(["no gpu", "no ssd"]));

        assert!(!fit.fits);
        assert_eq!(fit.reasons, vec!["too old", "no gpu", "no ssd"]);
        assert_eq!(fit.joined_reasons(), "too old,no gpu,no ssd");
    }

    #[test]
    fn test_fit_pass_stays_pass() {
        let mut fit = Fit::pass();
        fit.absorb(Fit::pass());
        assert!(fit.fits);
        assert!(fit.reasons.is_empty());
        assert_eq!(fit.joined_reasons(), "");
    }

    #[test]
    fn test_response_from_error_drops_partitions() {
        let response = FilterResponse::from_result(Err(SchedulerError::internal_error("boom")));
        assert!(response.is_error());
        assert!(response.nodes.is_empty());
        assert!(response.failed_nodes.is_empty());
        assert_eq!(response.error.as_deref(), Some("Internal error: boom"));
    }

    #[test]
    fn test_response_from_outcome() {
        let mut outcome = FilterOutcome::default();
        outcome.admissible.push(node_from_name("nodeA"));
        outcome
            .rejected
            .insert("p1620-3".to_string(), "too old".to_string());

        assert_eq!(outcome.admissible_names(), vec!["nodeA"]);

        let response = FilterResponse::from_result(Ok(outcome));
        assert!(!response.is_error());
        assert_eq!(response.node_names(), vec!["nodeA"]);
        assert_eq!(response.failed_nodes["p1620-3"], "too old");
    }
}
