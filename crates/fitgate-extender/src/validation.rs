use crate::wire::{CandidateMode, ExtenderArgs};
use crate::{ApiError, Result};
use fitgate_core::{node_from_name, Descriptor, Node, Pod};

/// A decoded filter request ready for the filter service
#[derive(Debug, Clone)]
pub struct FilterRequest {
    /// Workload being scheduled
    pub pod: Pod,
    /// Candidate nodes, in the order the scheduler sent them
    pub nodes: Vec<Node>,
    /// Shape the response must use
    pub mode: CandidateMode,
}

/// Validate extender arguments and resolve the candidate nodes
///
/// Full node objects take precedence over node names when both are present.
pub fn validate_args(args: ExtenderArgs) -> Result<FilterRequest> {
    let pod = args
        .pod
        .ok_or_else(|| ApiError::BadRequest("ExtenderArgs has no Pod".to_string()))?;
    pod.require_name()?;

    if let Some(list) = args.nodes {
        return Ok(FilterRequest {
            pod,
            nodes: list.items,
            mode: CandidateMode::Nodes,
        });
    }

    if let Some(names) = args.node_names {
        return Ok(FilterRequest {
            pod,
            nodes: names.into_iter().map(node_from_name).collect(),
            mode: CandidateMode::NodeNames,
        });
    }

    Err(ApiError::BadRequest(
        "ExtenderArgs has neither Nodes nor NodeNames".to_string(),
    ))
}
