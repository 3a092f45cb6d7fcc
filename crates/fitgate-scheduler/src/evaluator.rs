use crate::registry::PredicateRegistry;
use crate::types::Fit;
use crate::{Result, SchedulerError};
use fitgate_core::{Descriptor, Node, Pod};
use tracing::{debug, warn};

/// Run every registered predicate against one (workload, node) pair
///
/// Predicates run in the registry's evaluation order. A failing fit does not
/// stop evaluation, so the returned reasons cover every violated rule. The
/// first predicate error aborts the node and no partial reasons are returned.
pub fn evaluate_node(workload: &Pod, node: &Node, registry: &PredicateRegistry) -> Result<Fit> {
    let node_name = node.display_name();
    let mut fit = Fit::pass();

    for name in registry.evaluation_order() {
        let predicate = registry.lookup(name)?;

        let mut result = predicate
            .evaluate(workload, node)
            .map_err(|source| SchedulerError::predicate_failed(name.as_str(), &node_name, source))?;

        if !result.fits {
            if result.reasons.is_empty() {
                warn!(
                    predicate = %name,
                    node = %node_name,
                    "Predicate rejected node without a reason"
                );
                result.reasons.push(format!("rejected by predicate {}", name));
            }

            debug!(
                predicate = %name,
                node = %node_name,
                reasons = ?result.reasons,
                "Node filtered out"
            );
        }

        fit.absorb(result);
    }

    Ok(fit)
}
