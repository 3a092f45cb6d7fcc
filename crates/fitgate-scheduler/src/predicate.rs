use crate::types::Fit;
use crate::PredicateError;
use fitgate_core::{Descriptor, Node, Pod};
use tracing::debug;

/// Name of the AVX capability predicate
pub const AVX_PREDICATE: &str = "AVX";

/// Reason reported when a node cannot run AVX workloads
pub const AVX_FAIL_REASON: &str = "Sorry, you are not powerful enough, buy a newer processor";

/// Workload name marker for workloads that need AVX
const AVX_WORKLOAD_MARKER: &str = "-avx";

/// Node name marker for hardware without AVX
const NON_AVX_NODE_MARKER: &str = "p1620";

/// A fitness rule evaluated for each (workload, node) pair
///
/// The decision must depend only on the two descriptors. An `Err` means the
/// predicate could not decide; evaluation of that node stops there.
pub trait Predicate: Send + Sync {
    /// Decide whether `node` can host `workload`
    fn evaluate(&self, workload: &Pod, node: &Node) -> Result<Fit, PredicateError>;
}

/// Predicate backed by a closure, see [`from_fn`]
pub struct FnPredicate<F>(F);

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&Pod, &Node) -> Result<Fit, PredicateError> + Send + Sync,
{
    fn evaluate(&self, workload: &Pod, node: &Node) -> Result<Fit, PredicateError> {
        (self.0)(workload, node)
    }
}

/// Wrap a closure as a predicate
pub fn from_fn<F>(f: F) -> FnPredicate<F>
where
    F: Fn(&Pod, &Node) -> Result<Fit, PredicateError> + Send + Sync,
{
    FnPredicate(f)
}

/// Rejects AVX workloads on nodes whose processors lack AVX
///
/// Workloads opt in by naming convention (`-avx` in the pod name) and the
/// affected hardware is recognised by node name (`p1620`).
pub struct AvxPredicate;

impl Predicate for AvxPredicate {
    fn evaluate(&self, workload: &Pod, node: &Node) -> Result<Fit, PredicateError> {
        let workload_name = workload.name().unwrap_or_default();
        let node_name = node.name().unwrap_or_default();

        if !workload_name.contains(AVX_WORKLOAD_MARKER) {
            debug!(
                workload = %workload.display_name(),
                node = node_name,
                "Workload does not need AVX"
            );
            return Ok(Fit::pass());
        }

        if node_name.contains(NON_AVX_NODE_MARKER) {
            debug!(
                workload = %workload.display_name(),
                node = node_name,
                labels = ?node.labels(),
                "Node lacks AVX"
            );
            return Ok(Fit::fail(AVX_FAIL_REASON));
        }

        debug!(
            workload = %workload.display_name(),
            node = node_name,
            labels = ?node.labels(),
            "Node supports AVX"
        );
        Ok(Fit::pass())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitgate_core::node_from_name;

    fn create_test_pod(name: &str) -> Pod {
        let mut pod = Pod::default();
        pod.metadata.name = Some(name.to_string());
        pod.metadata.namespace = Some("default".to_string());
        pod
    }

    #[test]
    fn test_avx_workload_on_old_hardware_fails() {
        let result = AvxPredicate
            .evaluate(&create_test_pod("job-avx"), &node_from_name("p1620-3"))
            .unwrap();

        assert!(!result.fits);
        assert_eq!(result.reasons, vec![AVX_FAIL_REASON]);
    }

    #[test]
    fn test_avx_workload_on_new_hardware_passes() {
        let result = AvxPredicate
            .evaluate(&create_test_pod("job-avx"), &node_from_name("nodeA"))
            .unwrap();

        assert_eq!(result, Fit::pass());
    }

    #[test]
    fn test_plain_workload_passes_anywhere() {
        let pod = create_test_pod("job-plain");

        for node in ["nodeA", "p1620-3"] {
            let result = AvxPredicate.evaluate(&pod, &node_from_name(node)).unwrap();
            assert!(result.fits, "{} should admit a plain workload", node);
        }
    }

    #[test]
    fn test_unnamed_workload_passes() {
        let result = AvxPredicate
            .evaluate(&Pod::default(), &node_from_name("p1620-3"))
            .unwrap();
        assert!(result.fits);
    }

    #[test]
    fn test_from_fn() {
        let predicate = from_fn(|_, node| match node.name() {
            Some("nodeX") => Err(PredicateError::new("lookup failed")),
            _ => Ok(Fit::pass()),
        });

        let pod = create_test_pod("job");
        assert!(predicate.evaluate(&pod, &node_from_name("nodeA")).is_ok());

        let err = predicate
            .evaluate(&pod, &node_from_name("nodeX"))
            .unwrap_err();
        assert_eq!(err.message(), "lookup failed");
    }
}
