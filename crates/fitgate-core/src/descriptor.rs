use crate::{FitgateError, Node, ObjectMeta, Pod, Result};
use std::collections::BTreeMap;

/// Placeholder used in logs and messages for descriptors without a name
pub const UNNAMED: &str = "<unnamed>";

/// Read-only accessors over the metadata of a workload or node descriptor
pub trait Descriptor {
    /// Kind of the descriptor ("Pod", "Node")
    fn kind(&self) -> &'static str;

    /// Metadata of the descriptor
    fn metadata(&self) -> &ObjectMeta;

    /// Name of the descriptor, if set and non-empty
    fn name(&self) -> Option<&str> {
        self.metadata().name.as_deref().filter(|n| !n.is_empty())
    }

    /// Namespace of the descriptor, if set and non-empty
    fn namespace(&self) -> Option<&str> {
        self.metadata()
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
    }

    /// Labels attached to the descriptor
    fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata().labels.as_ref()
    }

    /// Name qualified by namespace ("namespace/name") for logging
    fn display_name(&self) -> String {
        let name = self.name().unwrap_or(UNNAMED);
        match self.namespace() {
            Some(ns) => format!("{}/{}", ns, name),
            None => name.to_string(),
        }
    }

    /// Name of the descriptor, or an error when it has none
    fn require_name(&self) -> Result<&str> {
        self.name().ok_or_else(|| {
            FitgateError::invalid_descriptor(
                format!("{} has no metadata.name", self.kind()),
                format!("Every {} passed to the extender must be named", self.kind()),
            )
        })
    }
}

impl Descriptor for Pod {
    fn kind(&self) -> &'static str {
        "Pod"
    }

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl Descriptor for Node {
    fn kind(&self) -> &'static str {
        "Node"
    }

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

/// Build a node descriptor that carries only a name
///
/// Used when the orchestrator caches node objects and sends names only.
pub fn node_from_name(name: impl Into<String>) -> Node {
    let mut node = Node::default();
    node.metadata.name = Some(name.into());
    node
}
