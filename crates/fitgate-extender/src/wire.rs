//! Wire types of the kube-scheduler extender protocol
//!
//! The scheduler encodes these with Go field names (`Pod`, `Nodes`, ...) and
//! decodes case-insensitively, so lowercase keys are accepted on input.

use fitgate_core::{Node, Pod};
use fitgate_scheduler::FilterResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `v1.NodeList` as sent by the scheduler; list metadata is ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeList {
    #[serde(default)]
    pub items: Vec<Node>,
}

/// Arguments of a filter call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtenderArgs {
    /// Workload being scheduled
    #[serde(rename = "Pod", alias = "pod", default)]
    pub pod: Option<Pod>,

    /// Candidate nodes, when the scheduler sends full objects
    #[serde(
        rename = "Nodes",
        alias = "nodes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub nodes: Option<NodeList>,

    /// Candidate node names, when the extender is node-cache capable
    #[serde(
        rename = "NodeNames",
        alias = "nodenames",
        alias = "nodeNames",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub node_names: Option<Vec<String>>,
}

/// How the candidates were described in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateMode {
    /// Full node objects
    Nodes,
    /// Node names only
    NodeNames,
}

/// Result of a filter call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtenderFilterResult {
    /// Admissible nodes, when the request carried node objects
    #[serde(
        rename = "Nodes",
        alias = "nodes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub nodes: Option<NodeList>,

    /// Admissible node names, when the request carried names only
    #[serde(
        rename = "NodeNames",
        alias = "nodenames",
        alias = "nodeNames",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub node_names: Option<Vec<String>>,

    /// Rejected node name to joined reasons
    #[serde(rename = "FailedNodes", alias = "failedNodes", default)]
    pub failed_nodes: BTreeMap<String, String>,

    /// Top-level error; empty on success
    #[serde(rename = "Error", alias = "error", default)]
    pub error: String,
}

impl ExtenderFilterResult {
    /// Encode a filter response in the shape the request used
    pub fn from_response(response: FilterResponse, mode: CandidateMode) -> Self {
        if let Some(error) = response.error {
            return Self {
                error,
                ..Default::default()
            };
        }

        let (nodes, node_names) = match mode {
            CandidateMode::Nodes => (
                Some(NodeList {
                    items: response.nodes,
                }),
                None,
            ),
            CandidateMode::NodeNames => (None, Some(response.node_names())),
        };

        Self {
            nodes,
            node_names,
            failed_nodes: response.failed_nodes,
            error: String::new(),
        }
    }

    /// Whether the filter call failed as a whole
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitgate_core::{node_from_name, Descriptor};
    use serde_json::json;

    #[test]
    fn test_decode_go_field_names() {
        let args: ExtenderArgs = serde_json::from_value(json!({
            "Pod": {"apiVersion": "v1", "kind": "Pod", "metadata": {"name": "job-avx", "namespace": "default"}},
            "Nodes": {"items": [{"apiVersion": "v1", "kind": "Node", "metadata": {"name": "nodeA"}}]},
            "NodeNames": null
        }))
        .unwrap();

        assert_eq!(args.pod.unwrap().display_name(), "default/job-avx");
        assert_eq!(args.nodes.unwrap().items[0].name(), Some("nodeA"));
        assert!(args.node_names.is_none());
    }

    #[test]
    fn test_decode_lowercase_field_names() {
        let args: ExtenderArgs = serde_json::from_value(json!({
            "pod": {"apiVersion": "v1", "kind": "Pod", "metadata": {"name": "job"}},
            "nodenames": ["nodeA", "p1620-3"]
        }))
        .unwrap();

        assert!(args.pod.is_some());
        assert!(args.nodes.is_none());
        assert_eq!(args.node_names.unwrap(), vec!["nodeA", "p1620-3"]);
    }

    #[test]
    fn test_encode_success_with_nodes() {
        let mut response = FilterResponse::default();
        response.nodes.push(node_from_name("nodeA"));
        response
            .failed_nodes
            .insert("p1620-3".to_string(), "too old".to_string());

        let result = ExtenderFilterResult::from_response(response, CandidateMode::Nodes);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["Nodes"]["items"][0]["metadata"]["name"], "nodeA");
        assert!(value.get("NodeNames").is_none());
        assert_eq!(value["FailedNodes"]["p1620-3"], "too old");
        assert_eq!(value["Error"], "");
    }

    #[test]
    fn test_encode_success_with_names() {
        let mut response = FilterResponse::default();
        response.nodes.push(node_from_name("nodeA"));
        response.nodes.push(node_from_name("nodeB"));

        let result = ExtenderFilterResult::from_response(response, CandidateMode::NodeNames);
        let value = serde_json::to_value(&result).unwrap();

        assert!(value.get("Nodes").is_none());
        assert_eq!(value["NodeNames"], json!(["nodeA", "nodeB"]));
    }

    #[test]
    fn test_encode_error_omits_partitions() {
        let response = FilterResponse {
            error: Some("Predicate AVX could not evaluate node nodeX: boom".to_string()),
            ..Default::default()
        };

        let result = ExtenderFilterResult::from_response(response, CandidateMode::Nodes);
        assert!(result.is_error());

        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("Nodes").is_none());
        assert!(value.get("NodeNames").is_none());
        assert_eq!(value["FailedNodes"], json!({}));
    }
}
