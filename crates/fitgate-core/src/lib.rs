//! Fitgate Core - Descriptor types shared by the fitgate scheduler extender
//!
//! This crate provides:
//! - Workload and node descriptors (Kubernetes `Pod` / `Node`)
//! - Name and namespace accessors over descriptor metadata
//! - Error types with miette diagnostics
//! - Serialization helpers

pub mod descriptor;
pub mod error;

// Re-export commonly used types
pub use descriptor::{node_from_name, Descriptor};
pub use error::{FitgateError, Result};

// Re-export k8s-openapi types for convenience
pub use k8s_openapi;
pub use k8s_openapi::api::core::v1::{Node, Pod};
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Serialize a value to pretty JSON
pub fn to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        FitgateError::serialization_error(
            format!("Failed to serialize to JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a value from JSON
pub fn from_json<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_json::from_str(data).map_err(|e| {
        FitgateError::serialization_error(
            format!("Failed to deserialize from JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a value from YAML
pub fn from_yaml<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_yaml::from_str(data).map_err(|e| {
        FitgateError::serialization_error(
            format!("Failed to deserialize from YAML: {}", e),
            Some(Box::new(e)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_keeps_node_name() {
        let node = node_from_name("p1620-3");

        let json = to_json_pretty(&node).unwrap();
        assert!(json.contains("p1620-3"));

        let decoded: Node = from_json(&json).unwrap();
        assert_eq!(decoded.name(), Some("p1620-3"));
    }

    #[test]
    fn test_yaml_pod() {
        let yaml = r#"
apiVersion: v1
kind: Pod
metadata:
  name: job-avx
  namespace: batch
"#;
        let pod: Pod = from_yaml(yaml).unwrap();
        assert_eq!(pod.display_name(), "batch/job-avx");
    }

    #[test]
    fn test_from_json_invalid() {
        let result: Result<Pod> = from_json("{not json");
        assert!(matches!(
            result,
            Err(FitgateError::SerializationError { .. })
        ));
    }
}
