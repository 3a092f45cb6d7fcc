// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for fitgate operations
#[derive(Error, Debug, Diagnostic)]
pub enum FitgateError {
    /// Descriptor is missing data the extender depends on
    #[error("Invalid descriptor: {reason}")]
    #[diagnostic(
        code(fitgate::invalid_descriptor),
        help("{suggestion}")
    )]
    InvalidDescriptor {
        #[allow(unused)]
        reason: String,
        #[allow(unused)]
        suggestion: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(fitgate::serialization_error),
        help("Ensure the document is valid JSON or YAML")
    )]
    SerializationError {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type for fitgate core operations
pub type Result<T> = std::result::Result<T, FitgateError>;

impl FitgateError {
    /// Create an InvalidDescriptor error
    pub fn invalid_descriptor(reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }
}
