use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// API error type
///
/// Only transport-level failures become HTTP errors; filter failures travel
/// in the `Error` field of a successful response.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or incomplete request (400)
    BadRequest(String),
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "apiVersion": "v1",
            "kind": "Status",
            "status": "Failure",
            "message": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Core errors only arise from descriptors carried in the request
impl From<fitgate_core::FitgateError> for ApiError {
    fn from(err: fitgate_core::FitgateError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitgate_core::FitgateError;

    #[test]
    fn test_bad_request_status_body() {
        let response = ApiError::BadRequest("no pod".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_from_core_error() {
        let err: ApiError = FitgateError::invalid_descriptor("Pod has no name", "name it").into();
        assert!(matches!(err, ApiError::BadRequest(ref msg) if msg.contains("Pod has no name")));

        let err: ApiError = FitgateError::serialization_error("bad yaml", None).into();
        assert_eq!(err.to_string(), "Bad request: Serialization error: bad yaml");
    }
}
