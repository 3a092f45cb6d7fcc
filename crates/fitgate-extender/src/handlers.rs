use crate::validation::validate_args;
use crate::wire::{ExtenderArgs, ExtenderFilterResult};
use crate::{ApiError, AppState, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use fitgate_core::Descriptor;
use fitgate_scheduler::FilterService;
use std::sync::Arc;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

/// POST {prefix}/filter
pub async fn filter(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ExtenderArgs>, JsonRejection>,
) -> Result<Json<ExtenderFilterResult>> {
    let Json(args) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid ExtenderArgs: {}", e.body_text())))?;

    let result = filter_args(&state.service, args).await?;

    Ok(Json(result))
}

/// Run decoded extender arguments through the filter service
pub async fn filter_args(
    service: &FilterService,
    args: ExtenderArgs,
) -> Result<ExtenderFilterResult> {
    let request = validate_args(args)?;

    let span = info_span!(
        "filter",
        request_id = %Uuid::new_v4(),
        workload = %request.pod.display_name(),
        candidates = request.nodes.len()
    );

    let response = service
        .filter_concurrent(Arc::new(request.pod), Arc::from(request.nodes))
        .instrument(span.clone())
        .await;

    if let Some(error) = &response.error {
        span.in_scope(|| warn!(error = %error, "Filter call failed"));
    }

    Ok(ExtenderFilterResult::from_response(response, request.mode))
}

/// Health check endpoint
pub async fn healthz() -> &'static str {
    "ok"
}

/// Liveness probe
pub async fn livez() -> &'static str {
    "ok"
}

/// Readiness probe
pub async fn readyz() -> &'static str {
    "ok"
}
