use fitgate_scheduler::{FilterConfig, FilterService, PredicateRegistry};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Filter service backing the filter verb
    pub service: FilterService,
}

impl AppState {
    /// Create a new AppState around a predicate registry
    pub fn new(registry: Arc<PredicateRegistry>, config: FilterConfig) -> Self {
        Self::with_service(FilterService::new(registry, config))
    }

    /// Create a new AppState around an existing filter service
    pub fn with_service(service: FilterService) -> Self {
        Self { service }
    }
}
