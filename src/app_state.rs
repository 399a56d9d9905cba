//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::sdk::PoolSdk;
use crate::service::PoolService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pool service for all business logic.
    pub pool_service: Arc<PoolService>,
}

impl AppState {
    /// Builds the state around a pool SDK collaborator.
    #[must_use]
    pub fn new(sdk: Arc<dyn PoolSdk>) -> Self {
        Self {
            pool_service: Arc::new(PoolService::new(sdk)),
        }
    }
}
