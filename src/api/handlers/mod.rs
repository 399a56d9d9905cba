//! REST endpoint handlers organized by resource.

pub mod pool;
pub mod swap;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all routes at the root path.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pool::routes())
        .merge(swap::routes())
        .merge(system::routes())
}
