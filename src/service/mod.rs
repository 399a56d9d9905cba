//! Service layer: request orchestration.
//!
//! [`PoolService`] validates a request, delegates chain reads and quote math
//! to the [`crate::sdk::PoolSdk`] collaborator and returns typed results for
//! the HTTP layer to serialize.

pub mod pool_service;

pub use pool_service::{PoolService, PoolSnapshot};
