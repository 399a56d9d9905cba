//! # pool-gateway
//!
//! Read-only HTTP gateway for on-chain liquidity pools: dynamic AMM pools
//! and DLMM bin pools.
//!
//! Callers pass a node URL and a pool address as query parameters and get
//! pool state or a swap quote back as JSON. Chain reads and quote math are
//! delegated to a [`sdk::PoolSdk`] collaborator; this crate validates,
//! orchestrates and serializes.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── PoolService (service/)
//!     ├── Validation, direction, serialization (domain/)
//!     │
//!     └── PoolSdk (sdk/) ── JSON-RPC node
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod sdk;
pub mod service;
