//! Data Transfer Objects for query extraction and response shaping.
//!
//! All integer amounts are serialized as JSON strings to prevent precision
//! loss on u64 and u128 values.

pub mod pool_dto;
pub mod query_dto;
pub mod swap_dto;

pub use pool_dto::*;
pub use query_dto::*;
pub use swap_dto::*;
