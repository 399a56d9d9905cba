//! Domain layer: addresses, request validation, direction resolution and
//! SDK value serialization.
//!
//! Everything here is pure and synchronous. Chain I/O lives behind the
//! traits in [`crate::sdk`].

pub mod direction;
pub mod pubkey;
pub mod quote_request;
pub mod sdk_value;

pub use direction::{Direction, DirectionMismatch, resolve_direction};
pub use pubkey::{Pubkey, PubkeyError};
pub use quote_request::{MissingParameter, QuoteRequest, validate};
pub use sdk_value::{SdkValue, ToSdkValue, serialize};
