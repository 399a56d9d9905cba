//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to an HTTP status code; the body is always `{"error": "<message>"}`.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DirectionMismatch, MissingParameter, PubkeyError};
use crate::sdk::SdkError;

/// JSON error response body.
///
/// ```json
/// { "error": "missing required parameter: poolAddress (required: nodeUrl, poolAddress)" }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// | Variant            | HTTP Status               |
/// |--------------------|---------------------------|
/// | `MissingParameter` | 400 Bad Request           |
/// | `InvalidParameter` | 400 Bad Request           |
/// | `InvalidQuery`     | 400 Bad Request           |
/// | `TokenMismatch`    | 400 Bad Request           |
/// | `Sdk`              | 500 Internal Server Error |
/// | `InvalidAddress`   | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A required query parameter was absent.
    #[error(transparent)]
    MissingParameter(#[from] MissingParameter),

    /// A parameter was present but could not be parsed.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Parser message.
        reason: String,
    },

    /// The query string could not be decoded.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// The supplied token is not one of the pool's tokens.
    #[error(transparent)]
    TokenMismatch(#[from] DirectionMismatch),

    /// The pool SDK collaborator failed.
    #[error(transparent)]
    Sdk(#[from] SdkError),

    /// An address parameter is not a valid public key.
    #[error(transparent)]
    InvalidAddress(#[from] PubkeyError),
}

impl GatewayError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_)
            | Self::InvalidParameter { .. }
            | Self::InvalidQuery(_)
            | Self::TokenMismatch(_) => StatusCode::BAD_REQUEST,
            Self::Sdk(_) | Self::InvalidAddress(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Pubkey;

    #[test]
    fn validation_errors_are_bad_request() {
        let missing = GatewayError::from(MissingParameter {
            name: "poolAddress".to_string(),
            required: "nodeUrl, poolAddress".to_string(),
        });
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert!(missing.to_string().contains("poolAddress"));

        let mismatch = GatewayError::from(DirectionMismatch {
            supplied: "x".to_string(),
            token_a: Pubkey::new([1u8; 32]),
            token_b: Pubkey::new([2u8; 32]),
        });
        assert_eq!(mismatch.status_code(), StatusCode::BAD_REQUEST);

        let invalid = GatewayError::InvalidParameter {
            name: "swapAmount",
            reason: "invalid digit found in string".to_string(),
        };
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_errors_are_internal_and_keep_message() {
        let err = GatewayError::from(SdkError::Rejected("rpc unreachable".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "rpc unreachable");

        let err = GatewayError::from(PubkeyError::InvalidLength(3));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_carries_status() {
        let response = GatewayError::from(SdkError::Rejected("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
