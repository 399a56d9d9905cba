//! Errors raised by the pool SDK collaborator.

use crate::domain::{Pubkey, PubkeyError};

/// Failure while talking to the chain or interpreting its accounts.
///
/// Every variant is an upstream failure from the gateway's point of view and
/// surfaces as a 500 with the error message.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// The node URL is not an absolute http(s) URL.
    #[error("invalid node url {url}: {reason}")]
    InvalidNodeUrl {
        /// URL as supplied.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// An address string could not be parsed.
    #[error(transparent)]
    InvalidAddress(#[from] PubkeyError),

    /// HTTP transport failure or undecodable response body.
    #[error("rpc transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Node-supplied message.
        message: String,
    },

    /// The requested account does not exist.
    #[error("account not found: {0}")]
    AccountNotFound(Pubkey),

    /// The account exists but is owned by a different program.
    #[error("account {account} is not owned by {expected_owner}")]
    WrongOwner {
        /// Account address.
        account: Pubkey,
        /// Program expected to own it.
        expected_owner: Pubkey,
    },

    /// Account bytes are shorter than the layout or otherwise malformed.
    #[error("invalid account data for {account}: {reason}")]
    InvalidAccountData {
        /// Account address.
        account: Pubkey,
        /// What was wrong.
        reason: String,
    },

    /// The pool uses a curve this collaborator cannot quote.
    #[error("unsupported curve type: {0}")]
    UnsupportedCurve(String),

    /// The input token is not one of the pool's mints.
    #[error("token {0} is not in pool")]
    TokenNotInPool(Pubkey),

    /// Not enough liquidity in the fetched bins or reserves.
    #[error("insufficient liquidity: {0}")]
    InsufficientLiquidity(String),

    /// Intermediate quote arithmetic overflowed.
    #[error("arithmetic overflow in {0}")]
    MathOverflow(&'static str),

    /// Any other rejection reported by an SDK implementation.
    #[error("{0}")]
    Rejected(String),
}

impl SdkError {
    /// Shorthand for [`SdkError::InvalidAccountData`].
    pub(crate) fn invalid_data(account: Pubkey, reason: impl Into<String>) -> Self {
        Self::InvalidAccountData {
            account,
            reason: reason.into(),
        }
    }
}
