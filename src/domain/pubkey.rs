//! Base58 account address.
//!
//! [`Pubkey`] is a newtype over the raw 32 address bytes. Its canonical
//! string form is base58, which is what callers pass in query strings and
//! what every response carries.

use std::fmt;
use std::str::FromStr;

/// Length of an account address in bytes.
pub const PUBKEY_BYTES: usize = 32;

/// Error returned when a string is not a valid base58 address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PubkeyError {
    /// The string contains characters outside the base58 alphabet.
    #[error("invalid public key input: {0}")]
    InvalidBase58(String),

    /// The decoded bytes are not exactly 32 long.
    #[error("invalid public key length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 32-byte on-chain account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey([u8; PUBKEY_BYTES]);

impl Pubkey {
    /// Creates a `Pubkey` from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// Returns the raw address bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PUBKEY_BYTES] {
        &self.0
    }

    /// Parses a base58 address.
    ///
    /// # Errors
    ///
    /// Returns [`PubkeyError`] if the input is not base58 or does not decode
    /// to exactly 32 bytes.
    pub fn from_base58(s: &str) -> Result<Self, PubkeyError> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|_| PubkeyError::InvalidBase58(s.to_string()))?;
        let bytes: [u8; PUBKEY_BYTES] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| PubkeyError::InvalidLength(decoded.len()))?;
        Ok(Self(bytes))
    }

    /// Returns the canonical base58 representation.
    #[must_use]
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self.to_base58())
    }
}

impl FromStr for Pubkey {
    type Err = PubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl From<[u8; PUBKEY_BYTES]> for Pubkey {
    fn from(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }
}
