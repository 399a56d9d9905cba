//! Fixed-offset little-endian readers over raw account data, plus the two
//! SPL token account layouts every pool depends on.

use super::SdkError;
use crate::domain::Pubkey;
use crate::domain::pubkey::PUBKEY_BYTES;

/// Bounds-checked view over one account's data.
#[derive(Debug, Clone, Copy)]
pub struct AccountReader<'a> {
    address: Pubkey,
    data: &'a [u8],
}

impl<'a> AccountReader<'a> {
    /// Wraps `data`, requiring at least `min_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidAccountData`] if the data is too short.
    pub fn new(address: Pubkey, data: &'a [u8], min_len: usize) -> Result<Self, SdkError> {
        if data.len() < min_len {
            return Err(SdkError::invalid_data(
                address,
                format!("expected at least {min_len} bytes, got {}", data.len()),
            ));
        }
        Ok(Self { address, data })
    }

    /// The account being read.
    #[must_use]
    pub const fn address(&self) -> Pubkey {
        self.address
    }

    /// Returns `N` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidAccountData`] if the range is out of bounds.
    pub fn bytes<const N: usize>(&self, offset: usize) -> Result<[u8; N], SdkError> {
        offset
            .checked_add(N)
            .and_then(|end| self.data.get(offset..end))
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| {
                SdkError::invalid_data(self.address, format!("read of {N} bytes at {offset}"))
            })
    }

    /// Reads a `u8`.
    ///
    /// # Errors
    ///
    /// Out-of-bounds reads fail with [`SdkError::InvalidAccountData`].
    pub fn u8(&self, offset: usize) -> Result<u8, SdkError> {
        self.bytes::<1>(offset).map(|[b]| b)
    }

    /// Reads a little-endian `u16`.
    ///
    /// # Errors
    ///
    /// Out-of-bounds reads fail with [`SdkError::InvalidAccountData`].
    pub fn u16(&self, offset: usize) -> Result<u16, SdkError> {
        self.bytes(offset).map(u16::from_le_bytes)
    }

    /// Reads a little-endian `u32`.
    ///
    /// # Errors
    ///
    /// Out-of-bounds reads fail with [`SdkError::InvalidAccountData`].
    pub fn u32(&self, offset: usize) -> Result<u32, SdkError> {
        self.bytes(offset).map(u32::from_le_bytes)
    }

    /// Reads a little-endian `i32`.
    ///
    /// # Errors
    ///
    /// Out-of-bounds reads fail with [`SdkError::InvalidAccountData`].
    pub fn i32(&self, offset: usize) -> Result<i32, SdkError> {
        self.bytes(offset).map(i32::from_le_bytes)
    }

    /// Reads a little-endian `u64`.
    ///
    /// # Errors
    ///
    /// Out-of-bounds reads fail with [`SdkError::InvalidAccountData`].
    pub fn u64(&self, offset: usize) -> Result<u64, SdkError> {
        self.bytes(offset).map(u64::from_le_bytes)
    }

    /// Reads a little-endian `i64`.
    ///
    /// # Errors
    ///
    /// Out-of-bounds reads fail with [`SdkError::InvalidAccountData`].
    pub fn i64(&self, offset: usize) -> Result<i64, SdkError> {
        self.bytes(offset).map(i64::from_le_bytes)
    }

    /// Reads a 32-byte address.
    ///
    /// # Errors
    ///
    /// Out-of-bounds reads fail with [`SdkError::InvalidAccountData`].
    pub fn pubkey(&self, offset: usize) -> Result<Pubkey, SdkError> {
        self.bytes::<PUBKEY_BYTES>(offset).map(Pubkey::new)
    }
}

/// Decoded SPL mint: `mint_authority(36) supply(8) decimals(1) ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mint {
    /// Mint address.
    pub address: Pubkey,
    /// Total supply in base units.
    pub supply: u64,
    /// Decimal places.
    pub decimals: u8,
}

impl Mint {
    const LEN: usize = 82;

    /// Decodes a mint account.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidAccountData`] if the data is too short.
    pub fn decode(address: Pubkey, data: &[u8]) -> Result<Self, SdkError> {
        let reader = AccountReader::new(address, data, Self::LEN)?;
        Ok(Self {
            address,
            supply: reader.u64(36)?,
            decimals: reader.u8(44)?,
        })
    }
}

/// Reads `amount` from a token account: `mint(32) owner(32) amount(8) ...`.
///
/// # Errors
///
/// Returns [`SdkError::InvalidAccountData`] if the data is too short.
pub fn token_account_amount(address: Pubkey, data: &[u8]) -> Result<u64, SdkError> {
    AccountReader::new(address, data, 72)?.u64(64)
}
