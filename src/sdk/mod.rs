//! Pool SDK collaborator: chain connection, pool loading and quoting.
//!
//! The gateway never touches chain state directly. It asks a [`PoolSdk`]
//! for a [`ChainConnection`], loads an [`AmmPool`] or [`DlmmPool`] handle
//! through it, and calls the handle's read and quote operations. Handles are
//! owned by one request and dropped with it.
//!
//! [`RpcPoolSdk`] is the JSON-RPC backed implementation used by the server.
//! Tests substitute their own implementations.

pub mod dlmm;
pub mod dynamic_amm;
pub mod error;
pub mod layout;
pub mod meteora;
pub mod rpc;

use std::fmt;

use async_trait::async_trait;

pub use dlmm::{Bin, BinArray, DlmmSwapQuote};
pub use dynamic_amm::{AmmPoolInfo, AmmSwapQuote};
pub use error::SdkError;
pub use layout::Mint;
pub use meteora::RpcPoolSdk;

use crate::domain::Pubkey;

/// Factory for read-only chain connections.
pub trait PoolSdk: Send + Sync + fmt::Debug {
    /// Builds a connection to `node_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] if the endpoint is unusable.
    fn connect(&self, node_url: &str) -> Result<Box<dyn ChainConnection>, SdkError>;
}

/// A read-only connection able to load pools.
#[async_trait]
pub trait ChainConnection: Send + Sync {
    /// Loads a constant-curve AMM pool.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] if the pool cannot be fetched or decoded.
    async fn load_amm_pool(&self, pool: &Pubkey) -> Result<Box<dyn AmmPool>, SdkError>;

    /// Loads a bin (DLMM) pool.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] if the pool cannot be fetched or decoded.
    async fn load_dlmm_pool(&self, pool: &Pubkey) -> Result<Box<dyn DlmmPool>, SdkError>;
}

/// Handle to a loaded AMM pool.
#[async_trait]
pub trait AmmPool: Send + Sync {
    /// First token mint.
    fn token_a_mint(&self) -> &Mint;

    /// Second token mint.
    fn token_b_mint(&self) -> &Mint;

    /// Reserves and virtual price captured at load time.
    fn pool_info(&self) -> &AmmPoolInfo;

    /// The pool's LP token mint.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] on chain failure.
    async fn pool_token_mint(&self) -> Result<Pubkey, SdkError>;

    /// LP amount permanently locked in the pool.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] on chain failure.
    async fn locked_lp_amount(&self) -> Result<u64, SdkError>;

    /// Current LP token supply.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] on chain failure.
    async fn lp_supply(&self) -> Result<u64, SdkError>;

    /// Quotes swapping `in_amount` of `in_token_mint` for the other token.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] if the mint is foreign to the pool or the curve
    /// cannot be quoted.
    fn swap_quote(
        &self,
        in_token_mint: &Pubkey,
        in_amount: u64,
        slippage_bps: u64,
    ) -> Result<AmmSwapQuote, SdkError>;
}

/// Handle to a loaded bin pool.
#[async_trait]
pub trait DlmmPool: Send + Sync {
    /// Token X mint.
    fn token_x_mint(&self) -> &Mint;

    /// Token Y mint.
    fn token_y_mint(&self) -> &Mint;

    /// Fetches the bin arrays a swap in the given direction walks through,
    /// in traversal order.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] on chain failure.
    async fn bin_arrays_for_swap(&self, swap_for_y: bool) -> Result<Vec<BinArray>, SdkError>;

    /// Quotes swapping `in_amount` across `bin_arrays`. `swap_for_y` means
    /// X is the input. `allowed_slippage_bps` bounds the minimum output.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InsufficientLiquidity`] if the bins cannot absorb
    /// the whole input.
    fn swap_quote(
        &self,
        in_amount: u64,
        swap_for_y: bool,
        allowed_slippage_bps: u64,
        bin_arrays: &[BinArray],
    ) -> Result<DlmmSwapQuote, SdkError>;
}

/// Basis-point denominator shared by slippage and fee shares.
pub const BASIS_POINT_MAX: u64 = 10_000;

/// Applies a slippage tolerance to an output amount, rounding down.
#[must_use]
pub fn min_amount_after_slippage(amount: u64, slippage_bps: u64) -> u64 {
    let kept = BASIS_POINT_MAX.saturating_sub(slippage_bps.min(BASIS_POINT_MAX));
    u64::try_from(u128::from(amount) * u128::from(kept) / u128::from(BASIS_POINT_MAX))
        .unwrap_or(u64::MAX)
}
