//! Pool service: validates a request, loads the pool through the SDK
//! collaborator and asks it for state or a quote.

use std::sync::Arc;

use crate::domain::{Direction, Pubkey, QuoteRequest, resolve_direction, validate};
use crate::error::GatewayError;
use crate::sdk::{AmmPoolInfo, AmmSwapQuote, DlmmSwapQuote, Mint, PoolSdk};

/// Parameters `/getPoolInfo` requires.
pub const POOL_INFO_PARAMS: &[&str] = &["nodeUrl", "poolAddress"];

/// Parameters `/swapQuote` requires.
pub const SWAP_QUOTE_PARAMS: &[&str] = &["nodeUrl", "poolAddress", "swapAmount", "swapAtoB"];

/// Parameters `/dlmmSwapQuote` requires.
pub const DLMM_SWAP_QUOTE_PARAMS: &[&str] = &["nodeUrl", "poolAddress", "swapAmount", "token"];

/// Slippage applied to every AMM quote, in basis points.
pub const AMM_SLIPPAGE_BPS: u64 = 100;

/// DLMM slippage when `limit` is absent or empty, in basis points.
pub const DEFAULT_DLMM_LIMIT_BPS: u64 = 10;

/// State of an AMM pool as returned by `/getPoolInfo`.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolSnapshot {
    /// Pool address exactly as the caller supplied it.
    pub pool_address: String,
    /// LP token mint.
    pub pool_token_mint: Pubkey,
    /// LP amount locked in the pool.
    pub locked_lp_amount: u64,
    /// LP token supply.
    pub lp_supply: u64,
    /// First token mint.
    pub token_a: Mint,
    /// Second token mint.
    pub token_b: Mint,
    /// Reserves and virtual price.
    pub info: AmmPoolInfo,
}

/// Orchestration layer for the three gateway queries.
///
/// Stateless coordinator: each call builds its own connection and pool
/// handle through the [`PoolSdk`] and drops them before returning.
#[derive(Debug, Clone)]
pub struct PoolService {
    sdk: Arc<dyn PoolSdk>,
}

impl PoolService {
    /// Creates a new `PoolService` backed by `sdk`.
    #[must_use]
    pub fn new(sdk: Arc<dyn PoolSdk>) -> Self {
        Self { sdk }
    }

    /// Loads an AMM pool and reads its LP figures and reserves.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingParameter`] for absent parameters and
    /// an upstream error if the pool cannot be loaded or read.
    pub async fn pool_info(&self, request: &QuoteRequest) -> Result<PoolSnapshot, GatewayError> {
        validate(request, POOL_INFO_PARAMS)?;
        let pool_address = request.required("poolAddress");

        let connection = self.sdk.connect(request.required("nodeUrl"))?;
        let pool_key = Pubkey::from_base58(pool_address)?;
        let pool = connection.load_amm_pool(&pool_key).await?;

        let pool_token_mint = pool.pool_token_mint().await?;
        let locked_lp_amount = pool.locked_lp_amount().await?;
        let lp_supply = pool.lp_supply().await?;

        tracing::info!(pool = pool_address, lp_supply, "pool info fetched");
        Ok(PoolSnapshot {
            pool_address: pool_address.to_string(),
            pool_token_mint,
            locked_lp_amount,
            lp_supply,
            token_a: *pool.token_a_mint(),
            token_b: *pool.token_b_mint(),
            info: *pool.pool_info(),
        })
    }

    /// Quotes an AMM swap. `swapAtoB=true` sells token A, anything else
    /// sells token B.
    ///
    /// # Errors
    ///
    /// Returns a 400-class [`GatewayError`] for missing or unparsable
    /// parameters and an upstream error if loading or quoting fails.
    pub async fn swap_quote(&self, request: &QuoteRequest) -> Result<AmmSwapQuote, GatewayError> {
        validate(request, SWAP_QUOTE_PARAMS)?;
        let amount = parse_amount(request, "swapAmount")?;
        let direction = Direction::from_flag(request.required("swapAtoB"));

        let connection = self.sdk.connect(request.required("nodeUrl"))?;
        let pool_key = Pubkey::from_base58(request.required("poolAddress"))?;
        let pool = connection.load_amm_pool(&pool_key).await?;

        let in_mint = direction
            .input_of(pool.token_a_mint(), pool.token_b_mint())
            .address;
        let quote = pool.swap_quote(&in_mint, amount, AMM_SLIPPAGE_BPS)?;

        tracing::info!(
            pool = %pool_key,
            %direction,
            in_amount = quote.swap_in_amount,
            out_amount = quote.swap_out_amount,
            "amm quote computed"
        );
        Ok(quote)
    }

    /// Quotes a DLMM swap selling `token`, which must be one of the pair's
    /// two mints. `limit` is the allowed slippage in basis points.
    ///
    /// # Errors
    ///
    /// Returns a 400-class [`GatewayError`] for missing or unparsable
    /// parameters or a token foreign to the pool, and an upstream error if
    /// loading or quoting fails.
    pub async fn dlmm_swap_quote(
        &self,
        request: &QuoteRequest,
    ) -> Result<DlmmSwapQuote, GatewayError> {
        validate(request, DLMM_SWAP_QUOTE_PARAMS)?;
        let amount = parse_amount(request, "swapAmount")?;
        let limit = match request.get("limit") {
            Some(raw) if !raw.is_empty() => parse_amount(request, "limit")?,
            _ => DEFAULT_DLMM_LIMIT_BPS,
        };

        let connection = self.sdk.connect(request.required("nodeUrl"))?;
        let pool_key = Pubkey::from_base58(request.required("poolAddress"))?;
        let pool = connection.load_dlmm_pool(&pool_key).await?;

        let direction = resolve_direction(
            request.required("token"),
            &pool.token_x_mint().address,
            &pool.token_y_mint().address,
        )?;
        let swap_for_y = direction.is_a_to_b();

        let bin_arrays = pool.bin_arrays_for_swap(swap_for_y).await?;
        let quote = pool.swap_quote(amount, swap_for_y, limit, &bin_arrays)?;

        tracing::info!(
            pool = %pool_key,
            %direction,
            bin_arrays = bin_arrays.len(),
            out_amount = quote.out_amount,
            "dlmm quote computed"
        );
        Ok(quote)
    }
}

fn parse_amount(request: &QuoteRequest, name: &'static str) -> Result<u64, GatewayError> {
    request
        .required(name)
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| GatewayError::InvalidParameter {
            name,
            reason: e.to_string(),
        })
}
