//! Dynamic AMM pools: two-token constant-product pools whose reserves sit
//! in yield vaults.
//!
//! The pool account does not hold tokens itself. It owns LP shares of two
//! vaults, so each reserve is the pool's share of its vault's currently
//! unlocked amount.

use async_trait::async_trait;
use num::integer::Roots;

use super::layout::{AccountReader, Mint, token_account_amount};
use super::rpc::{Account, RpcConnection};
use super::{AmmPool, BASIS_POINT_MAX, SdkError, min_amount_after_slippage};
use crate::domain::Pubkey;

/// Dynamic AMM program.
pub const DYNAMIC_AMM_PROGRAM_ID: &str = "Eo7WjKq67rjJQSZxS6z3YkapzY3eMj6Xy8X5EQVn5UaB";

/// Vault program owning the pools' reserve vaults.
pub const VAULT_PROGRAM_ID: &str = "24Uqj9JCLxUeoC3hGfh5W3s9FM9uCHDS2SG3LYwBpyTi";

/// Scale of `virtual_price_raw`.
pub const VIRTUAL_PRICE_PRECISION: u128 = 100_000_000;

const LOCKED_PROFIT_DEGRADATION_DENOMINATOR: u128 = 1_000_000_000_000;

/// Curve a pool trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveType {
    /// `x * y = k`.
    ConstantProduct,
    /// Stable-swap with amplification coefficient.
    Stable {
        /// Amplification coefficient.
        amp: u64,
    },
}

/// Fields of the pool account used for loading and quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    /// LP token mint.
    pub lp_mint: Pubkey,
    /// Token A mint.
    pub token_a_mint: Pubkey,
    /// Token B mint.
    pub token_b_mint: Pubkey,
    /// Vault holding token A.
    pub a_vault: Pubkey,
    /// Vault holding token B.
    pub b_vault: Pubkey,
    /// Pool's token account of vault A LP shares.
    pub a_vault_lp: Pubkey,
    /// Pool's token account of vault B LP shares.
    pub b_vault_lp: Pubkey,
    /// Trade fee numerator.
    pub trade_fee_numerator: u64,
    /// Trade fee denominator.
    pub trade_fee_denominator: u64,
    /// Total LP permanently locked.
    pub total_locked_lp: u64,
    /// Curve.
    pub curve_type: CurveType,
}

impl PoolState {
    const MIN_LEN: usize = 883;

    /// Decodes a pool account.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] for short data or an unknown curve tag.
    pub fn decode(account: &Account) -> Result<Self, SdkError> {
        let r = AccountReader::new(account.address, &account.data, Self::MIN_LEN)?;
        let curve_type = match r.u8(882)? {
            0 => CurveType::ConstantProduct,
            1 => CurveType::Stable { amp: r.u64(883)? },
            tag => {
                return Err(SdkError::invalid_data(
                    account.address,
                    format!("unknown curve tag {tag}"),
                ));
            }
        };
        Ok(Self {
            lp_mint: r.pubkey(8)?,
            token_a_mint: r.pubkey(40)?,
            token_b_mint: r.pubkey(72)?,
            a_vault: r.pubkey(104)?,
            b_vault: r.pubkey(136)?,
            a_vault_lp: r.pubkey(168)?,
            b_vault_lp: r.pubkey(200)?,
            trade_fee_numerator: r.u64(330)?,
            trade_fee_denominator: r.u64(338)?,
            total_locked_lp: r.u64(395)?,
            curve_type,
        })
    }
}

/// Fields of a reserve vault account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultState {
    /// Total tokens under management, including locked profit.
    pub total_amount: u64,
    /// Vault LP mint.
    pub lp_mint: Pubkey,
    /// Locked profit at the last report.
    pub last_updated_locked_profit: u64,
    /// Unix timestamp of the last report.
    pub last_report: u64,
    /// Degradation rate per second, scaled by 1e12.
    pub locked_profit_degradation: u64,
}

impl VaultState {
    const LEN: usize = 1227;

    /// Decodes a vault account.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidAccountData`] for short data.
    pub fn decode(account: &Account) -> Result<Self, SdkError> {
        let r = AccountReader::new(account.address, &account.data, Self::LEN)?;
        Ok(Self {
            total_amount: r.u64(11)?,
            lp_mint: r.pubkey(115)?,
            last_updated_locked_profit: r.u64(1203)?,
            last_report: r.u64(1211)?,
            locked_profit_degradation: r.u64(1219)?,
        })
    }

    /// Profit still locked at `now`; degrades linearly since the last report.
    #[must_use]
    pub fn locked_profit(&self, now: u64) -> u64 {
        let elapsed = u128::from(now.saturating_sub(self.last_report));
        let ratio = elapsed.saturating_mul(u128::from(self.locked_profit_degradation));
        if ratio > LOCKED_PROFIT_DEGRADATION_DENOMINATOR {
            return 0;
        }
        let locked = u128::from(self.last_updated_locked_profit)
            * (LOCKED_PROFIT_DEGRADATION_DENOMINATOR - ratio)
            / LOCKED_PROFIT_DEGRADATION_DENOMINATOR;
        u64::try_from(locked).unwrap_or(u64::MAX)
    }

    /// Amount withdrawable at `now`.
    #[must_use]
    pub fn unlocked_amount(&self, now: u64) -> u64 {
        self.total_amount.saturating_sub(self.locked_profit(now))
    }

    /// Tokens represented by `share` of `total_share` LP at `now`.
    #[must_use]
    pub fn amount_by_share(&self, now: u64, share: u64, total_share: u64) -> u64 {
        if total_share == 0 {
            return 0;
        }
        let amount =
            u128::from(self.unlocked_amount(now)) * u128::from(share) / u128::from(total_share);
        u64::try_from(amount).unwrap_or(u64::MAX)
    }
}

/// Pool composition at load time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmmPoolInfo {
    /// Token A reserve.
    pub token_a_amount: u64,
    /// Token B reserve.
    pub token_b_amount: u64,
    /// Invariant per LP token. `None` when the curve has no supported
    /// invariant.
    pub virtual_price: Option<f64>,
    /// `virtual_price` scaled by [`VIRTUAL_PRICE_PRECISION`].
    pub virtual_price_raw: Option<u128>,
}

impl AmmPoolInfo {
    /// Builds pool info for a constant-product pool, computing the virtual
    /// price as `isqrt(a * b) / lp_supply`.
    #[must_use]
    pub fn constant_product(token_a_amount: u64, token_b_amount: u64, lp_supply: u64) -> Self {
        let virtual_price_raw = if lp_supply == 0 {
            0
        } else {
            let d = (u128::from(token_a_amount) * u128::from(token_b_amount)).sqrt();
            d * VIRTUAL_PRICE_PRECISION / u128::from(lp_supply)
        };
        #[allow(clippy::cast_precision_loss)]
        let virtual_price = virtual_price_raw as f64 / VIRTUAL_PRICE_PRECISION as f64;
        Self {
            token_a_amount,
            token_b_amount,
            virtual_price: Some(virtual_price),
            virtual_price_raw: Some(virtual_price_raw),
        }
    }

    /// Pool info with reserves only.
    #[must_use]
    pub const fn unpriced(token_a_amount: u64, token_b_amount: u64) -> Self {
        Self {
            token_a_amount,
            token_b_amount,
            virtual_price: None,
            virtual_price_raw: None,
        }
    }

    /// Pool info for `curve`. Only constant-product pools get a virtual
    /// price.
    #[must_use]
    pub fn for_curve(
        curve: CurveType,
        token_a_amount: u64,
        token_b_amount: u64,
        lp_supply: u64,
    ) -> Self {
        match curve {
            CurveType::ConstantProduct => {
                Self::constant_product(token_a_amount, token_b_amount, lp_supply)
            }
            CurveType::Stable { .. } => Self::unpriced(token_a_amount, token_b_amount),
        }
    }
}

/// Result of an AMM quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmmSwapQuote {
    /// Input amount consumed.
    pub swap_in_amount: u64,
    /// Output amount.
    pub swap_out_amount: u64,
    /// Output after slippage tolerance.
    pub min_swap_out_amount: u64,
    /// Trade fee charged on the input.
    pub fee: u64,
    /// Relative shortfall against the spot price, in percent.
    pub price_impact: f64,
}

/// Constant-product quote with the trade fee taken from the input.
///
/// # Errors
///
/// Returns [`SdkError::InsufficientLiquidity`] if either reserve is empty.
pub fn constant_product_quote(
    in_amount: u64,
    reserve_in: u64,
    reserve_out: u64,
    trade_fee_numerator: u64,
    trade_fee_denominator: u64,
    slippage_bps: u64,
) -> Result<AmmSwapQuote, SdkError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(SdkError::InsufficientLiquidity(
            "pool reserve is empty".to_string(),
        ));
    }
    let fee = if trade_fee_denominator == 0 {
        0
    } else {
        u64::try_from(
            u128::from(in_amount) * u128::from(trade_fee_numerator)
                / u128::from(trade_fee_denominator),
        )
        .map_err(|_| SdkError::MathOverflow("trade fee"))?
    };
    let in_after_fee = in_amount.saturating_sub(fee);
    let out = u128::from(reserve_out) * u128::from(in_after_fee)
        / (u128::from(reserve_in) + u128::from(in_after_fee));
    let swap_out_amount = u64::try_from(out).map_err(|_| SdkError::MathOverflow("swap out"))?;

    #[allow(clippy::cast_precision_loss)]
    let spot_out = in_after_fee as f64 * reserve_out as f64 / reserve_in as f64;
    #[allow(clippy::cast_precision_loss)]
    let price_impact = if spot_out > 0.0 {
        (spot_out - swap_out_amount as f64) / spot_out * 100.0
    } else {
        0.0
    };

    Ok(AmmSwapQuote {
        swap_in_amount: in_amount,
        swap_out_amount,
        min_swap_out_amount: min_amount_after_slippage(swap_out_amount, slippage_bps),
        fee,
        price_impact,
    })
}

/// A dynamic AMM pool loaded over JSON-RPC.
#[derive(Debug)]
pub struct DynamicAmmPool {
    connection: RpcConnection,
    address: Pubkey,
    state: PoolState,
    token_a: Mint,
    token_b: Mint,
    info: AmmPoolInfo,
}

impl DynamicAmmPool {
    /// Fetches the pool, its vaults and mints, and computes reserves.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] if any account is missing, foreign or malformed.
    pub async fn load(connection: RpcConnection, address: Pubkey) -> Result<Self, SdkError> {
        let program = Pubkey::from_base58(DYNAMIC_AMM_PROGRAM_ID)?;
        let vault_program = Pubkey::from_base58(VAULT_PROGRAM_ID)?;

        let pool_account = connection
            .require_account(&address)
            .await?
            .expect_owner(&program)?;
        let state = PoolState::decode(&pool_account)?;

        let accounts = connection
            .require_accounts(&[
                state.a_vault,
                state.b_vault,
                state.a_vault_lp,
                state.b_vault_lp,
                state.token_a_mint,
                state.token_b_mint,
                state.lp_mint,
            ])
            .await?;
        let [a_vault, b_vault, a_vault_lp, b_vault_lp, mint_a, mint_b, lp_mint]: [Account; 7] =
            accounts
                .try_into()
                .map_err(|_| SdkError::invalid_data(address, "pool account batch size"))?;

        let vault_a = VaultState::decode(&a_vault.expect_owner(&vault_program)?)?;
        let vault_b = VaultState::decode(&b_vault.expect_owner(&vault_program)?)?;
        let pool_share_a = token_account_amount(a_vault_lp.address, &a_vault_lp.data)?;
        let pool_share_b = token_account_amount(b_vault_lp.address, &b_vault_lp.data)?;
        let token_a = Mint::decode(mint_a.address, &mint_a.data)?;
        let token_b = Mint::decode(mint_b.address, &mint_b.data)?;
        let lp = Mint::decode(lp_mint.address, &lp_mint.data)?;

        let vault_lp_mints = connection
            .require_accounts(&[vault_a.lp_mint, vault_b.lp_mint])
            .await?;
        let [vault_lp_a, vault_lp_b]: [Account; 2] = vault_lp_mints
            .try_into()
            .map_err(|_| SdkError::invalid_data(address, "vault lp batch size"))?;
        let vault_lp_a = Mint::decode(vault_lp_a.address, &vault_lp_a.data)?;
        let vault_lp_b = Mint::decode(vault_lp_b.address, &vault_lp_b.data)?;

        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        let token_a_amount = vault_a.amount_by_share(now, pool_share_a, vault_lp_a.supply);
        let token_b_amount = vault_b.amount_by_share(now, pool_share_b, vault_lp_b.supply);

        let info =
            AmmPoolInfo::for_curve(state.curve_type, token_a_amount, token_b_amount, lp.supply);

        tracing::debug!(
            pool = %address,
            token_a = %token_a.address,
            token_b = %token_b.address,
            token_a_amount,
            token_b_amount,
            "dynamic amm pool loaded"
        );

        Ok(Self {
            connection,
            address,
            state,
            token_a,
            token_b,
            info,
        })
    }
}

#[async_trait]
impl AmmPool for DynamicAmmPool {
    fn token_a_mint(&self) -> &Mint {
        &self.token_a
    }

    fn token_b_mint(&self) -> &Mint {
        &self.token_b
    }

    fn pool_info(&self) -> &AmmPoolInfo {
        &self.info
    }

    async fn pool_token_mint(&self) -> Result<Pubkey, SdkError> {
        Ok(self.state.lp_mint)
    }

    async fn locked_lp_amount(&self) -> Result<u64, SdkError> {
        let account = self.connection.require_account(&self.address).await?;
        Ok(PoolState::decode(&account)?.total_locked_lp)
    }

    async fn lp_supply(&self) -> Result<u64, SdkError> {
        let account = self.connection.require_account(&self.state.lp_mint).await?;
        Ok(Mint::decode(account.address, &account.data)?.supply)
    }

    fn swap_quote(
        &self,
        in_token_mint: &Pubkey,
        in_amount: u64,
        slippage_bps: u64,
    ) -> Result<AmmSwapQuote, SdkError> {
        let (reserve_in, reserve_out) = if *in_token_mint == self.token_a.address {
            (self.info.token_a_amount, self.info.token_b_amount)
        } else if *in_token_mint == self.token_b.address {
            (self.info.token_b_amount, self.info.token_a_amount)
        } else {
            return Err(SdkError::TokenNotInPool(*in_token_mint));
        };
        if let CurveType::Stable { amp } = self.state.curve_type {
            return Err(SdkError::UnsupportedCurve(format!("stable (amp {amp})")));
        }
        constant_product_quote(
            in_amount,
            reserve_in,
            reserve_out,
            self.state.trade_fee_numerator,
            self.state.trade_fee_denominator,
            slippage_bps.min(BASIS_POINT_MAX),
        )
    }
}
