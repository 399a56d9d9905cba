//! DLMM bin pools.
//!
//! Liquidity is split into discrete bins of constant price. Bin `id` trades
//! at `(1 + bin_step / 10_000) ^ id` units of Y per X, stored as Q64.64.
//! Bins are grouped 70 at a time into bin array accounts. A swap starts at
//! the active bin and walks outward (down when selling X, up when selling Y)
//! until the input is consumed.

use async_trait::async_trait;
use num::{BigUint, One, ToPrimitive, Zero};

use super::layout::{AccountReader, Mint};
use super::rpc::{Account, AccountFilter, RpcConnection};
use super::{BASIS_POINT_MAX, DlmmPool, SdkError, min_amount_after_slippage};
use crate::domain::{Pubkey, SdkValue, ToSdkValue};

/// DLMM program.
pub const DLMM_PROGRAM_ID: &str = "LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9t2vmqXB4";

/// Bins per bin array account.
pub const MAX_BIN_PER_ARRAY: i32 = 70;

/// Number of bin arrays fetched for one swap quote.
pub const BIN_ARRAYS_PER_SWAP: usize = 4;

const BIN_SIZE: usize = 144;
const BIN_ARRAY_HEADER: usize = 56;
const BIN_ARRAY_LB_PAIR_OFFSET: usize = 24;
/// Size of a bin array account.
#[allow(clippy::cast_sign_loss)]
pub const BIN_ARRAY_LEN: usize = BIN_ARRAY_HEADER + BIN_SIZE * MAX_BIN_PER_ARRAY as usize;

const SCALE_OFFSET: u32 = 64;
const FEE_PRECISION: u128 = 1_000_000_000;
const MAX_FEE_RATE: u128 = 100_000_000;

fn q64_one() -> u128 {
    1u128 << SCALE_OFFSET
}

/// Index of the bin array containing `bin_id`.
#[must_use]
pub fn bin_array_index(bin_id: i32) -> i64 {
    i64::from(bin_id.div_euclid(MAX_BIN_PER_ARRAY))
}

/// Q64.64 price of `bin_id` for a pair with `bin_step` basis points.
///
/// # Errors
///
/// Returns [`SdkError::MathOverflow`] if the price does not fit or rounds
/// to zero.
pub fn price_of_bin(bin_id: i32, bin_step: u16) -> Result<u128, SdkError> {
    let one = BigUint::one() << SCALE_OFFSET;
    let mut base = &one + (BigUint::from(bin_step) << SCALE_OFFSET) / BASIS_POINT_MAX;
    let mut result = one;
    let mut exp = bin_id.unsigned_abs();
    while exp > 0 {
        if exp & 1 == 1 {
            result = (&result * &base) >> SCALE_OFFSET;
        }
        base = (&base * &base) >> SCALE_OFFSET;
        exp >>= 1;
    }
    let price = if bin_id < 0 {
        (BigUint::one() << (2 * SCALE_OFFSET)) / result
    } else {
        result
    };
    price
        .to_u128()
        .filter(|p| *p > 0)
        .ok_or(SdkError::MathOverflow("bin price"))
}

fn mul_div(a: u128, b: u128, denominator: u128, round_up: bool) -> Result<u128, SdkError> {
    if denominator == 0 {
        return Err(SdkError::MathOverflow("division by zero"));
    }
    let numerator = BigUint::from(a) * BigUint::from(b);
    let denominator = BigUint::from(denominator);
    let mut quotient = &numerator / &denominator;
    if round_up && !(&numerator % &denominator).is_zero() {
        quotient += 1u8;
    }
    quotient.to_u128().ok_or(SdkError::MathOverflow("mul_div"))
}

/// Fee parameters fixed at pair creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaticParameters {
    /// Base fee factor.
    pub base_factor: u16,
    /// Seconds within which the volatility reference is kept.
    pub filter_period: u16,
    /// Seconds after which the volatility reference resets.
    pub decay_period: u16,
    /// Volatility decay, in basis points.
    pub reduction_factor: u16,
    /// Variable fee multiplier.
    pub variable_fee_control: u32,
    /// Upper bound of the volatility accumulator.
    pub max_volatility_accumulator: u32,
    /// Protocol share of fees, in basis points.
    pub protocol_share: u16,
    /// Power-of-ten multiplier on the base fee.
    pub base_fee_power_factor: u8,
}

/// Fee state updated by every swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VariableParameters {
    /// Volatility accumulated by the last swap.
    pub volatility_accumulator: u32,
    /// Decayed volatility carried into the next swap.
    pub volatility_reference: u32,
    /// Bin id the volatility is measured from.
    pub index_reference: i32,
    /// Unix timestamp of the last update.
    pub last_update_timestamp: i64,
}

/// Decoded `LbPair` account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LbPair {
    /// Static fee parameters.
    pub parameters: StaticParameters,
    /// Variable fee parameters.
    pub v_parameters: VariableParameters,
    /// Currently active bin.
    pub active_id: i32,
    /// Price step between bins, in basis points.
    pub bin_step: u16,
    /// Token X mint.
    pub token_x_mint: Pubkey,
    /// Token Y mint.
    pub token_y_mint: Pubkey,
}

impl LbPair {
    const MIN_LEN: usize = 216;

    /// Decodes an `LbPair` account.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidAccountData`] for short data.
    pub fn decode(account: &Account) -> Result<Self, SdkError> {
        let r = AccountReader::new(account.address, &account.data, Self::MIN_LEN)?;
        Ok(Self {
            parameters: StaticParameters {
                base_factor: r.u16(8)?,
                filter_period: r.u16(10)?,
                decay_period: r.u16(12)?,
                reduction_factor: r.u16(14)?,
                variable_fee_control: r.u32(16)?,
                max_volatility_accumulator: r.u32(20)?,
                protocol_share: r.u16(32)?,
                base_fee_power_factor: r.u8(34)?,
            },
            v_parameters: VariableParameters {
                volatility_accumulator: r.u32(40)?,
                volatility_reference: r.u32(44)?,
                index_reference: r.i32(48)?,
                last_update_timestamp: r.i64(56)?,
            },
            active_id: r.i32(76)?,
            bin_step: r.u16(80)?,
            token_x_mint: r.pubkey(88)?,
            token_y_mint: r.pubkey(120)?,
        })
    }

    fn base_fee_rate(&self) -> u128 {
        u128::from(self.parameters.base_factor)
            * u128::from(self.bin_step)
            * 10
            * 10u128.pow(u32::from(self.parameters.base_fee_power_factor))
    }

    fn variable_fee_rate(&self, volatility_accumulator: u32) -> u128 {
        if self.parameters.variable_fee_control == 0 {
            return 0;
        }
        let square = (u128::from(volatility_accumulator) * u128::from(self.bin_step)).pow(2);
        let fee = u128::from(self.parameters.variable_fee_control) * square;
        fee.div_ceil(100_000_000_000)
    }

    fn total_fee_rate(&self, volatility_accumulator: u32) -> u128 {
        (self.base_fee_rate() + self.variable_fee_rate(volatility_accumulator)).min(MAX_FEE_RATE)
    }

    /// Decays the volatility reference the way the next swap at `now` will.
    fn references_at(&self, now: i64) -> VariableParameters {
        let mut v = self.v_parameters;
        let elapsed = now.saturating_sub(v.last_update_timestamp);
        if elapsed >= i64::from(self.parameters.filter_period) {
            v.index_reference = self.active_id;
            v.volatility_reference = if elapsed < i64::from(self.parameters.decay_period) {
                let decayed = u64::from(v.volatility_accumulator)
                    * u64::from(self.parameters.reduction_factor)
                    / BASIS_POINT_MAX;
                u32::try_from(decayed).unwrap_or(u32::MAX)
            } else {
                0
            };
        }
        v
    }

    fn volatility_accumulator_at(&self, v: &VariableParameters, bin_id: i32) -> u32 {
        let delta = u64::from(v.index_reference.abs_diff(bin_id));
        let accumulated = u64::from(v.volatility_reference) + delta * BASIS_POINT_MAX;
        let capped = accumulated.min(u64::from(self.parameters.max_volatility_accumulator));
        u32::try_from(capped).unwrap_or(u32::MAX)
    }

    /// Walks the bins in `bin_arrays` from the active bin and quotes
    /// `in_amount`. `now` is the unix time used to decay volatility.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InsufficientLiquidity`] when the walk leaves the
    /// supplied bin arrays before the input is consumed.
    pub fn quote(
        &self,
        in_amount: u64,
        swap_for_y: bool,
        allowed_slippage_bps: u64,
        bin_arrays: &[BinArray],
        now: i64,
    ) -> Result<DlmmSwapQuote, SdkError> {
        let v = self.references_at(now);
        let start_price = price_of_bin(self.active_id, self.bin_step)?;
        let start_rate = self.total_fee_rate(self.volatility_accumulator_at(&v, self.active_id));

        let mut active_id = self.active_id;
        let mut last_price = start_price;
        let mut remaining = u128::from(in_amount);
        let mut total_out: u128 = 0;
        let mut total_fee: u128 = 0;
        let mut protocol_fee: u128 = 0;
        let mut touched: Vec<Pubkey> = Vec::new();

        while remaining > 0 {
            let (array, bin) = bin_arrays
                .iter()
                .find_map(|array| array.bin(active_id).map(|bin| (array.address, bin)))
                .ok_or_else(|| {
                    SdkError::InsufficientLiquidity(
                        "insufficient liquidity in bin arrays for swap".to_string(),
                    )
                })?;
            if !touched.contains(&array) {
                touched.push(array);
            }

            let reserve_out = u128::from(if swap_for_y { bin.amount_y } else { bin.amount_x });
            if reserve_out > 0 {
                let price = price_of_bin(active_id, self.bin_step)?;
                let rate = self.total_fee_rate(self.volatility_accumulator_at(&v, active_id));
                let max_in = if swap_for_y {
                    mul_div(reserve_out, q64_one(), price, true)?
                } else {
                    mul_div(reserve_out, price, q64_one(), true)?
                };
                let max_fee = fee_on_top(max_in, rate)?;
                let max_in_with_fees = max_in + max_fee;

                let (consumed, out, fee) = if remaining >= max_in_with_fees {
                    (max_in_with_fees, reserve_out, max_fee)
                } else {
                    let fee = fee_included(remaining, rate)?;
                    let net = remaining - fee;
                    let out = if swap_for_y {
                        mul_div(net, price, q64_one(), false)?
                    } else {
                        mul_div(net, q64_one(), price, false)?
                    };
                    (remaining, out.min(reserve_out), fee)
                };

                remaining -= consumed;
                total_out += out;
                total_fee += fee;
                protocol_fee +=
                    fee * u128::from(self.parameters.protocol_share) / u128::from(BASIS_POINT_MAX);
                last_price = price;
            }

            if remaining > 0 {
                active_id = if swap_for_y {
                    active_id.checked_sub(1)
                } else {
                    active_id.checked_add(1)
                }
                .ok_or(SdkError::MathOverflow("bin id"))?;
            }
        }

        let ideal_net = u128::from(in_amount) - fee_included(u128::from(in_amount), start_rate)?;
        let ideal_out = if swap_for_y {
            mul_div(ideal_net, start_price, q64_one(), false)?
        } else {
            mul_div(ideal_net, q64_one(), start_price, false)?
        };
        #[allow(clippy::cast_precision_loss)]
        let price_impact = if ideal_out == 0 {
            0.0
        } else {
            (total_out as f64 - ideal_out as f64) / ideal_out as f64 * 100.0
        };
        #[allow(clippy::cast_precision_loss)]
        let end_price = last_price as f64 / q64_one() as f64;

        let out_amount = to_u64(total_out, "out amount")?;
        Ok(DlmmSwapQuote {
            consumed_in_amount: in_amount,
            out_amount,
            fee: to_u64(total_fee, "fee")?,
            protocol_fee: to_u64(protocol_fee, "protocol fee")?,
            min_out_amount: min_amount_after_slippage(out_amount, allowed_slippage_bps),
            price_impact: format!("{price_impact}"),
            bin_arrays_pubkey: touched,
            end_price: format!("{end_price}"),
        })
    }
}

fn to_u64(value: u128, what: &'static str) -> Result<u64, SdkError> {
    u64::try_from(value).map_err(|_| SdkError::MathOverflow(what))
}

/// Fee charged on top of `amount` so that `amount` is what reaches the bin.
fn fee_on_top(amount: u128, rate: u128) -> Result<u128, SdkError> {
    mul_div(amount, rate, FEE_PRECISION - rate, true)
}

/// Fee contained in an `amount` that already includes it.
fn fee_included(amount: u128, rate: u128) -> Result<u128, SdkError> {
    mul_div(amount, rate, FEE_PRECISION, true)
}

/// Liquidity of one bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bin {
    /// Token X held.
    pub amount_x: u64,
    /// Token Y held.
    pub amount_y: u64,
}

/// Decoded bin array account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinArray {
    /// Account address.
    pub address: Pubkey,
    /// Array index: covers bins `index * 70 .. index * 70 + 69`.
    pub index: i64,
    /// Bins in ascending id order.
    pub bins: Vec<Bin>,
}

impl BinArray {
    /// Decodes a bin array account.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidAccountData`] for short data.
    pub fn decode(account: &Account) -> Result<Self, SdkError> {
        let r = AccountReader::new(account.address, &account.data, BIN_ARRAY_LEN)?;
        let bins = (0..BIN_ARRAY_LEN.saturating_sub(BIN_ARRAY_HEADER) / BIN_SIZE)
            .map(|i| {
                let offset = BIN_ARRAY_HEADER + i * BIN_SIZE;
                Ok(Bin {
                    amount_x: r.u64(offset)?,
                    amount_y: r.u64(offset + 8)?,
                })
            })
            .collect::<Result<Vec<_>, SdkError>>()?;
        Ok(Self {
            address: account.address,
            index: r.i64(8)?,
            bins,
        })
    }

    /// The bin with `bin_id`, if this array covers it.
    #[must_use]
    pub fn bin(&self, bin_id: i32) -> Option<&Bin> {
        if bin_array_index(bin_id) != self.index {
            return None;
        }
        let position = usize::try_from(bin_id.rem_euclid(MAX_BIN_PER_ARRAY)).ok()?;
        self.bins.get(position)
    }
}

/// Result of a DLMM quote.
#[derive(Debug, Clone, PartialEq)]
pub struct DlmmSwapQuote {
    /// Input consumed, fees included.
    pub consumed_in_amount: u64,
    /// Output amount.
    pub out_amount: u64,
    /// Total swap fee.
    pub fee: u64,
    /// Protocol part of `fee`.
    pub protocol_fee: u64,
    /// Output after slippage tolerance.
    pub min_out_amount: u64,
    /// Signed relative difference, in percent, between the output and
    /// quoting the whole input at the active-bin price. Negative when the
    /// output falls short.
    pub price_impact: String,
    /// Bin arrays the swap touches, in traversal order.
    pub bin_arrays_pubkey: Vec<Pubkey>,
    /// Price of the last bin used.
    pub end_price: String,
}

impl ToSdkValue for DlmmSwapQuote {
    fn to_sdk_value(&self) -> SdkValue {
        SdkValue::keyed([
            ("consumedInAmount", SdkValue::from(self.consumed_in_amount)),
            ("outAmount", SdkValue::from(self.out_amount)),
            ("fee", SdkValue::from(self.fee)),
            ("protocolFee", SdkValue::from(self.protocol_fee)),
            ("minOutAmount", SdkValue::from(self.min_out_amount)),
            ("priceImpact", SdkValue::from(self.price_impact.as_str())),
            ("binArraysPubkey", self.bin_arrays_pubkey.to_sdk_value()),
            ("endPrice", SdkValue::from(self.end_price.as_str())),
        ])
    }
}

/// Keeps the bin arrays on the swap side of `active_index`, in traversal
/// order, at most [`BIN_ARRAYS_PER_SWAP`] of them. Selling X walks down,
/// selling Y walks up.
#[must_use]
pub fn select_bin_arrays(
    mut arrays: Vec<BinArray>,
    active_index: i64,
    swap_for_y: bool,
) -> Vec<BinArray> {
    if swap_for_y {
        arrays.retain(|a| a.index <= active_index);
        arrays.sort_by_key(|a| std::cmp::Reverse(a.index));
    } else {
        arrays.retain(|a| a.index >= active_index);
        arrays.sort_by_key(|a| a.index);
    }
    arrays.truncate(BIN_ARRAYS_PER_SWAP);
    arrays
}

/// A DLMM pair loaded over JSON-RPC.
#[derive(Debug)]
pub struct DlmmPair {
    connection: RpcConnection,
    address: Pubkey,
    program: Pubkey,
    pair: LbPair,
    token_x: Mint,
    token_y: Mint,
}

impl DlmmPair {
    /// Fetches the pair account and both token mints.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] if any account is missing, foreign or malformed.
    pub async fn load(connection: RpcConnection, address: Pubkey) -> Result<Self, SdkError> {
        let program = Pubkey::from_base58(DLMM_PROGRAM_ID)?;
        let account = connection
            .require_account(&address)
            .await?
            .expect_owner(&program)?;
        let pair = LbPair::decode(&account)?;

        let mints = connection
            .require_accounts(&[pair.token_x_mint, pair.token_y_mint])
            .await?;
        let [mint_x, mint_y]: [Account; 2] = mints
            .try_into()
            .map_err(|_| SdkError::invalid_data(address, "mint batch size"))?;
        let token_x = Mint::decode(mint_x.address, &mint_x.data)?;
        let token_y = Mint::decode(mint_y.address, &mint_y.data)?;

        tracing::debug!(
            pool = %address,
            active_id = pair.active_id,
            bin_step = pair.bin_step,
            "dlmm pair loaded"
        );

        Ok(Self {
            connection,
            address,
            program,
            pair,
            token_x,
            token_y,
        })
    }
}

#[async_trait]
impl DlmmPool for DlmmPair {
    fn token_x_mint(&self) -> &Mint {
        &self.token_x
    }

    fn token_y_mint(&self) -> &Mint {
        &self.token_y
    }

    async fn bin_arrays_for_swap(&self, swap_for_y: bool) -> Result<Vec<BinArray>, SdkError> {
        let filters = [
            AccountFilter::DataSize(BIN_ARRAY_LEN),
            AccountFilter::Memcmp {
                offset: BIN_ARRAY_LB_PAIR_OFFSET,
                bytes: self.address.as_bytes().to_vec(),
            },
        ];
        let accounts = self
            .connection
            .get_program_accounts(&self.program, &filters)
            .await?;
        let arrays = accounts
            .iter()
            .map(BinArray::decode)
            .collect::<Result<Vec<_>, SdkError>>()?;
        let arrays = select_bin_arrays(arrays, bin_array_index(self.pair.active_id), swap_for_y);
        tracing::debug!(pool = %self.address, count = arrays.len(), swap_for_y, "bin arrays fetched");
        Ok(arrays)
    }

    fn swap_quote(
        &self,
        in_amount: u64,
        swap_for_y: bool,
        allowed_slippage_bps: u64,
        bin_arrays: &[BinArray],
    ) -> Result<DlmmSwapQuote, SdkError> {
        let now = chrono::Utc::now().timestamp();
        self.pair
            .quote(in_amount, swap_for_y, allowed_slippage_bps, bin_arrays, now)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::super::layout::test_support::Buf;
    use super::*;

    fn pair(active_id: i32, bin_step: u16) -> LbPair {
        LbPair {
            parameters: StaticParameters {
                base_factor: 10_000,
                protocol_share: 500,
                ..StaticParameters::default()
            },
            v_parameters: VariableParameters::default(),
            active_id,
            bin_step,
            token_x_mint: Pubkey::new([1u8; 32]),
            token_y_mint: Pubkey::new([2u8; 32]),
        }
    }

    fn array(index: i64, fill: impl Fn(i32) -> Bin) -> BinArray {
        let base = i32::try_from(index).unwrap_or_default() * MAX_BIN_PER_ARRAY;
        BinArray {
            address: Pubkey::new([u8::try_from(index.rem_euclid(200)).unwrap_or(0); 32]),
            index,
            bins: (0..MAX_BIN_PER_ARRAY).map(|i| fill(base + i)).collect(),
        }
    }

    #[test]
    fn bin_array_index_floors() {
        assert_eq!(bin_array_index(0), 0);
        assert_eq!(bin_array_index(69), 0);
        assert_eq!(bin_array_index(70), 1);
        assert_eq!(bin_array_index(-1), -1);
        assert_eq!(bin_array_index(-70), -1);
        assert_eq!(bin_array_index(-71), -2);
    }

    #[test]
    fn price_of_bin_zero_is_one() {
        assert!(matches!(price_of_bin(0, 25), Ok(p) if p == q64_one()));
    }

    #[test]
    fn price_moves_by_bin_step() {
        let Ok(up) = price_of_bin(1, 100) else {
            panic!("price computes");
        };
        let Ok(down) = price_of_bin(-1, 100) else {
            panic!("price computes");
        };
        #[allow(clippy::cast_precision_loss)]
        let (up, down) = (up as f64 / q64_one() as f64, down as f64 / q64_one() as f64);
        assert!((up - 1.01).abs() < 1e-12);
        assert!((down - 1.0 / 1.01).abs() < 1e-12);
    }

    #[test]
    fn base_fee_rate_scales_with_step_and_power() {
        let mut p = pair(0, 10);
        // 10_000 * 10 * 10 = 1_000_000 / 1e9 = 0.1%
        assert_eq!(p.base_fee_rate(), 1_000_000);
        p.parameters.base_fee_power_factor = 1;
        assert_eq!(p.base_fee_rate(), 10_000_000);
        p.parameters.base_factor = u16::MAX;
        p.bin_step = 400;
        assert_eq!(p.total_fee_rate(0), MAX_FEE_RATE);
    }

    #[test]
    fn variable_fee_grows_with_distance_from_reference() {
        let mut p = pair(0, 10);
        p.parameters.variable_fee_control = 40_000;
        p.parameters.max_volatility_accumulator = 350_000;
        let v = VariableParameters::default();
        let near = p.volatility_accumulator_at(&v, 0);
        let far = p.volatility_accumulator_at(&v, -3);
        assert_eq!(near, 0);
        assert_eq!(far, 30_000);
        assert_eq!(p.volatility_accumulator_at(&v, -1_000), 350_000);
        assert!(p.total_fee_rate(far) > p.total_fee_rate(near));
    }

    #[test]
    fn references_decay_after_filter_period() {
        let mut p = pair(5, 10);
        p.parameters.filter_period = 30;
        p.parameters.decay_period = 600;
        p.parameters.reduction_factor = 5_000;
        p.v_parameters = VariableParameters {
            volatility_accumulator: 10_000,
            volatility_reference: 1,
            index_reference: 0,
            last_update_timestamp: 1_000,
        };
        assert_eq!(p.references_at(1_010).index_reference, 0);
        let decayed = p.references_at(1_100);
        assert_eq!(decayed.index_reference, 5);
        assert_eq!(decayed.volatility_reference, 5_000);
        assert_eq!(p.references_at(5_000).volatility_reference, 0);
    }

    #[test]
    fn quote_within_active_bin_at_par() {
        let p = pair(0, 10);
        let arrays = vec![array(0, |_| Bin {
            amount_x: 1_000_000,
            amount_y: 1_000_000,
        })];
        let Ok(quote) = p.quote(10_000, true, 100, &arrays, 0) else {
            panic!("quote succeeds");
        };
        // fee = ceil(10_000 * 1e6 / 1e9) = 10; price 1.0
        assert_eq!(quote.consumed_in_amount, 10_000);
        assert_eq!(quote.fee, 10);
        assert_eq!(quote.out_amount, 9_990);
        assert_eq!(quote.protocol_fee, 0);
        assert_eq!(quote.min_out_amount, 9_890);
        let touched: Vec<Pubkey> = arrays.iter().map(|a| a.address).collect();
        assert_eq!(quote.bin_arrays_pubkey, touched);
        assert_eq!(quote.end_price, "1");
    }

    #[test]
    fn quote_crosses_bins_and_arrays_downward() {
        let p = pair(70, 10);
        let fill = |_| Bin {
            amount_x: 0,
            amount_y: 1_000,
        };
        let arrays = vec![array(1, fill), array(0, fill)];
        // more than one bin's worth of Y is needed
        let Ok(quote) = p.quote(5_000, true, 0, &arrays, 0) else {
            panic!("quote succeeds");
        };
        assert!(quote.out_amount > 4_000);
        assert_eq!(quote.bin_arrays_pubkey.len(), 2);
        assert!(quote.price_impact.starts_with('-'));
    }

    #[test]
    fn quote_upward_for_y_input() {
        let p = pair(0, 10);
        let arrays = vec![array(0, |id| Bin {
            amount_x: if id >= 0 { 100 } else { 0 },
            amount_y: 0,
        })];
        let Ok(quote) = p.quote(150, false, 0, &arrays, 0) else {
            panic!("quote succeeds");
        };
        assert!(quote.out_amount > 100);
        assert!(quote.out_amount < 150);
    }

    #[test]
    fn running_out_of_bins_is_insufficient_liquidity() {
        let p = pair(0, 10);
        let arrays = vec![array(0, |_| Bin {
            amount_x: 0,
            amount_y: 10,
        })];
        assert!(matches!(
            p.quote(1_000_000, true, 0, &arrays, 0),
            Err(SdkError::InsufficientLiquidity(_))
        ));
        assert!(matches!(
            p.quote(1, true, 0, &[], 0),
            Err(SdkError::InsufficientLiquidity(_))
        ));
    }

    #[test]
    fn decodes_pair_and_bin_array() {
        let mut buf = Buf::zeroed(904);
        buf.put(8, &10_000u16.to_le_bytes())
            .put(16, &40_000u32.to_le_bytes())
            .put(32, &500u16.to_le_bytes())
            .put(40, &7u32.to_le_bytes())
            .put(76, &(-12i32).to_le_bytes())
            .put(80, &25u16.to_le_bytes())
            .put(88, &[3u8; 32])
            .put(120, &[4u8; 32]);
        let account = Account {
            address: Pubkey::new([9u8; 32]),
            owner: Pubkey::default(),
            data: buf.0,
        };
        let Ok(decoded) = LbPair::decode(&account) else {
            panic!("pair decodes");
        };
        assert_eq!(decoded.parameters.base_factor, 10_000);
        assert_eq!(decoded.parameters.variable_fee_control, 40_000);
        assert_eq!(decoded.parameters.protocol_share, 500);
        assert_eq!(decoded.v_parameters.volatility_accumulator, 7);
        assert_eq!(decoded.active_id, -12);
        assert_eq!(decoded.bin_step, 25);
        assert_eq!(decoded.token_x_mint, Pubkey::new([3u8; 32]));
        assert_eq!(decoded.token_y_mint, Pubkey::new([4u8; 32]));

        let mut arr = Buf::zeroed(BIN_ARRAY_LEN);
        arr.put(8, &(-1i64).to_le_bytes())
            .put(BIN_ARRAY_HEADER + 69 * BIN_SIZE, &5u64.to_le_bytes())
            .put(BIN_ARRAY_HEADER + 69 * BIN_SIZE + 8, &6u64.to_le_bytes());
        let account = Account {
            address: Pubkey::new([8u8; 32]),
            owner: Pubkey::default(),
            data: arr.0,
        };
        let Ok(bin_array) = BinArray::decode(&account) else {
            panic!("bin array decodes");
        };
        assert_eq!(bin_array.index, -1);
        assert_eq!(bin_array.bins.len(), 70);
        assert_eq!(
            bin_array.bin(-1),
            Some(&Bin {
                amount_x: 5,
                amount_y: 6
            })
        );
        assert_eq!(bin_array.bin(0), None);
    }

    #[test]
    fn selects_bin_arrays_on_swap_side_in_traversal_order() {
        let empty = |_| Bin::default();
        let arrays: Vec<BinArray> = [-3, -2, 3, 0, -1, 1, 6, 2, 5]
            .into_iter()
            .map(|index| array(index, empty))
            .collect();
        let active_index = bin_array_index(75);
        assert_eq!(active_index, 1);

        let indices = |selected: Vec<BinArray>| -> Vec<i64> {
            selected.iter().map(|a| a.index).collect()
        };
        assert_eq!(
            indices(select_bin_arrays(arrays.clone(), active_index, true)),
            [1, 0, -1, -2]
        );
        assert_eq!(
            indices(select_bin_arrays(arrays, active_index, false)),
            [1, 2, 3, 5]
        );
    }

    #[test]
    fn selection_may_return_fewer_than_four() {
        let arrays = vec![array(4, |_| Bin::default()), array(2, |_| Bin::default())];
        let selected = select_bin_arrays(arrays, 2, true);
        assert_eq!(selected.iter().map(|a| a.index).collect::<Vec<_>>(), [2]);
        assert!(select_bin_arrays(Vec::new(), 0, false).is_empty());
    }

    #[test]
    fn quote_serializes_deeply() {
        let p = pair(0, 10);
        let arrays = vec![array(0, |_| Bin {
            amount_x: 1_000_000,
            amount_y: 1_000_000,
        })];
        let Ok(quote) = p.quote(10_000, true, 10, &arrays, 0) else {
            panic!("quote succeeds");
        };
        let json = crate::domain::serialize(&quote.to_sdk_value());
        assert_eq!(json["outAmount"], "9990");
        assert_eq!(
            json["binArraysPubkey"],
            serde_json::json!([Pubkey::new([0u8; 32]).to_base58()])
        );
        assert_eq!(json["endPrice"], "1");
    }
}
