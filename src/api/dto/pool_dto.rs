//! Response DTO of `GET /getPoolInfo`.

use utoipa::ToSchema;

use crate::domain::{Pubkey, SdkValue, ToSdkValue};
use crate::sdk::Mint;
use crate::service::PoolSnapshot;

/// One side of an AMM pool.
#[derive(Debug, Clone, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct TokenReserveDto {
    /// Token mint address (base58).
    #[schema(value_type = String)]
    pub address: Pubkey,
    /// Pool reserve in base units (string-encoded).
    #[schema(value_type = String)]
    pub amount: u64,
    /// Mint decimals.
    pub decimals: u8,
}

impl TokenReserveDto {
    fn new(mint: &Mint, amount: u64) -> Self {
        Self {
            address: mint.address,
            amount,
            decimals: mint.decimals,
        }
    }
}

impl ToSdkValue for TokenReserveDto {
    fn to_sdk_value(&self) -> SdkValue {
        SdkValue::keyed([
            ("address", SdkValue::from(self.address)),
            ("amount", SdkValue::from(self.amount)),
            ("decimals", SdkValue::from(self.decimals)),
        ])
    }
}

/// Response body for `GET /getPoolInfo`.
#[derive(Debug, Clone, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct PoolInfoResponse {
    /// Pool address as supplied by the caller.
    pub pool_address: String,
    /// LP token mint (base58).
    #[schema(value_type = String)]
    pub pool_token_mint: Pubkey,
    /// LP amount locked in the pool (string-encoded).
    #[schema(value_type = String)]
    pub locked_lp_amount: u64,
    /// LP token supply (string-encoded).
    #[schema(value_type = String)]
    pub lp_supply: u64,
    /// First token.
    pub token_a: TokenReserveDto,
    /// Second token.
    pub token_b: TokenReserveDto,
    /// Pool invariant per LP token; `null` for stable-curve pools.
    pub virtual_price: Option<f64>,
    /// `virtualPrice` scaled by 1e8 (string-encoded); `null` for
    /// stable-curve pools.
    #[schema(value_type = Option<String>)]
    pub virtual_price_raw: Option<u128>,
}

impl From<PoolSnapshot> for PoolInfoResponse {
    fn from(s: PoolSnapshot) -> Self {
        Self {
            token_a: TokenReserveDto::new(&s.token_a, s.info.token_a_amount),
            token_b: TokenReserveDto::new(&s.token_b, s.info.token_b_amount),
            pool_address: s.pool_address,
            pool_token_mint: s.pool_token_mint,
            locked_lp_amount: s.locked_lp_amount,
            lp_supply: s.lp_supply,
            virtual_price: s.info.virtual_price,
            virtual_price_raw: s.info.virtual_price_raw,
        }
    }
}

impl ToSdkValue for PoolInfoResponse {
    fn to_sdk_value(&self) -> SdkValue {
        SdkValue::keyed([
            ("poolAddress", SdkValue::from(self.pool_address.as_str())),
            ("poolTokenMint", SdkValue::from(self.pool_token_mint)),
            ("lockedLpAmount", SdkValue::from(self.locked_lp_amount)),
            ("lpSupply", SdkValue::from(self.lp_supply)),
            ("tokenA", self.token_a.to_sdk_value()),
            ("tokenB", self.token_b.to_sdk_value()),
            (
                "virtualPrice",
                self.virtual_price.map_or_else(SdkValue::null, SdkValue::from),
            ),
            (
                "virtualPriceRaw",
                self.virtual_price_raw.map_or_else(SdkValue::null, SdkValue::from),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::serialize;
    use crate::sdk::AmmPoolInfo;

    fn snapshot(info: AmmPoolInfo) -> PoolSnapshot {
        let mint = |b: u8, decimals: u8| Mint {
            address: Pubkey::new([b; 32]),
            supply: 0,
            decimals,
        };
        PoolSnapshot {
            pool_address: "pool".to_string(),
            pool_token_mint: Pubkey::new([3u8; 32]),
            locked_lp_amount: 7,
            lp_supply: 1_000_000,
            token_a: mint(1, 6),
            token_b: mint(2, 9),
            info,
        }
    }

    #[test]
    fn pool_info_serializes_in_field_order() {
        let info = AmmPoolInfo::constant_product(1_000_000, 4_000_000, 1_000_000);
        let json = serialize(&PoolInfoResponse::from(snapshot(info)).to_sdk_value());
        let keys: Vec<&str> = json
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(
            keys,
            [
                "poolAddress",
                "poolTokenMint",
                "lockedLpAmount",
                "lpSupply",
                "tokenA",
                "tokenB",
                "virtualPrice",
                "virtualPriceRaw"
            ]
        );
        assert_eq!(json["lockedLpAmount"], "7");
        assert_eq!(json["tokenA"]["decimals"], 6);
        assert_eq!(json["tokenB"]["amount"], "4000000");
        assert_eq!(json["virtualPrice"], 2.0);
        assert_eq!(json["virtualPriceRaw"], "200000000");
    }

    #[test]
    fn unpriced_pool_reports_null_virtual_price() {
        let info = AmmPoolInfo::unpriced(5, 7);
        let json = serialize(&PoolInfoResponse::from(snapshot(info)).to_sdk_value());
        assert_eq!(json["tokenA"]["amount"], "5");
        assert_eq!(json["lpSupply"], "1000000");
        assert!(json["virtualPrice"].is_null());
        assert!(json["virtualPriceRaw"].is_null());
    }
}
