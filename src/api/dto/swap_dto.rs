//! Response DTO of `GET /swapQuote`.

use utoipa::ToSchema;

use crate::domain::{SdkValue, ToSdkValue};
use crate::sdk::AmmSwapQuote;

/// Response body for `GET /swapQuote`.
#[derive(Debug, Clone, Copy, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SwapQuoteResponse {
    /// Input amount (string-encoded).
    #[schema(value_type = String)]
    pub swap_in_amount: u64,
    /// Output amount (string-encoded).
    #[schema(value_type = String)]
    pub swap_out_amount: u64,
}

impl From<&AmmSwapQuote> for SwapQuoteResponse {
    fn from(quote: &AmmSwapQuote) -> Self {
        Self {
            swap_in_amount: quote.swap_in_amount,
            swap_out_amount: quote.swap_out_amount,
        }
    }
}

impl ToSdkValue for SwapQuoteResponse {
    fn to_sdk_value(&self) -> SdkValue {
        SdkValue::keyed([
            ("swapInAmount", SdkValue::from(self.swap_in_amount)),
            ("swapOutAmount", SdkValue::from(self.swap_out_amount)),
        ])
    }
}
