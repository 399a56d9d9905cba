//! Query-string parameters of the three quote endpoints.
//!
//! Every field is optional at extraction time so that presence checks, and
//! the error message naming the missing parameter, stay in the service.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::QuoteRequest;

/// Query of `GET /getPoolInfo`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct PoolInfoQuery {
    /// JSON-RPC endpoint of the network node.
    pub node_url: Option<String>,
    /// Base58 address of the AMM pool.
    pub pool_address: Option<String>,
}

/// Query of `GET /swapQuote`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SwapQuoteQuery {
    /// JSON-RPC endpoint of the network node.
    pub node_url: Option<String>,
    /// Base58 address of the AMM pool.
    pub pool_address: Option<String>,
    /// Input amount in base units.
    pub swap_amount: Option<String>,
    /// `true` sells token A; any other value sells token B.
    #[serde(rename = "swapAtoB")]
    #[param(rename = "swapAtoB")]
    pub swap_a_to_b: Option<String>,
}

/// Query of `GET /dlmmSwapQuote`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct DlmmSwapQuoteQuery {
    /// JSON-RPC endpoint of the network node.
    pub node_url: Option<String>,
    /// Base58 address of the DLMM pair.
    pub pool_address: Option<String>,
    /// Input amount in base units.
    pub swap_amount: Option<String>,
    /// Base58 mint of the input token; must be the pair's X or Y token.
    pub token: Option<String>,
    /// Allowed slippage in basis points. Defaults to 10.
    pub limit: Option<String>,
}

fn collect(pairs: impl IntoIterator<Item = (&'static str, Option<String>)>) -> QuoteRequest {
    pairs
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
}

impl From<PoolInfoQuery> for QuoteRequest {
    fn from(q: PoolInfoQuery) -> Self {
        collect([("nodeUrl", q.node_url), ("poolAddress", q.pool_address)])
    }
}

impl From<SwapQuoteQuery> for QuoteRequest {
    fn from(q: SwapQuoteQuery) -> Self {
        collect([
            ("nodeUrl", q.node_url),
            ("poolAddress", q.pool_address),
            ("swapAmount", q.swap_amount),
            ("swapAtoB", q.swap_a_to_b),
        ])
    }
}

impl From<DlmmSwapQuoteQuery> for QuoteRequest {
    fn from(q: DlmmSwapQuoteQuery) -> Self {
        collect([
            ("nodeUrl", q.node_url),
            ("poolAddress", q.pool_address),
            ("swapAmount", q.swap_amount),
            ("token", q.token),
            ("limit", q.limit),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_absent_and_empty_fields_present() {
        let request = QuoteRequest::from(SwapQuoteQuery {
            node_url: Some("http://node".to_string()),
            swap_a_to_b: Some(String::new()),
            ..SwapQuoteQuery::default()
        });
        assert_eq!(request.get("nodeUrl"), Some("http://node"));
        assert_eq!(request.get("swapAtoB"), Some(""));
        assert_eq!(request.get("poolAddress"), None);
    }

    #[test]
    fn deserializes_camel_case_query() {
        let parsed: Result<DlmmSwapQuoteQuery, _> = serde_json::from_value(serde_json::json!({
            "nodeUrl": "http://node",
            "poolAddress": "pool",
            "swapAmount": "5",
            "token": "mint",
        }));
        assert!(matches!(
            parsed,
            Ok(DlmmSwapQuoteQuery { swap_amount: Some(ref a), limit: None, .. }) if a == "5"
        ));
    }
}
