//! Swap quote handlers.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{DlmmSwapQuoteQuery, SwapQuoteQuery, SwapQuoteResponse};
use crate::app_state::AppState;
use crate::domain::{QuoteRequest, ToSdkValue, serialize};
use crate::error::{ErrorResponse, GatewayError};

/// `GET /swapQuote`: Quote a dynamic AMM swap.
///
/// # Errors
///
/// Returns [`GatewayError`] on missing or unparsable parameters, or
/// upstream failure.
#[utoipa::path(
    get,
    path = "/swapQuote",
    tag = "Swaps",
    summary = "Quote an AMM swap",
    description = "Quotes selling `swapAmount` of token A (`swapAtoB=true`) or token B (any other value) with 1% slippage.",
    params(SwapQuoteQuery),
    responses(
        (status = 200, description = "Quote", body = SwapQuoteResponse),
        (status = 400, description = "Missing or invalid parameter", body = ErrorResponse),
        (status = 500, description = "Chain or SDK failure", body = ErrorResponse),
    )
)]
pub async fn swap_quote(
    State(state): State<AppState>,
    query: Result<Query<SwapQuoteQuery>, QueryRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Query(query) = query?;
    let request = QuoteRequest::from(query);
    let quote = state.pool_service.swap_quote(&request).await?;
    let response = SwapQuoteResponse::from(&quote);
    Ok(Json(serialize(&response.to_sdk_value())))
}

/// `GET /dlmmSwapQuote`: Quote a DLMM swap.
///
/// # Errors
///
/// Returns [`GatewayError`] on missing or unparsable parameters, a token
/// foreign to the pair, or upstream failure.
#[utoipa::path(
    get,
    path = "/dlmmSwapQuote",
    tag = "Swaps",
    summary = "Quote a DLMM swap",
    description = "Quotes selling `swapAmount` of `token` across the pair's bins. `limit` is the allowed slippage in basis points.",
    params(DlmmSwapQuoteQuery),
    responses(
        (status = 200, description = "Quote with consumedInAmount, outAmount, fee, protocolFee, minOutAmount, priceImpact, binArraysPubkey and endPrice; integers as strings"),
        (status = 400, description = "Missing or invalid parameter, or token not in pool", body = ErrorResponse),
        (status = 500, description = "Chain or SDK failure", body = ErrorResponse),
    )
)]
pub async fn dlmm_swap_quote(
    State(state): State<AppState>,
    query: Result<Query<DlmmSwapQuoteQuery>, QueryRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Query(query) = query?;
    let request = QuoteRequest::from(query);
    let quote = state.pool_service.dlmm_swap_quote(&request).await?;
    Ok(Json(serialize(&quote.to_sdk_value())))
}

/// Swap routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/swapQuote", get(swap_quote))
        .route("/dlmmSwapQuote", get(dlmm_swap_quote))
}
