//! Pool state handler.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{PoolInfoQuery, PoolInfoResponse};
use crate::app_state::AppState;
use crate::domain::{QuoteRequest, ToSdkValue, serialize};
use crate::error::{ErrorResponse, GatewayError};

/// `GET /getPoolInfo`: AMM pool composition and LP figures.
///
/// # Errors
///
/// Returns [`GatewayError`] on missing parameters or upstream failure.
#[utoipa::path(
    get,
    path = "/getPoolInfo",
    tag = "Pools",
    summary = "Get AMM pool info",
    description = "Loads a dynamic AMM pool and returns its LP mint, locked LP, LP supply, both token reserves and the virtual price.",
    params(PoolInfoQuery),
    responses(
        (status = 200, description = "Pool state", body = PoolInfoResponse),
        (status = 400, description = "Missing parameter", body = ErrorResponse),
        (status = 500, description = "Chain or SDK failure", body = ErrorResponse),
    )
)]
pub async fn get_pool_info(
    State(state): State<AppState>,
    query: Result<Query<PoolInfoQuery>, QueryRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Query(query) = query?;
    let request = QuoteRequest::from(query);
    let snapshot = state.pool_service.pool_info(&request).await?;
    let response = PoolInfoResponse::from(snapshot);
    Ok(Json(serialize(&response.to_sdk_value())))
}

/// Pool routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/getPoolInfo", get(get_pool_info))
}
