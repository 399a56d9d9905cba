//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use crate::api::dto::{PoolInfoResponse, SwapQuoteResponse, TokenReserveDto};
use crate::api::handlers::{pool, swap, system};
use crate::error::ErrorResponse;

/// OpenAPI description of every route.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "pool-gateway",
        description = "Read-only HTTP gateway for dynamic AMM and DLMM pool state and swap quotes."
    ),
    paths(
        pool::get_pool_info,
        swap::swap_quote,
        swap::dlmm_swap_quote,
        system::health_handler,
    ),
    components(schemas(
        PoolInfoResponse,
        TokenReserveDto,
        SwapQuoteResponse,
        ErrorResponse,
        system::HealthResponse,
    )),
    tags(
        (name = "Pools", description = "Pool state"),
        (name = "Swaps", description = "Swap quotes"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;
