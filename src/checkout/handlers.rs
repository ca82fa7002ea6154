// HTTP handlers for quotes and checkout

use axum::{extract::State, http::StatusCode, Json};

use crate::auth::{AuthenticatedUser, OptionalUser};
use crate::checkout::{CheckoutError, CheckoutRequest, CheckoutSummary, OrderConfirmation, QuoteRequest};
use crate::AppState;

/// Handler for POST /api/cart/quote
/// Prices a client-held cart with an optional discount code; no login needed
#[utoipa::path(
    post,
    path = "/api/cart/quote",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Checkout summary", body = CheckoutSummary),
        (status = 404, description = "Book or discount code not found", body = ErrorResponse),
        (status = 422, description = "Discount not applicable or insufficient stock", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    ),
    tag = "checkout"
)]
pub async fn quote(
    State(state): State<AppState>,
    user: OptionalUser,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<CheckoutSummary>, CheckoutError> {
    let summary = state
        .checkout_service
        .quote(request, user.identity())
        .await?;
    Ok(Json(summary))
}

/// Handler for POST /api/checkout
#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderConfirmation),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Discount code not found", body = ErrorResponse),
        (status = 422, description = "Empty cart or discount not applicable", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "checkout"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderConfirmation>), CheckoutError> {
    let confirmation = state
        .checkout_service
        .place_order(&user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}
