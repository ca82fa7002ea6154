// HTTP handlers for the authenticated cart

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::cart::{CartError, CartItemInput, CartResponse, UpdateQuantityRequest};
use crate::AppState;

/// Handler for GET /api/cart
#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current cart", body = CartResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CartResponse>, CartError> {
    let cart = state.cart_service.get_cart(&user.user_id).await?;
    Ok(Json(cart.into()))
}

/// Handler for POST /api/cart/items
/// Adds a book, merging with an existing line for the same book
#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = CartItemInput,
    responses(
        (status = 201, description = "Item added", body = CartResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 422, description = "Insufficient stock", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CartItemInput>,
) -> Result<(StatusCode, Json<CartResponse>), CartError> {
    let cart = state.cart_service.add_item(&user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(cart.into())))
}

/// Handler for PUT /api/cart/items/:line_id
/// A quantity below 1 removes the line
#[utoipa::path(
    put,
    path = "/api/cart/items/{line_id}",
    params(("line_id" = Uuid, Path, description = "Cart line ID")),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated", body = CartResponse),
        (status = 404, description = "Line not found", body = ErrorResponse),
        (status = 422, description = "Insufficient stock", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(line_id): Path<Uuid>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartResponse>, CartError> {
    let cart = state
        .cart_service
        .set_quantity(&user.user_id, line_id, request.quantity)
        .await?;
    Ok(Json(cart.into()))
}

/// Handler for DELETE /api/cart/items/:line_id
#[utoipa::path(
    delete,
    path = "/api/cart/items/{line_id}",
    params(("line_id" = Uuid, Path, description = "Cart line ID")),
    responses(
        (status = 200, description = "Line removed", body = CartResponse),
        (status = 404, description = "Line not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(line_id): Path<Uuid>,
) -> Result<Json<CartResponse>, CartError> {
    let cart = state.cart_service.remove_item(&user.user_id, line_id).await?;
    Ok(Json(cart.into()))
}

/// Handler for DELETE /api/cart
#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 204, description = "Cart cleared")
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<StatusCode, CartError> {
    state.cart_service.clear(&user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
