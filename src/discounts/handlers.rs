// HTTP handlers for discount endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AdminUser, OptionalUser};
use crate::discounts::{
    CreateDiscountRequest, DiscountDefinition, DiscountDetail, DiscountError,
    DiscountEvaluationResponse, DiscountTargets, TargetKind, UpdateDiscountRequest,
    ValidateDiscountRequest,
};
use crate::error::ApiError;
use crate::AppState;

/// Handler for GET /api/discounts/active
#[utoipa::path(
    get,
    path = "/api/discounts/active",
    responses(
        (status = 200, description = "Discounts currently available", body = [DiscountDefinition]),
        (status = 503, description = "Discount storage unavailable", body = ErrorResponse)
    ),
    tag = "discounts"
)]
pub async fn list_active_discounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<DiscountDefinition>>, DiscountError> {
    let discounts = state.discount_service.list_active().await?;
    Ok(Json(discounts))
}

/// Handler for POST /api/discounts/validate
/// Prices the submitted items and evaluates the code for the caller, if any.
/// An inapplicable code is a 200 with `valid: false`.
#[utoipa::path(
    post,
    path = "/api/discounts/validate",
    request_body = ValidateDiscountRequest,
    responses(
        (status = 200, description = "Evaluation result", body = DiscountEvaluationResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 503, description = "Discount storage unavailable", body = ErrorResponse)
    ),
    tag = "discounts"
)]
pub async fn validate_discount(
    State(state): State<AppState>,
    user: OptionalUser,
    Json(request): Json<ValidateDiscountRequest>,
) -> Result<Json<DiscountEvaluationResponse>, ApiError> {
    request.validate()?;

    let cart = state.cart_service.price_items(&request.items).await?;
    let evaluation = state
        .evaluator
        .evaluate_cart(request.code.trim(), user.identity(), &cart)
        .await?;

    Ok(Json(evaluation.into()))
}

/// Handler for GET /api/admin/discounts
#[utoipa::path(
    get,
    path = "/api/admin/discounts",
    responses(
        (status = 200, description = "All discounts", body = [DiscountDefinition]),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_discounts(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<DiscountDefinition>>, DiscountError> {
    let discounts = state.discount_service.list().await?;
    Ok(Json(discounts))
}

/// Handler for POST /api/admin/discounts
#[utoipa::path(
    post,
    path = "/api/admin/discounts",
    request_body = CreateDiscountRequest,
    responses(
        (status = 201, description = "Discount created", body = DiscountDefinition),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Code already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn create_discount(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateDiscountRequest>,
) -> Result<(StatusCode, Json<DiscountDefinition>), DiscountError> {
    tracing::debug!("Admin {} creating discount {}", admin.user_id, request.code);
    let discount = state.discount_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(discount)))
}

/// Handler for GET /api/admin/discounts/:id
#[utoipa::path(
    get,
    path = "/api/admin/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount ID")),
    responses(
        (status = 200, description = "Discount with targets", body = DiscountDetail),
        (status = 404, description = "Discount not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn get_discount(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DiscountDetail>, DiscountError> {
    let detail = state.discount_service.get(id).await?;
    Ok(Json(detail))
}

/// Handler for PUT /api/admin/discounts/:id
#[utoipa::path(
    put,
    path = "/api/admin/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount ID")),
    request_body = UpdateDiscountRequest,
    responses(
        (status = 200, description = "Discount updated", body = DiscountDefinition),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Discount not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn update_discount(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDiscountRequest>,
) -> Result<Json<DiscountDefinition>, DiscountError> {
    let discount = state.discount_service.update(id, request).await?;
    Ok(Json(discount))
}

/// Handler for DELETE /api/admin/discounts/:id
#[utoipa::path(
    delete,
    path = "/api/admin/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount ID")),
    responses(
        (status = 204, description = "Discount deleted"),
        (status = 404, description = "Discount not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn delete_discount(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, DiscountError> {
    state.discount_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/admin/discounts/:id/targets
#[utoipa::path(
    get,
    path = "/api/admin/discounts/{id}/targets",
    params(("id" = Uuid, Path, description = "Discount ID")),
    responses(
        (status = 200, description = "Target associations", body = DiscountTargets),
        (status = 404, description = "Discount not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_targets(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DiscountTargets>, DiscountError> {
    let targets = state.discount_service.list_targets(id).await?;
    Ok(Json(targets))
}

/// Handler for POST /api/admin/discounts/:id/:kind/:target_id
/// Associates a book, category or subcategory with a discount
#[utoipa::path(
    post,
    path = "/api/admin/discounts/{id}/{kind}/{target_id}",
    params(
        ("id" = Uuid, Path, description = "Discount ID"),
        ("kind" = TargetKind, Path, description = "products, categories or subcategories"),
        ("target_id" = Uuid, Path, description = "Book, category or subcategory ID")
    ),
    responses(
        (status = 201, description = "Association stored", body = DiscountTargets),
        (status = 404, description = "Discount or target not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn add_target(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((id, kind, target_id)): Path<(Uuid, TargetKind, Uuid)>,
) -> Result<(StatusCode, Json<DiscountTargets>), DiscountError> {
    let targets = state
        .discount_service
        .add_target(id, kind.target(target_id))
        .await?;
    Ok((StatusCode::CREATED, Json(targets)))
}

/// Handler for DELETE /api/admin/discounts/:id/:kind/:target_id
#[utoipa::path(
    delete,
    path = "/api/admin/discounts/{id}/{kind}/{target_id}",
    params(
        ("id" = Uuid, Path, description = "Discount ID"),
        ("kind" = TargetKind, Path, description = "products, categories or subcategories"),
        ("target_id" = Uuid, Path, description = "Book, category or subcategory ID")
    ),
    responses(
        (status = 204, description = "Association removed"),
        (status = 404, description = "Discount or association not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn remove_target(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((id, kind, target_id)): Path<(Uuid, TargetKind, Uuid)>,
) -> Result<StatusCode, DiscountError> {
    state
        .discount_service
        .remove_target(id, kind.target(target_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
