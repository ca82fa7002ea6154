pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod db;
pub mod discounts;
pub mod error;
pub mod money;

#[cfg(test)]
mod memory;

use axum::{
    extract::FromRef,
    routing::{get, post, put},
    Router,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::TokenService;
use crate::cart::{CartRepository, CartService, PgCartRepository};
use crate::catalog::{CatalogStore, PgCatalogStore};
use crate::checkout::CheckoutService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::discounts::{
    DiscountConsumer, DiscountEvaluator, DiscountRegistry, DiscountService, PgDiscountRegistry,
    PgUsageLedger, UsageLedger,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        catalog::handlers::list_books,
        catalog::handlers::get_book,
        catalog::handlers::get_book_by_slug,
        catalog::handlers::list_categories,
        cart::handlers::get_cart,
        cart::handlers::add_item,
        cart::handlers::update_item,
        cart::handlers::remove_item,
        cart::handlers::clear_cart,
        checkout::handlers::quote,
        checkout::handlers::checkout,
        discounts::handlers::list_active_discounts,
        discounts::handlers::validate_discount,
        discounts::handlers::list_discounts,
        discounts::handlers::create_discount,
        discounts::handlers::get_discount,
        discounts::handlers::update_discount,
        discounts::handlers::delete_discount,
        discounts::handlers::list_targets,
        discounts::handlers::add_target,
        discounts::handlers::remove_target,
    ),
    components(
        schemas(
            catalog::Book,
            catalog::Category,
            catalog::Subcategory,
            catalog::CategoryTree,
            cart::CartLineItem,
            cart::CartLineItemResponse,
            cart::CartResponse,
            cart::CartState,
            cart::CartItemInput,
            cart::UpdateQuantityRequest,
            checkout::QuoteRequest,
            checkout::CheckoutRequest,
            checkout::CheckoutSummary,
            checkout::OrderConfirmation,
            discounts::DiscountDefinition,
            discounts::DiscountKind,
            discounts::DiscountDetail,
            discounts::DiscountTargets,
            discounts::TargetKind,
            discounts::CreateDiscountRequest,
            discounts::UpdateDiscountRequest,
            discounts::ValidateDiscountRequest,
            discounts::DiscountEvaluationResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "catalog", description = "Books and categories"),
        (name = "cart", description = "Cart of the signed-in customer"),
        (name = "checkout", description = "Checkout summaries and order placement"),
        (name = "discounts", description = "Discount codes available to customers"),
        (name = "admin", description = "Discount management (admin only)")
    ),
    info(
        title = "Bookstore API",
        version = "1.0.0",
        description = "Catalog, cart pricing and discount evaluation for the online bookstore"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub cart_service: CartService,
    pub discount_service: DiscountService,
    pub evaluator: DiscountEvaluator,
    pub checkout_service: CheckoutService,
    pub tokens: TokenService,
}

impl AppState {
    /// Wire every service to the PostgreSQL-backed collaborators
    pub fn from_pool(pool: DbPool, config: &AppConfig) -> Self {
        Self::with_collaborators(
            Arc::new(PgCatalogStore::new(pool.clone())),
            Arc::new(PgCartRepository::new(pool.clone())),
            Arc::new(PgDiscountRegistry::new(pool.clone())),
            Arc::new(PgUsageLedger::new(pool)),
            TokenService::new(config.jwt_secret.clone()),
            config.shipping_cost,
        )
    }

    pub fn with_collaborators(
        catalog: Arc<dyn CatalogStore>,
        carts: Arc<dyn CartRepository>,
        registry: Arc<dyn DiscountRegistry>,
        ledger: Arc<dyn UsageLedger>,
        tokens: TokenService,
        shipping_cost: Decimal,
    ) -> Self {
        let cart_service = CartService::new(catalog.clone(), carts);
        let evaluator = DiscountEvaluator::new(registry.clone(), ledger.clone());
        let consumer = DiscountConsumer::new(registry.clone(), ledger);
        let checkout_service = CheckoutService::new(
            cart_service.clone(),
            evaluator.clone(),
            consumer,
            shipping_cost,
        );

        Self {
            catalog,
            cart_service,
            discount_service: DiscountService::new(registry),
            evaluator,
            checkout_service,
            tokens,
        }
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Catalog
        .route("/api/books", get(catalog::handlers::list_books))
        .route("/api/books/:id", get(catalog::handlers::get_book))
        .route("/api/books/slug/:slug", get(catalog::handlers::get_book_by_slug))
        .route("/api/categories", get(catalog::handlers::list_categories))
        // Cart and checkout
        .route(
            "/api/cart",
            get(cart::handlers::get_cart).delete(cart::handlers::clear_cart),
        )
        .route("/api/cart/items", post(cart::handlers::add_item))
        .route(
            "/api/cart/items/:line_id",
            put(cart::handlers::update_item).delete(cart::handlers::remove_item),
        )
        .route("/api/cart/quote", post(checkout::handlers::quote))
        .route("/api/checkout", post(checkout::handlers::checkout))
        // Discounts
        .route("/api/discounts/active", get(discounts::handlers::list_active_discounts))
        .route("/api/discounts/validate", post(discounts::handlers::validate_discount))
        .route(
            "/api/admin/discounts",
            get(discounts::handlers::list_discounts).post(discounts::handlers::create_discount),
        )
        .route(
            "/api/admin/discounts/:id",
            get(discounts::handlers::get_discount)
                .put(discounts::handlers::update_discount)
                .delete(discounts::handlers::delete_discount),
        )
        .route("/api/admin/discounts/:id/targets", get(discounts::handlers::list_targets))
        .route(
            "/api/admin/discounts/:id/:kind/:target_id",
            post(discounts::handlers::add_target).delete(discounts::handlers::remove_target),
        )
        .layer(cors)
        .with_state(state)
}
