// HTTP handlers for catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::catalog::{
    Book, BookQueryParams, BookQueryValidator, CatalogError, CategoryTree,
};
use crate::AppState;

/// Handler for GET /api/books
/// Lists books with search, category, price filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/books",
    params(BookQueryParams),
    responses(
        (status = 200, description = "Books matching the filter", body = [Book]),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 503, description = "Catalog unavailable", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<BookQueryParams>,
) -> Result<Json<Vec<Book>>, CatalogError> {
    let filter = BookQueryValidator::validate(params)?;
    let books = state.catalog.list(&filter).await?;
    Ok(Json(books))
}

/// Handler for GET /api/books/:id
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book found", body = Book),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Book>, CatalogError> {
    state
        .catalog
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| CatalogError::BookNotFound(id.to_string()))
}

/// Handler for GET /api/books/slug/:slug
#[utoipa::path(
    get,
    path = "/api/books/slug/{slug}",
    params(("slug" = String, Path, description = "Book slug")),
    responses(
        (status = 200, description = "Book found", body = Book),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_book_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Book>, CatalogError> {
    state
        .catalog
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or(CatalogError::BookNotFound(slug))
}

/// Handler for GET /api/categories
/// Categories with their subcategories nested
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Category tree", body = [CategoryTree])
    ),
    tag = "catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryTree>>, CatalogError> {
    let categories = state.catalog.list_categories().await?;
    let subcategories = state.catalog.list_subcategories().await?;
    Ok(Json(CategoryTree::build(categories, subcategories)))
}
