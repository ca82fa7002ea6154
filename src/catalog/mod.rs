// Catalog module
// Read-only access to books, categories and subcategories

pub mod error;
pub mod handlers;
pub mod models;
pub mod query;
pub mod repository;

pub use error::CatalogError;
pub use models::{Book, Category, CategoryTree, Subcategory};
pub use query::{BookFilter, BookQueryParams, BookQueryValidator, SortField, SortOrder};
pub use repository::{CatalogStore, PgCatalogStore};

#[cfg(test)]
pub use repository::MockCatalogStore;
