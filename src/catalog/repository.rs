use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::catalog::error::CatalogError;
use crate::catalog::models::{Book, Category, Subcategory};
use crate::catalog::query::{BookFilter, BookQueryBuilder};

/// Read access to the book catalog
///
/// Carts and the discount flow only ever read from the catalog; product
/// management happens elsewhere.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Book>, CatalogError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Book>, CatalogError>;

    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, CatalogError>;

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError>;

    async fn list_subcategories(&self) -> Result<Vec<Subcategory>, CatalogError>;
}

/// PostgreSQL-backed catalog
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_BOOK: &str = r#"
    SELECT id, title, slug, author, description, price, discount_price, stock,
           cover_image, created_at, updated_at
    FROM books
"#;

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Book>, CatalogError> {
        tracing::debug!("Fetching book with id: {}", id);

        let book = sqlx::query_as::<_, Book>(&format!("{} WHERE id = $1", SELECT_BOOK))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Book>, CatalogError> {
        tracing::debug!("Fetching book with slug: {}", slug);

        let book = sqlx::query_as::<_, Book>(&format!("{} WHERE slug = $1", SELECT_BOOK))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, CatalogError> {
        let (query_str, params) = BookQueryBuilder::from_filter(filter).build();
        tracing::debug!("Executing catalog query: {}", query_str);

        let mut query = sqlx::query_as::<_, Book>(&query_str);
        for param in params {
            query = query.bind(param);
        }

        let books = query.fetch_all(&self.pool).await?;
        tracing::debug!("Catalog query returned {} books", books.len());

        Ok(books)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, description, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn list_subcategories(&self) -> Result<Vec<Subcategory>, CatalogError> {
        let subcategories = sqlx::query_as::<_, Subcategory>(
            "SELECT id, category_id, name, slug, description, created_at FROM subcategories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(subcategories)
    }
}
