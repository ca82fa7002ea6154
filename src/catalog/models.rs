use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A book in the catalog
///
/// `discount_price` is the per-book markdown set by the catalog; when present it
/// replaces `price` for cart pricing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    #[schema(example = "Laskar Pelangi")]
    pub title: String,
    #[schema(example = "laskar-pelangi")]
    pub slug: String,
    #[schema(example = "Andrea Hirata")]
    pub author: String,
    pub description: Option<String>,
    /// List price in Rupiah
    #[schema(example = "89000")]
    pub price: Decimal,
    #[schema(example = "79000")]
    pub discount_price: Option<Decimal>,
    #[schema(example = 12)]
    pub stock: i32,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Price a cart line pays for one copy
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Fiksi")]
    pub name: String,
    #[schema(example = "fiksi")]
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Subcategory {
    pub id: Uuid,
    pub category_id: Uuid,
    #[schema(example = "Novel")]
    pub name: String,
    #[schema(example = "novel")]
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Category with its subcategories, as served to the storefront navigation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryTree {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
}

impl CategoryTree {
    /// Group subcategories under their parent categories, keeping category order
    pub fn build(categories: Vec<Category>, subcategories: Vec<Subcategory>) -> Vec<CategoryTree> {
        categories
            .into_iter()
            .map(|category| {
                let children = subcategories
                    .iter()
                    .filter(|sub| sub.category_id == category.id)
                    .cloned()
                    .collect();
                CategoryTree {
                    category,
                    subcategories: children,
                }
            })
            .collect()
    }
}
