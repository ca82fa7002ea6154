use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;

const BOOK_COLUMNS: &str = "b.id, b.title, b.slug, b.author, b.description, b.price, \
     b.discount_price, b.stock, b.cover_image, b.created_at, b.updated_at";

/// Price a listing filters and sorts on: the markdown when present
const EFFECTIVE_PRICE: &str = "COALESCE(b.discount_price, b.price)";

/// SQL query builder for the book listing
/// Builds a single parameterized query with filters, sorting, and pagination
pub struct BookQueryBuilder {
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_clause: String,
    limit: u32,
    offset: u32,
}

impl Default for BookQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BookQueryBuilder {
    /// Creates a new builder listing newest books first
    pub fn new() -> Self {
        Self {
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_clause: "b.created_at DESC".to_string(),
            limit: 10,
            offset: 0,
        }
    }

    fn next_param(&mut self, value: String) -> usize {
        self.params.push(value);
        self.params.len()
    }

    /// Partial, case-insensitive match on title or author
    pub fn add_search_filter(&mut self, search: &str) {
        let index = self.next_param(format!("%{}%", search));
        self.where_clauses
            .push(format!("(b.title ILIKE ${0} OR b.author ILIKE ${0})", index));
    }

    /// Books linked to the category with this slug
    pub fn add_category_filter(&mut self, slug: &str) {
        let index = self.next_param(slug.to_string());
        self.where_clauses.push(format!(
            "EXISTS (SELECT 1 FROM book_categories bc JOIN categories c ON c.id = bc.category_id \
             WHERE bc.book_id = b.id AND c.slug = ${})",
            index
        ));
    }

    /// Books linked to the subcategory with this slug
    pub fn add_subcategory_filter(&mut self, slug: &str) {
        let index = self.next_param(slug.to_string());
        self.where_clauses.push(format!(
            "EXISTS (SELECT 1 FROM book_subcategories bs JOIN subcategories s ON s.id = bs.subcategory_id \
             WHERE bs.book_id = b.id AND s.slug = ${})",
            index
        ));
    }

    /// Adds effective price bounds; both are inclusive
    pub fn add_price_range(&mut self, min: Option<Decimal>, max: Option<Decimal>) {
        if let Some(min_price) = min {
            let index = self.next_param(min_price.to_string());
            self.where_clauses
                .push(format!("{} >= ${}::numeric", EFFECTIVE_PRICE, index));
        }

        if let Some(max_price) = max {
            let index = self.next_param(max_price.to_string());
            self.where_clauses
                .push(format!("{} <= ${}::numeric", EFFECTIVE_PRICE, index));
        }
    }

    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        let field_name = match field {
            SortField::Price => EFFECTIVE_PRICE,
            SortField::Title => "b.title",
            SortField::Newest => "b.created_at",
        };

        let order_str = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        // Tie-break on id so pages are stable
        self.order_clause = format!("{} {}, b.id ASC", field_name, order_str);
    }

    /// Calculates LIMIT and OFFSET from a 1-indexed page
    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = page.saturating_sub(1).saturating_mul(limit);
    }

    /// Builds the final SQL and its text parameters, in binding order
    pub fn build(&self) -> (String, Vec<String>) {
        let mut query = format!("SELECT {} FROM books b", BOOK_COLUMNS);

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        query.push_str(" ORDER BY ");
        query.push_str(&self.order_clause);

        // LIMIT and OFFSET are validated integers, inlined rather than bound
        query.push_str(&format!(" LIMIT {} OFFSET {}", self.limit, self.offset));

        (query, self.params.clone())
    }

    /// Builder preloaded from a validated filter
    pub fn from_filter(filter: &BookFilter) -> Self {
        let mut builder = Self::new();

        if let Some(ref search) = filter.search {
            builder.add_search_filter(search);
        }
        if let Some(ref category) = filter.category {
            builder.add_category_filter(category);
        }
        if let Some(ref subcategory) = filter.subcategory {
            builder.add_subcategory_filter(subcategory);
        }
        builder.add_price_range(filter.min_price, filter.max_price);
        builder.set_sort(filter.sort_field, filter.sort_order);
        builder.set_pagination(filter.page, filter.limit);

        builder
    }
}

/// Query parameters accepted by `GET /api/books`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQueryParams {
    /// Partial title or author match
    pub search: Option<String>,
    /// Category slug
    pub category: Option<String>,
    /// Subcategory slug
    pub subcategory: Option<String>,
    /// Minimum effective price (inclusive)
    pub min_price: Option<Decimal>,
    /// Maximum effective price (inclusive)
    pub max_price: Option<Decimal>,
    /// "price", "title" or "newest"
    pub sort: Option<String>,
    /// "asc" or "desc"
    pub order: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 10, at most 100)
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Title,
    Newest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated and normalized listing filter
#[derive(Debug, Clone)]
pub struct BookFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl Default for BookFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            subcategory: None,
            min_price: None,
            max_price: None,
            sort_field: SortField::Newest,
            sort_order: SortOrder::Desc,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// Validation error type
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct QueryValidationError {
    pub message: String,
}

impl QueryValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Query parameter validator
pub struct BookQueryValidator;

impl BookQueryValidator {
    /// Validates and normalizes query parameters, applying defaults
    pub fn validate(params: BookQueryParams) -> Result<BookFilter, QueryValidationError> {
        let search = Self::normalize_string(params.search);
        let category = Self::normalize_string(params.category).map(|s| s.to_lowercase());
        let subcategory = Self::normalize_string(params.subcategory).map(|s| s.to_lowercase());

        if let Some(price) = params.min_price {
            Self::validate_price(price, "min_price")?;
        }
        if let Some(price) = params.max_price {
            Self::validate_price(price, "max_price")?;
        }
        if let (Some(min), Some(max)) = (params.min_price, params.max_price) {
            if min > max {
                return Err(QueryValidationError::new(
                    "min_price cannot be greater than max_price",
                ));
            }
        }

        let sort_field = match params.sort {
            Some(ref sort_str) => Self::parse_sort_field(sort_str)?,
            None => SortField::Newest,
        };

        // Default order depends on sort field
        let sort_order = match params.order {
            Some(ref order_str) => Self::parse_sort_order(order_str)?,
            None => match sort_field {
                SortField::Price | SortField::Title => SortOrder::Asc,
                SortField::Newest => SortOrder::Desc,
            },
        };

        let page = match params.page {
            Some(p) => Self::validate_pagination_param(p, "page")?,
            None => 1,
        };

        let limit = match params.limit {
            Some(l) => Self::validate_pagination_param(l, "limit")?.min(MAX_LIMIT),
            None => DEFAULT_LIMIT,
        };

        Ok(BookFilter {
            search,
            category,
            subcategory,
            min_price: params.min_price,
            max_price: params.max_price,
            sort_field,
            sort_order,
            page,
            limit,
        })
    }

    /// Trims whitespace; empty strings become None
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    fn validate_price(price: Decimal, param_name: &str) -> Result<(), QueryValidationError> {
        if price.is_sign_negative() {
            return Err(QueryValidationError::new(format!(
                "{} must not be negative",
                param_name
            )));
        }
        Ok(())
    }

    fn parse_sort_field(s: &str) -> Result<SortField, QueryValidationError> {
        match s.to_lowercase().as_str() {
            "price" => Ok(SortField::Price),
            "title" => Ok(SortField::Title),
            "newest" => Ok(SortField::Newest),
            _ => Err(QueryValidationError::new(format!(
                "Invalid sort field '{}'. Must be 'price', 'title' or 'newest'",
                s
            ))),
        }
    }

    fn parse_sort_order(s: &str) -> Result<SortOrder, QueryValidationError> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(QueryValidationError::new(format!(
                "Invalid sort order '{}'. Must be 'asc' or 'desc'",
                s
            ))),
        }
    }

    /// Page and limit must be greater than zero
    fn validate_pagination_param(value: u32, param_name: &str) -> Result<u32, QueryValidationError> {
        if value == 0 {
            return Err(QueryValidationError::new(format!(
                "{} must be a positive number (greater than 0)",
                param_name
            )));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_default_lists_newest_first() {
        let (query, params) = BookQueryBuilder::new().build();

        assert!(query.starts_with("SELECT b.id, b.title"));
        assert!(query.contains("FROM books b"));
        assert!(!query.contains("WHERE"));
        assert!(query.contains("ORDER BY b.created_at DESC"));
        assert!(query.ends_with("LIMIT 10 OFFSET 0"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_builder_search_matches_title_and_author() {
        let mut builder = BookQueryBuilder::new();
        builder.add_search_filter("tere liye");
        let (query, params) = builder.build();

        assert!(query.contains("(b.title ILIKE $1 OR b.author ILIKE $1)"));
        assert_eq!(params, vec!["%tere liye%".to_string()]);
    }

    #[test]
    fn test_builder_price_range_uses_effective_price() {
        let mut builder = BookQueryBuilder::new();
        builder.add_price_range(Some(dec!(50000)), Some(dec!(100000)));
        let (query, params) = builder.build();

        assert!(query.contains("COALESCE(b.discount_price, b.price) >= $1::numeric"));
        assert!(query.contains("COALESCE(b.discount_price, b.price) <= $2::numeric"));
        assert_eq!(params, vec!["50000".to_string(), "100000".to_string()]);
    }

    #[test]
    fn test_builder_combined_filters_number_params_in_order() {
        let mut builder = BookQueryBuilder::new();
        builder.add_search_filter("pelangi");
        builder.add_category_filter("fiksi");
        builder.add_subcategory_filter("novel");
        builder.add_price_range(None, Some(dec!(90000)));
        builder.set_sort(SortField::Price, SortOrder::Asc);
        builder.set_pagination(3, 20);

        let (query, params) = builder.build();

        assert!(query.contains("c.slug = $2"));
        assert!(query.contains("s.slug = $3"));
        assert!(query.contains("<= $4::numeric"));
        assert!(query.contains(" AND "));
        assert!(query.contains("ORDER BY COALESCE(b.discount_price, b.price) ASC, b.id ASC"));
        assert!(query.contains("LIMIT 20 OFFSET 40"));
        assert_eq!(params.len(), 4);
        assert_eq!(params[1], "fiksi");
    }

    #[test]
    fn test_validator_defaults() {
        let filter = BookQueryValidator::validate(BookQueryParams::default()).unwrap();

        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 10);
        assert_eq!(filter.sort_field, SortField::Newest);
        assert_eq!(filter.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_validator_normalizes_strings() {
        let filter = BookQueryValidator::validate(BookQueryParams {
            search: Some("   ".to_string()),
            category: Some("  Fiksi ".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert!(filter.search.is_none());
        assert_eq!(filter.category.as_deref(), Some("fiksi"));
    }

    #[test]
    fn test_validator_rejects_inverted_price_range() {
        let result = BookQueryValidator::validate(BookQueryParams {
            min_price: Some(dec!(100000)),
            max_price: Some(dec!(50000)),
            ..Default::default()
        });

        assert_eq!(
            result.unwrap_err().message,
            "min_price cannot be greater than max_price"
        );
    }

    #[test]
    fn test_validator_rejects_negative_price() {
        let result = BookQueryValidator::validate(BookQueryParams {
            min_price: Some(dec!(-1)),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validator_sort_defaults_by_field() {
        let filter = BookQueryValidator::validate(BookQueryParams {
            sort: Some("PRICE".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.sort_field, SortField::Price);
        assert_eq!(filter.sort_order, SortOrder::Asc);

        let result = BookQueryValidator::validate(BookQueryParams {
            sort: Some("rating".to_string()),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validator_pagination() {
        assert!(BookQueryValidator::validate(BookQueryParams {
            page: Some(0),
            ..Default::default()
        })
        .is_err());

        let filter = BookQueryValidator::validate(BookQueryParams {
            limit: Some(500),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.limit, 100);
    }
}
