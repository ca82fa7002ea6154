// In-memory collaborators
//
// Implementations of the storage traits backed by process memory, plus fixtures
// for the test suites.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cart::{CartError, CartLineItem, CartRepository};
use crate::catalog::{Book, BookFilter, CatalogError, CatalogStore, Category, SortField, SortOrder, Subcategory};
use crate::discounts::{
    DiscountDefinition, DiscountError, DiscountKind, DiscountRegistry, DiscountTarget,
    DiscountTargets, NewDiscount, UsageLedger, UsageRecord,
};

/// Book fixture with a slug derived from the title
pub fn sample_book(title: &str, price: Decimal, discount_price: Option<Decimal>, stock: i32) -> Book {
    let now = Utc::now();
    Book {
        id: Uuid::new_v4(),
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        author: "Pramoedya Ananta Toer".to_string(),
        description: None,
        price,
        discount_price,
        stock,
        cover_image: None,
        created_at: now,
        updated_at: now,
    }
}

/// Active, open-ended, uncapped discount that started a day ago
pub fn sample_discount(code: &str, kind: DiscountKind, value: Decimal) -> DiscountDefinition {
    let now = Utc::now();
    DiscountDefinition {
        id: Uuid::new_v4(),
        code: code.to_string(),
        name: format!("{} promo", code),
        description: None,
        kind,
        value,
        min_purchase_amount: Decimal::ZERO,
        min_quantity: 1,
        max_uses: None,
        uses_count: 0,
        start_date: now - chrono::Duration::days(1),
        end_date: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct InMemoryCatalog {
    books: RwLock<Vec<Book>>,
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    /// Book id to the category and subcategory slugs it is listed under
    listings: HashMap<Uuid, Vec<String>>,
}

impl InMemoryCatalog {
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: RwLock::new(books),
            ..Default::default()
        }
    }

    /// List `book_ids` under a category
    pub fn with_category(mut self, category: Category, book_ids: &[Uuid]) -> Self {
        self.list_under(&category.slug, book_ids);
        self.categories.push(category);
        self
    }

    /// List `book_ids` under a subcategory
    pub fn with_subcategory(mut self, subcategory: Subcategory, book_ids: &[Uuid]) -> Self {
        self.list_under(&subcategory.slug, book_ids);
        self.subcategories.push(subcategory);
        self
    }

    fn list_under(&mut self, slug: &str, book_ids: &[Uuid]) {
        for id in book_ids {
            self.listings.entry(*id).or_default().push(slug.to_string());
        }
    }

    fn is_listed_under(&self, book_id: Uuid, slug: &str) -> bool {
        self.listings
            .get(&book_id)
            .map_or(false, |slugs| slugs.iter().any(|s| s == slug))
    }

    fn matches(&self, book: &Book, filter: &BookFilter) -> bool {
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            if !book.title.to_lowercase().contains(&needle)
                && !book.author.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(category) = &filter.category {
            if !self.is_listed_under(book.id, category) {
                return false;
            }
        }
        if let Some(subcategory) = &filter.subcategory {
            if !self.is_listed_under(book.id, subcategory) {
                return false;
            }
        }
        let price = book.effective_price();
        filter.min_price.map_or(true, |min| price >= min)
            && filter.max_price.map_or(true, |max| price <= max)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Book>, CatalogError> {
        let books = self.books.read().await;
        Ok(books.iter().find(|book| book.id == id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Book>, CatalogError> {
        let books = self.books.read().await;
        Ok(books.iter().find(|book| book.slug == slug).cloned())
    }

    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, CatalogError> {
        let books = self.books.read().await;
        let mut matching: Vec<Book> = books
            .iter()
            .filter(|book| self.matches(book, filter))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = match filter.sort_field {
                SortField::Price => a.effective_price().cmp(&b.effective_price()),
                SortField::Title => a.title.cmp(&b.title),
                SortField::Newest => a.created_at.cmp(&b.created_at),
            };
            match filter.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let offset = (filter.page.saturating_sub(1) * filter.limit) as usize;
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(filter.limit as usize)
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.categories.clone())
    }

    async fn list_subcategories(&self) -> Result<Vec<Subcategory>, CatalogError> {
        Ok(self.subcategories.clone())
    }
}

#[derive(Default)]
pub struct InMemoryCartRepository {
    carts: RwLock<HashMap<String, Vec<CartLineItem>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn load(&self, user_id: &str) -> Result<Vec<CartLineItem>, CartError> {
        let carts = self.carts.read().await;
        Ok(carts.get(user_id).cloned().unwrap_or_default())
    }

    async fn save(&self, user_id: &str, items: &[CartLineItem]) -> Result<(), CartError> {
        let mut carts = self.carts.write().await;
        carts.insert(user_id.to_string(), items.to_vec());
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> Result<(), CartError> {
        let mut carts = self.carts.write().await;
        carts.remove(user_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryDiscountRegistry {
    discounts: RwLock<Vec<DiscountDefinition>>,
    targets: RwLock<HashMap<Uuid, DiscountTargets>>,
}

impl InMemoryDiscountRegistry {
    pub fn with_discounts(discounts: Vec<DiscountDefinition>) -> Self {
        Self {
            discounts: RwLock::new(discounts),
            ..Default::default()
        }
    }
}

fn newest_first(mut discounts: Vec<DiscountDefinition>) -> Vec<DiscountDefinition> {
    discounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    discounts
}

#[async_trait]
impl DiscountRegistry for InMemoryDiscountRegistry {
    async fn get_by_code(&self, code: &str) -> Result<Option<DiscountDefinition>, DiscountError> {
        let discounts = self.discounts.read().await;
        Ok(discounts.iter().find(|d| d.code == code).cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<DiscountDefinition>, DiscountError> {
        let discounts = self.discounts.read().await;
        Ok(discounts.iter().find(|d| d.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<DiscountDefinition>, DiscountError> {
        let discounts = self.discounts.read().await;
        Ok(newest_first(discounts.clone()))
    }

    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<DiscountDefinition>, DiscountError> {
        let discounts = self.discounts.read().await;
        Ok(newest_first(
            discounts.iter().filter(|d| d.is_valid_at(now)).cloned().collect(),
        ))
    }

    async fn create(&self, discount: NewDiscount) -> Result<DiscountDefinition, DiscountError> {
        let mut discounts = self.discounts.write().await;
        if discounts.iter().any(|d| d.code == discount.code) {
            return Err(DiscountError::Conflict(
                "A discount with this code already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let created = DiscountDefinition {
            id: Uuid::new_v4(),
            code: discount.code,
            name: discount.name,
            description: discount.description,
            kind: discount.kind,
            value: discount.value,
            min_purchase_amount: discount.min_purchase_amount,
            min_quantity: discount.min_quantity,
            max_uses: discount.max_uses,
            uses_count: 0,
            start_date: discount.start_date,
            end_date: discount.end_date,
            is_active: discount.is_active,
            created_at: now,
            updated_at: now,
        };
        discounts.push(created.clone());
        Ok(created)
    }

    async fn update(&self, definition: &DiscountDefinition) -> Result<Option<DiscountDefinition>, DiscountError> {
        let mut discounts = self.discounts.write().await;
        if discounts
            .iter()
            .any(|d| d.code == definition.code && d.id != definition.id)
        {
            return Err(DiscountError::Conflict(
                "A discount with this code already exists".to_string(),
            ));
        }

        let Some(stored) = discounts.iter_mut().find(|d| d.id == definition.id) else {
            return Ok(None);
        };
        let uses_count = stored.uses_count;
        let created_at = stored.created_at;
        *stored = DiscountDefinition {
            uses_count,
            created_at,
            updated_at: Utc::now(),
            ..definition.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DiscountError> {
        let mut discounts = self.discounts.write().await;
        let before = discounts.len();
        discounts.retain(|d| d.id != id);
        self.targets.write().await.remove(&id);
        Ok(discounts.len() < before)
    }

    async fn increment_uses(&self, id: Uuid) -> Result<bool, DiscountError> {
        let mut discounts = self.discounts.write().await;
        match discounts.iter_mut().find(|d| d.id == id) {
            Some(discount) if discount.has_uses_remaining() => {
                discount.uses_count += 1;
                discount.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_target(&self, id: Uuid, target: DiscountTarget) -> Result<(), DiscountError> {
        let mut targets = self.targets.write().await;
        let entry = targets.entry(id).or_default();
        let (ids, target_id) = match target {
            DiscountTarget::Product(t) => (&mut entry.product_ids, t),
            DiscountTarget::Category(t) => (&mut entry.category_ids, t),
            DiscountTarget::Subcategory(t) => (&mut entry.subcategory_ids, t),
        };
        if !ids.contains(&target_id) {
            ids.push(target_id);
        }
        Ok(())
    }

    async fn remove_target(&self, id: Uuid, target: DiscountTarget) -> Result<bool, DiscountError> {
        let mut targets = self.targets.write().await;
        let Some(entry) = targets.get_mut(&id) else {
            return Ok(false);
        };
        let (ids, target_id) = match target {
            DiscountTarget::Product(t) => (&mut entry.product_ids, t),
            DiscountTarget::Category(t) => (&mut entry.category_ids, t),
            DiscountTarget::Subcategory(t) => (&mut entry.subcategory_ids, t),
        };
        let before = ids.len();
        ids.retain(|existing| *existing != target_id);
        Ok(ids.len() < before)
    }

    async fn list_targets(&self, id: Uuid) -> Result<DiscountTargets, DiscountError> {
        let targets = self.targets.read().await;
        Ok(targets.get(&id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryUsageLedger {
    records: RwLock<Vec<UsageRecord>>,
}

impl InMemoryUsageLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageLedger for InMemoryUsageLedger {
    async fn exists(&self, identity: &str, discount_id: Uuid) -> Result<bool, DiscountError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .any(|r| r.user_id == identity && r.discount_id == discount_id))
    }

    async fn insert(
        &self,
        identity: &str,
        discount_id: Uuid,
        order_id: Option<Uuid>,
    ) -> Result<Option<UsageRecord>, DiscountError> {
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| r.user_id == identity && r.discount_id == discount_id)
        {
            return Ok(None);
        }

        let record = UsageRecord {
            id: Uuid::new_v4(),
            user_id: identity.to_string(),
            discount_id,
            order_id,
            used_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn category(slug: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: slug.to_string(),
            slug: slug.to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_catalog_filters_and_sorts() {
        let cheap = sample_book("Bumi Manusia", dec!(30000), None, 5);
        let marked_down = sample_book("Anak Semua Bangsa", dec!(90000), Some(dec!(45000)), 5);
        let pricey = sample_book("Rumah Kaca", dec!(120000), None, 5);
        let catalog = InMemoryCatalog::with_books(vec![cheap.clone(), marked_down.clone(), pricey.clone()])
            .with_category(category("fiksi"), &[cheap.id, marked_down.id]);

        let filter = BookFilter {
            category: Some("fiksi".to_string()),
            sort_field: SortField::Price,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        let books = catalog.list(&filter).await.unwrap();
        let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Anak Semua Bangsa", "Bumi Manusia"]);

        let filter = BookFilter {
            max_price: Some(dec!(50000)),
            ..Default::default()
        };
        assert_eq!(catalog.list(&filter).await.unwrap().len(), 2);

        let filter = BookFilter {
            search: Some("kaca".to_string()),
            ..Default::default()
        };
        assert_eq!(catalog.list(&filter).await.unwrap()[0].id, pricey.id);
    }

    #[tokio::test]
    async fn test_catalog_pagination() {
        let books: Vec<Book> = (0..5)
            .map(|n| sample_book(&format!("Book {}", n), dec!(10000), None, 1))
            .collect();
        let catalog = InMemoryCatalog::with_books(books);

        let filter = BookFilter {
            sort_field: SortField::Title,
            sort_order: SortOrder::Asc,
            page: 2,
            limit: 2,
            ..Default::default()
        };
        let page: Vec<String> = catalog
            .list(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();

        assert_eq!(page, vec!["Book 2", "Book 3"]);
    }

    #[tokio::test]
    async fn test_ledger_insert_is_idempotent_per_pair() {
        let ledger = InMemoryUsageLedger::new();
        let discount_id = Uuid::new_v4();

        assert!(ledger.insert("reader-1", discount_id, None).await.unwrap().is_some());
        assert!(ledger.insert("reader-1", discount_id, None).await.unwrap().is_none());
        assert!(ledger.insert("reader-2", discount_id, None).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_registry_update_keeps_uses_count() {
        let mut discount = sample_discount("SUMMER10", DiscountKind::Percentage, dec!(10));
        discount.uses_count = 4;
        let registry = InMemoryDiscountRegistry::with_discounts(vec![discount.clone()]);

        let mut edited = discount.clone();
        edited.uses_count = 0;
        edited.value = dec!(20);
        let updated = registry.update(&edited).await.unwrap().unwrap();

        assert_eq!(updated.uses_count, 4);
        assert_eq!(updated.value, dec!(20));
    }
}
