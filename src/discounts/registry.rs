use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::discounts::error::DiscountError;
use crate::discounts::models::{DiscountDefinition, DiscountTarget, DiscountTargets, NewDiscount};

/// System of record for discount definitions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscountRegistry: Send + Sync {
    /// Exact, case-sensitive lookup; returns the definition whatever its window
    async fn get_by_code(&self, code: &str) -> Result<Option<DiscountDefinition>, DiscountError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<DiscountDefinition>, DiscountError>;

    /// All definitions, newest first
    async fn list(&self) -> Result<Vec<DiscountDefinition>, DiscountError>;

    /// Active definitions whose window contains `now`, newest first
    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<DiscountDefinition>, DiscountError>;

    async fn create(&self, discount: NewDiscount) -> Result<DiscountDefinition, DiscountError>;

    /// Persist the editable fields of `definition`; `uses_count` is left untouched
    async fn update(&self, definition: &DiscountDefinition) -> Result<Option<DiscountDefinition>, DiscountError>;

    /// Remove a definition and its target associations
    async fn delete(&self, id: Uuid) -> Result<bool, DiscountError>;

    /// Atomically add one use; false when the cap is reached or the definition is gone
    async fn increment_uses(&self, id: Uuid) -> Result<bool, DiscountError>;

    async fn add_target(&self, id: Uuid, target: DiscountTarget) -> Result<(), DiscountError>;

    async fn remove_target(&self, id: Uuid, target: DiscountTarget) -> Result<bool, DiscountError>;

    async fn list_targets(&self, id: Uuid) -> Result<DiscountTargets, DiscountError>;
}

/// PostgreSQL-backed discount registry
#[derive(Clone)]
pub struct PgDiscountRegistry {
    pool: PgPool,
}

impl PgDiscountRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const DISCOUNT_COLUMNS: &str = "id, code, name, description, kind, value, min_purchase_amount, \
     min_quantity, max_uses, uses_count, start_date, end_date, is_active, created_at, updated_at";

/// Table and column holding one kind of target association
fn target_table(target: DiscountTarget) -> (&'static str, &'static str, Uuid) {
    match target {
        DiscountTarget::Product(id) => ("discount_products", "book_id", id),
        DiscountTarget::Category(id) => ("discount_categories", "category_id", id),
        DiscountTarget::Subcategory(id) => ("discount_subcategories", "subcategory_id", id),
    }
}

#[async_trait]
impl DiscountRegistry for PgDiscountRegistry {
    async fn get_by_code(&self, code: &str) -> Result<Option<DiscountDefinition>, DiscountError> {
        tracing::debug!("Looking up discount code {}", code);

        let discount = sqlx::query_as::<_, DiscountDefinition>(&format!(
            "SELECT {} FROM discounts WHERE code = $1",
            DISCOUNT_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(discount)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<DiscountDefinition>, DiscountError> {
        let discount = sqlx::query_as::<_, DiscountDefinition>(&format!(
            "SELECT {} FROM discounts WHERE id = $1",
            DISCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(discount)
    }

    async fn list(&self) -> Result<Vec<DiscountDefinition>, DiscountError> {
        let discounts = sqlx::query_as::<_, DiscountDefinition>(&format!(
            "SELECT {} FROM discounts ORDER BY created_at DESC",
            DISCOUNT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<DiscountDefinition>, DiscountError> {
        let discounts = sqlx::query_as::<_, DiscountDefinition>(&format!(
            r#"
            SELECT {} FROM discounts
            WHERE is_active = TRUE
              AND start_date <= $1
              AND (end_date IS NULL OR end_date > $1)
            ORDER BY created_at DESC
            "#,
            DISCOUNT_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    async fn create(&self, discount: NewDiscount) -> Result<DiscountDefinition, DiscountError> {
        let created = sqlx::query_as::<_, DiscountDefinition>(&format!(
            r#"
            INSERT INTO discounts (code, name, description, kind, value, min_purchase_amount,
                                   min_quantity, max_uses, uses_count, start_date, end_date, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, $10, $11)
            RETURNING {}
            "#,
            DISCOUNT_COLUMNS
        ))
        .bind(&discount.code)
        .bind(&discount.name)
        .bind(&discount.description)
        .bind(discount.kind)
        .bind(discount.value)
        .bind(discount.min_purchase_amount)
        .bind(discount.min_quantity)
        .bind(discount.max_uses)
        .bind(discount.start_date)
        .bind(discount.end_date)
        .bind(discount.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, definition: &DiscountDefinition) -> Result<Option<DiscountDefinition>, DiscountError> {
        let updated = sqlx::query_as::<_, DiscountDefinition>(&format!(
            r#"
            UPDATE discounts
            SET code = $2, name = $3, description = $4, kind = $5, value = $6,
                min_purchase_amount = $7, min_quantity = $8, max_uses = $9,
                start_date = $10, end_date = $11, is_active = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            DISCOUNT_COLUMNS
        ))
        .bind(definition.id)
        .bind(&definition.code)
        .bind(&definition.name)
        .bind(&definition.description)
        .bind(definition.kind)
        .bind(definition.value)
        .bind(definition.min_purchase_amount)
        .bind(definition.min_quantity)
        .bind(definition.max_uses)
        .bind(definition.start_date)
        .bind(definition.end_date)
        .bind(definition.is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DiscountError> {
        // Target associations go with the definition (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_uses(&self, id: Uuid) -> Result<bool, DiscountError> {
        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET uses_count = uses_count + 1, updated_at = NOW()
            WHERE id = $1 AND (max_uses IS NULL OR uses_count < max_uses)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn add_target(&self, id: Uuid, target: DiscountTarget) -> Result<(), DiscountError> {
        let (table, column, target_id) = target_table(target);

        sqlx::query(&format!(
            "INSERT INTO {} (discount_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            table, column
        ))
        .bind(id)
        .bind(target_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_target(&self, id: Uuid, target: DiscountTarget) -> Result<bool, DiscountError> {
        let (table, column, target_id) = target_table(target);

        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE discount_id = $1 AND {} = $2",
            table, column
        ))
        .bind(id)
        .bind(target_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_targets(&self, id: Uuid) -> Result<DiscountTargets, DiscountError> {
        let product_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT book_id FROM discount_products WHERE discount_id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let category_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT category_id FROM discount_categories WHERE discount_id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let subcategory_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT subcategory_id FROM discount_subcategories WHERE discount_id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(DiscountTargets {
            product_ids,
            category_ids,
            subcategory_ids,
        })
    }
}
