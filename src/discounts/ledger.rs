use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::discounts::error::DiscountError;
use crate::discounts::models::UsageRecord;

/// Record of which identities consumed which discounts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageLedger: Send + Sync {
    async fn exists(&self, identity: &str, discount_id: Uuid) -> Result<bool, DiscountError>;

    /// Insert a usage record; `None` when one already exists for the pair
    async fn insert(
        &self,
        identity: &str,
        discount_id: Uuid,
        order_id: Option<Uuid>,
    ) -> Result<Option<UsageRecord>, DiscountError>;
}

/// PostgreSQL-backed usage ledger over `user_discounts`
#[derive(Clone)]
pub struct PgUsageLedger {
    pool: PgPool,
}

impl PgUsageLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageLedger for PgUsageLedger {
    async fn exists(&self, identity: &str, discount_id: Uuid) -> Result<bool, DiscountError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM user_discounts WHERE user_id = $1 AND discount_id = $2)",
        )
        .bind(identity)
        .bind(discount_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(found)
    }

    async fn insert(
        &self,
        identity: &str,
        discount_id: Uuid,
        order_id: Option<Uuid>,
    ) -> Result<Option<UsageRecord>, DiscountError> {
        let record = sqlx::query_as::<_, UsageRecord>(
            r#"
            INSERT INTO user_discounts (user_id, discount_id, order_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, discount_id) DO NOTHING
            RETURNING id, user_id, discount_id, order_id, used_at
            "#,
        )
        .bind(identity)
        .bind(discount_id)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
