use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cart::error::CartError;
use crate::cart::models::CartLineItem;

/// Server-side storage for carts of authenticated identities
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Lines in insertion order with a fresh catalog snapshot; empty when no cart exists
    async fn load(&self, user_id: &str) -> Result<Vec<CartLineItem>, CartError>;

    /// Replace the stored lines with `items`, atomically
    async fn save(&self, user_id: &str, items: &[CartLineItem]) -> Result<(), CartError>;

    async fn clear(&self, user_id: &str) -> Result<(), CartError>;
}

/// Repository for cart persistence
#[derive(Clone)]
pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn load(&self, user_id: &str) -> Result<Vec<CartLineItem>, CartError> {
        let items = sqlx::query_as::<_, CartLineItem>(
            r#"
            SELECT ci.id, ci.book_id, b.title, ci.quantity,
                   b.price AS unit_price, b.discount_price, b.stock
            FROM cart_items ci
            JOIN carts c ON c.id = ci.cart_id
            JOIN books b ON b.id = ci.book_id
            WHERE c.user_id = $1
            ORDER BY ci.position ASC, ci.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn save(&self, user_id: &str, items: &[CartLineItem]) -> Result<(), CartError> {
        let mut tx = self.pool.begin().await?;

        let cart_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO carts (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let keep: Vec<Uuid> = items.iter().map(|item| item.id).collect();

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND NOT (id = ANY($2))")
            .bind(cart_id)
            .bind(&keep)
            .execute(&mut *tx)
            .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_items (id, cart_id, book_id, quantity, position)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO UPDATE
                SET quantity = EXCLUDED.quantity,
                    position = EXCLUDED.position,
                    updated_at = NOW()
                "#,
            )
            .bind(item.id)
            .bind(cart_id)
            .bind(item.book_id)
            .bind(item.quantity)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!("Saved cart for user {} with {} lines", user_id, items.len());
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> Result<(), CartError> {
        sqlx::query(
            r#"
            DELETE FROM cart_items
            USING carts
            WHERE cart_items.cart_id = carts.id AND carts.user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
