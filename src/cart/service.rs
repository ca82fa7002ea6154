use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::cart::{CartAggregate, CartError, CartItemInput, CartRepository};
use crate::catalog::CatalogStore;

/// Service for cart operations
///
/// Authenticated carts are loaded, mutated through `CartAggregate` and saved
/// back; guest carts are built from the submitted items and never stored.
#[derive(Clone)]
pub struct CartService {
    catalog: Arc<dyn CatalogStore>,
    carts: Arc<dyn CartRepository>,
}

impl CartService {
    pub fn new(catalog: Arc<dyn CatalogStore>, carts: Arc<dyn CartRepository>) -> Self {
        Self { catalog, carts }
    }

    /// Load the stored cart of an identity
    pub async fn get_cart(&self, user_id: &str) -> Result<CartAggregate, CartError> {
        let items = self.carts.load(user_id).await?;
        Ok(CartAggregate::with_items(self.catalog.clone(), items))
    }

    pub async fn add_item(
        &self,
        user_id: &str,
        input: CartItemInput,
    ) -> Result<CartAggregate, CartError> {
        input.validate()?;

        let mut cart = self.get_cart(user_id).await?;
        cart.add_item(input.book_id, input.quantity).await?;
        self.carts.save(user_id, cart.items()).await?;

        tracing::info!(
            "User {} added {} x book {} to cart",
            user_id,
            input.quantity,
            input.book_id
        );
        Ok(cart)
    }

    pub async fn set_quantity(
        &self,
        user_id: &str,
        line_id: Uuid,
        quantity: i32,
    ) -> Result<CartAggregate, CartError> {
        let mut cart = self.get_cart(user_id).await?;
        cart.set_quantity(line_id, quantity).await?;
        self.carts.save(user_id, cart.items()).await?;
        Ok(cart)
    }

    pub async fn remove_item(&self, user_id: &str, line_id: Uuid) -> Result<CartAggregate, CartError> {
        let mut cart = self.get_cart(user_id).await?;
        cart.remove_item(line_id)
            .ok_or(CartError::LineNotFound(line_id))?;
        self.carts.save(user_id, cart.items()).await?;
        Ok(cart)
    }

    pub async fn clear(&self, user_id: &str) -> Result<(), CartError> {
        self.carts.clear(user_id).await?;
        tracing::debug!("Cleared cart for user {}", user_id);
        Ok(())
    }

    /// Price a client-held cart
    pub async fn price_items(&self, items: &[CartItemInput]) -> Result<CartAggregate, CartError> {
        for item in items {
            item.validate()?;
        }
        CartAggregate::from_inputs(self.catalog.clone(), items).await
    }
}
