use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::cart::error::CartError;
use crate::cart::models::{CartItemInput, CartLineItem, CartState};
use crate::cart::price_calculator::PriceCalculator;
use crate::catalog::{Book, CatalogStore};

/// Line items of one cart, kept in insertion order
///
/// Every mutation that can grow a line re-reads the catalog record so the
/// stock check and the pricing snapshot reflect the catalog at that moment.
pub struct CartAggregate {
    catalog: Arc<dyn CatalogStore>,
    items: Vec<CartLineItem>,
}

impl CartAggregate {
    /// Empty cart
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog,
            items: Vec::new(),
        }
    }

    /// Cart restored from persisted lines
    pub fn with_items(catalog: Arc<dyn CatalogStore>, items: Vec<CartLineItem>) -> Self {
        Self { catalog, items }
    }

    /// Build a cart from client-held items, applying the same checks as `add_item`
    pub async fn from_inputs(
        catalog: Arc<dyn CatalogStore>,
        inputs: &[CartItemInput],
    ) -> Result<Self, CartError> {
        let mut cart = Self::new(catalog);
        for input in inputs {
            cart.add_item(input.book_id, input.quantity).await?;
        }
        Ok(cart)
    }

    async fn fetch_book(&self, book_id: Uuid) -> Result<Book, CartError> {
        self.catalog
            .get_by_id(book_id)
            .await?
            .ok_or(CartError::BookNotFound(book_id))
    }

    /// Add copies of a book, merging into an existing line for the same book
    ///
    /// Fails without changing the cart when the book is unknown or the combined
    /// quantity would exceed the available stock.
    pub async fn add_item(&mut self, book_id: Uuid, quantity: i32) -> Result<&CartLineItem, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let book = self.fetch_book(book_id).await?;

        let position = self.items.iter().position(|item| item.book_id == book_id);
        let existing = position.map(|index| self.items[index].quantity).unwrap_or(0);
        let requested = existing.saturating_add(quantity);

        if requested > book.stock {
            tracing::debug!(
                "Rejecting add of book {}: requested {}, stock {}",
                book_id,
                requested,
                book.stock
            );
            return Err(CartError::InsufficientStock {
                book_id,
                available: book.stock,
                requested,
            });
        }

        let index = match position {
            Some(index) => {
                let line = &mut self.items[index];
                line.quantity = requested;
                line.refresh_from(&book);
                index
            }
            None => {
                self.items.push(CartLineItem::for_book(&book, quantity));
                self.items.len() - 1
            }
        };

        Ok(&self.items[index])
    }

    /// Change a line's quantity in place; below 1 removes the line
    pub async fn set_quantity(&mut self, line_id: Uuid, quantity: i32) -> Result<(), CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == line_id)
            .ok_or(CartError::LineNotFound(line_id))?;

        if quantity < 1 {
            self.items.remove(index);
            return Ok(());
        }

        let book_id = self.items[index].book_id;
        let book = self.fetch_book(book_id).await?;

        if quantity > book.stock {
            return Err(CartError::InsufficientStock {
                book_id,
                available: book.stock,
                requested: quantity,
            });
        }

        let line = &mut self.items[index];
        line.quantity = quantity;
        line.refresh_from(&book);
        Ok(())
    }

    /// Remove a line, returning it if it was present
    pub fn remove_item(&mut self, line_id: Uuid) -> Option<CartLineItem> {
        let index = self.items.iter().position(|item| item.id == line_id)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `Σ (discount_price ?? unit_price) * quantity`
    pub fn subtotal(&self) -> Decimal {
        let subtotals: Vec<Decimal> = self.items.iter().map(CartLineItem::line_total).collect();
        PriceCalculator::calculate_total(&subtotals)
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn state(&self) -> CartState {
        if self.items.is_empty() {
            CartState::Empty
        } else {
            CartState::NonEmpty
        }
    }
}
