use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::cart::aggregate::CartAggregate;
use crate::cart::price_calculator::PriceCalculator;
use crate::catalog::Book;
use crate::money::format_rupiah;

/// One book at a quantity within a cart
///
/// Pricing and stock are a snapshot of the catalog record taken when the cart
/// was read or mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CartLineItem {
    pub id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "20000")]
    pub unit_price: Decimal,
    pub discount_price: Option<Decimal>,
    /// Stock available when the snapshot was taken
    pub stock: i32,
}

impl CartLineItem {
    /// New line for a catalog record
    pub fn for_book(book: &Book, quantity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id: book.id,
            title: book.title.clone(),
            quantity,
            unit_price: book.price,
            discount_price: book.discount_price,
            stock: book.stock,
        }
    }

    /// Refresh the pricing snapshot from the catalog record
    pub fn refresh_from(&mut self, book: &Book) {
        self.title = book.title.clone();
        self.unit_price = book.price;
        self.discount_price = book.discount_price;
        self.stock = book.stock;
    }

    pub fn line_total(&self) -> Decimal {
        PriceCalculator::calculate_line_total(self.quantity, self.unit_price, self.discount_price)
    }
}

/// Cart lifecycle: a cart is either empty or holds at least one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    Empty,
    NonEmpty,
}

/// Request body for adding a book, also used for guest cart items
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CartItemInput {
    pub book_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 1, minimum = 1)]
    pub quantity: i32,
}

/// Request body for changing a line's quantity
///
/// A quantity below 1 removes the line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    #[schema(example = 3)]
    pub quantity: i32,
}

/// Cart as returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartLineItemResponse>,
    pub state: CartState,
    pub total_quantity: i64,
    #[schema(example = "50000")]
    pub subtotal: Decimal,
    #[schema(example = "Rp 50.000")]
    pub subtotal_display: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLineItemResponse {
    #[serde(flatten)]
    pub item: CartLineItem,
    pub line_total: Decimal,
}

impl From<CartAggregate> for CartResponse {
    fn from(cart: CartAggregate) -> Self {
        let subtotal = cart.subtotal();
        let state = cart.state();
        let total_quantity = cart.total_quantity();

        Self {
            items: cart.into_items().into_iter().map(Into::into).collect(),
            state,
            total_quantity,
            subtotal,
            subtotal_display: format_rupiah(subtotal),
        }
    }
}

impl From<CartLineItem> for CartLineItemResponse {
    fn from(item: CartLineItem) -> Self {
        let line_total = item.line_total();
        Self { item, line_total }
    }
}
