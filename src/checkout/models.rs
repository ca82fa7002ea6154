use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::cart::{CartAggregate, CartItemInput, CartLineItemResponse, PriceCalculator};
use crate::money::format_rupiah;

/// Request body for POST /api/cart/quote
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct QuoteRequest {
    #[validate]
    pub items: Vec<CartItemInput>,
    /// Optional discount code to apply
    #[schema(example = "SUMMER10")]
    pub code: Option<String>,
}

/// Request body for POST /api/checkout
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[schema(example = "SUMMER10")]
    pub code: Option<String>,
}

/// Priced cart ready for payment
///
/// `total = subtotal + shipping_cost - discount_amount`, floored at zero.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckoutSummary {
    pub items: Vec<CartLineItemResponse>,
    #[schema(example = "100000")]
    pub subtotal: Decimal,
    #[schema(example = "15000")]
    pub shipping_cost: Decimal,
    #[schema(example = "10000")]
    pub discount_amount: Decimal,
    #[schema(example = "105000")]
    pub total: Decimal,
    /// Code that was applied, if any
    pub discount_code: Option<String>,
    #[schema(example = "Rp 100.000")]
    pub subtotal_display: String,
    #[schema(example = "Rp 15.000")]
    pub shipping_cost_display: String,
    #[schema(example = "Rp 10.000")]
    pub discount_amount_display: String,
    #[schema(example = "Rp 105.000")]
    pub total_display: String,
}

impl CheckoutSummary {
    pub fn new(
        cart: CartAggregate,
        shipping_cost: Decimal,
        discount_amount: Decimal,
        discount_code: Option<String>,
    ) -> Self {
        let subtotal = cart.subtotal();
        let total = PriceCalculator::calculate_payable(subtotal, shipping_cost, discount_amount);

        Self {
            items: cart.into_items().into_iter().map(Into::into).collect(),
            subtotal,
            shipping_cost,
            discount_amount,
            total,
            discount_code,
            subtotal_display: format_rupiah(subtotal),
            shipping_cost_display: format_rupiah(shipping_cost),
            discount_amount_display: format_rupiah(discount_amount),
            total_display: format_rupiah(total),
        }
    }
}

/// Result of POST /api/checkout
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderConfirmation {
    pub order_id: Uuid,
    pub summary: CheckoutSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCatalog;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_summary_totals() {
        let cart = CartAggregate::new(Arc::new(InMemoryCatalog::default()));

        let summary = CheckoutSummary::new(cart, dec!(15000), Decimal::ZERO, None);

        assert!(summary.items.is_empty());
        assert_eq!(summary.subtotal, Decimal::ZERO);
        assert_eq!(summary.total, dec!(15000));
        assert_eq!(summary.total_display, "Rp 15.000");
    }

    #[test]
    fn test_checkout_request_code_is_optional() {
        let request: CheckoutRequest = serde_json::from_str("{}").unwrap();
        assert!(request.code.is_none());

        let request: CheckoutRequest = serde_json::from_str(r#"{"code":"SUMMER10"}"#).unwrap();
        assert_eq!(request.code.as_deref(), Some("SUMMER10"));
    }
}
