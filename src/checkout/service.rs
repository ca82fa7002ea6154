use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::cart::{CartAggregate, CartError, CartService};
use crate::checkout::{CheckoutError, CheckoutRequest, CheckoutSummary, OrderConfirmation, QuoteRequest};
use crate::discounts::{DiscountConsumer, DiscountDefinition, DiscountEvaluator};

/// Service for checkout summaries and order placement
///
/// Order placement is a stub: it issues an order id, consumes the discount and
/// clears the cart. Payment and inventory are handled elsewhere.
#[derive(Clone)]
pub struct CheckoutService {
    carts: CartService,
    evaluator: DiscountEvaluator,
    consumer: DiscountConsumer,
    shipping_cost: Decimal,
}

impl CheckoutService {
    pub fn new(
        carts: CartService,
        evaluator: DiscountEvaluator,
        consumer: DiscountConsumer,
        shipping_cost: Decimal,
    ) -> Self {
        Self {
            carts,
            evaluator,
            consumer,
            shipping_cost,
        }
    }

    /// Price submitted items, applying an optional code
    ///
    /// Works for guests; `identity` only feeds the already-used check.
    pub async fn quote(
        &self,
        request: QuoteRequest,
        identity: Option<&str>,
    ) -> Result<CheckoutSummary, CheckoutError> {
        request.validate()?;

        let cart = self.carts.price_items(&request.items).await?;
        let discount = self
            .apply_code(&cart, request.code.as_deref(), identity)
            .await?;

        Ok(self.summarize(cart, discount))
    }

    /// Place an order from the stored cart of `user_id`
    pub async fn place_order(
        &self,
        user_id: &str,
        request: CheckoutRequest,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let cart = self.carts.get_cart(user_id).await?;
        if cart.is_empty() {
            return Err(CartError::EmptyCart.into());
        }

        // Re-evaluated here; a quote is not a reservation
        let discount = self
            .apply_code(&cart, request.code.as_deref(), Some(user_id))
            .await?;

        let order_id = Uuid::new_v4();
        if let Some((definition, _)) = &discount {
            self.consumer
                .consume(user_id, definition.id, Some(order_id))
                .await?;
        }

        // The discount is spent; the order stands even if the cart lingers
        if let Err(e) = self.carts.clear(user_id).await {
            tracing::error!("Order {} placed but cart of {} not cleared: {}", order_id, user_id, e);
        }

        let summary = self.summarize(cart, discount);
        tracing::info!(
            "Order {} placed by {} for {}",
            order_id,
            user_id,
            summary.total_display
        );

        Ok(OrderConfirmation { order_id, summary })
    }

    async fn apply_code(
        &self,
        cart: &CartAggregate,
        code: Option<&str>,
        identity: Option<&str>,
    ) -> Result<Option<(DiscountDefinition, Decimal)>, CheckoutError> {
        let Some(code) = code.map(str::trim).filter(|code| !code.is_empty()) else {
            return Ok(None);
        };

        let applied = self
            .evaluator
            .evaluate_cart(code, identity, cart)
            .await?
            .into_result()?;

        Ok(Some(applied))
    }

    fn summarize(
        &self,
        cart: CartAggregate,
        discount: Option<(DiscountDefinition, Decimal)>,
    ) -> CheckoutSummary {
        let (amount, code) = match discount {
            Some((definition, amount)) => (amount, Some(definition.code)),
            None => (Decimal::ZERO, None),
        };
        CheckoutSummary::new(cart, self.shipping_cost, amount, code)
    }
}
