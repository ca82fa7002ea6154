// Discount evaluation
//
// Decides whether a code applies to a cart and for how much. Evaluation only
// reads from the registry and the ledger; consumption lives in `consumption`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

use crate::cart::{CartAggregate, CartLineItem, PriceCalculator};
use crate::discounts::error::DiscountError;
use crate::discounts::ledger::UsageLedger;
use crate::discounts::models::DiscountDefinition;
use crate::discounts::registry::DiscountRegistry;
use crate::discounts::types::DiscountKind;
use crate::money::format_rupiah;

/// Why a code was not admitted, in evaluation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    CodeNotFound,
    NotCurrentlyValid,
    UsageLimitReached,
    BelowMinimumPurchase { minimum: Decimal },
    BelowMinimumQuantity { minimum: i32 },
    AlreadyUsed,
}

impl Rejection {
    /// Machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::CodeNotFound => "DISCOUNT_NOT_FOUND",
            Rejection::NotCurrentlyValid => "DISCOUNT_NOT_ACTIVE",
            Rejection::UsageLimitReached => "DISCOUNT_USAGE_LIMIT_REACHED",
            Rejection::BelowMinimumPurchase { .. } => "MINIMUM_PURCHASE_NOT_MET",
            Rejection::BelowMinimumQuantity { .. } => "MINIMUM_QUANTITY_NOT_MET",
            Rejection::AlreadyUsed => "DISCOUNT_ALREADY_USED",
        }
    }

    /// Exhausted or spent codes; the rest are ordinary customer input
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Rejection::UsageLimitReached | Rejection::AlreadyUsed)
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::CodeNotFound => write!(f, "code not found"),
            Rejection::NotCurrentlyValid => write!(f, "not currently valid"),
            Rejection::UsageLimitReached => write!(f, "usage limit reached"),
            Rejection::BelowMinimumPurchase { minimum } => {
                write!(f, "minimum purchase of {} required", format_rupiah(*minimum))
            }
            Rejection::BelowMinimumQuantity { minimum } => {
                write!(f, "minimum quantity of {} items required", minimum)
            }
            Rejection::AlreadyUsed => write!(f, "already used"),
        }
    }
}

/// Outcome of evaluating one code against one cart
#[derive(Debug, Clone)]
pub struct DiscountEvaluation {
    pub code: String,
    pub admissible: bool,
    /// Present whenever the code matched a definition
    pub definition: Option<DiscountDefinition>,
    /// Clamped to the subtotal; zero when not admissible
    pub amount: Decimal,
    pub rejection: Option<Rejection>,
}

impl DiscountEvaluation {
    fn admitted(code: &str, definition: DiscountDefinition, amount: Decimal) -> Self {
        Self {
            code: code.to_string(),
            admissible: true,
            definition: Some(definition),
            amount,
            rejection: None,
        }
    }

    fn rejected(code: &str, definition: Option<DiscountDefinition>, rejection: Rejection) -> Self {
        Self {
            code: code.to_string(),
            admissible: false,
            definition,
            amount: Decimal::ZERO,
            rejection: Some(rejection),
        }
    }

    /// Human-readable rejection reason
    pub fn reason(&self) -> Option<String> {
        self.rejection.as_ref().map(ToString::to_string)
    }

    /// Admitted definition and amount, or the matching error
    pub fn into_result(self) -> Result<(DiscountDefinition, Decimal), DiscountError> {
        match (self.rejection, self.definition) {
            (Some(Rejection::CodeNotFound), _) => Err(DiscountError::NotFound(self.code)),
            (Some(rejection), _) => Err(DiscountError::Ineligible(rejection)),
            (None, Some(definition)) => Ok((definition, self.amount)),
            (None, None) => Err(DiscountError::NotFound(self.code)),
        }
    }
}

/// Evaluates discount codes against carts
#[derive(Clone)]
pub struct DiscountEvaluator {
    registry: Arc<dyn DiscountRegistry>,
    ledger: Arc<dyn UsageLedger>,
}

impl DiscountEvaluator {
    pub fn new(registry: Arc<dyn DiscountRegistry>, ledger: Arc<dyn UsageLedger>) -> Self {
        Self { registry, ledger }
    }

    /// Evaluate a code for a cart aggregate at the current instant
    pub async fn evaluate_cart(
        &self,
        code: &str,
        identity: Option<&str>,
        cart: &CartAggregate,
    ) -> Result<DiscountEvaluation, DiscountError> {
        self.evaluate(code, identity, cart.items(), cart.subtotal()).await
    }

    /// Evaluate a code at the current instant
    ///
    /// Returns `Err` only when a collaborator fails; every admissibility
    /// failure is an `Ok` evaluation carrying its rejection.
    pub async fn evaluate(
        &self,
        code: &str,
        identity: Option<&str>,
        items: &[CartLineItem],
        subtotal: Decimal,
    ) -> Result<DiscountEvaluation, DiscountError> {
        self.evaluate_at(code, identity, items, subtotal, Utc::now()).await
    }

    /// Evaluate a code at `now`
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// lookup, window, usage cap, minimum purchase, minimum quantity, ledger.
    pub async fn evaluate_at(
        &self,
        code: &str,
        identity: Option<&str>,
        items: &[CartLineItem],
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<DiscountEvaluation, DiscountError> {
        let definition = match self.registry.get_by_code(code).await {
            Ok(Some(definition)) => definition,
            Ok(None) => {
                tracing::debug!("Discount code {} not found", code);
                return Ok(DiscountEvaluation::rejected(code, None, Rejection::CodeNotFound));
            }
            Err(e) => {
                tracing::error!("Discount registry lookup failed for {}: {}", code, e);
                return Err(e);
            }
        };

        if !definition.is_valid_at(now) {
            return Ok(Self::reject(code, definition, Rejection::NotCurrentlyValid));
        }

        if !definition.has_uses_remaining() {
            return Ok(Self::reject(code, definition, Rejection::UsageLimitReached));
        }

        if subtotal < definition.min_purchase_amount {
            let minimum = definition.min_purchase_amount;
            return Ok(Self::reject(code, definition, Rejection::BelowMinimumPurchase { minimum }));
        }

        let total_quantity: i64 = items.iter().map(|item| i64::from(item.quantity)).sum();
        if total_quantity < i64::from(definition.min_quantity) {
            let minimum = definition.min_quantity;
            return Ok(Self::reject(code, definition, Rejection::BelowMinimumQuantity { minimum }));
        }

        // Guests are not checked against the ledger; consumption requires an identity
        if let Some(identity) = identity.filter(|id| !id.trim().is_empty()) {
            let used = self.ledger.exists(identity, definition.id).await.map_err(|e| {
                tracing::error!("Usage ledger lookup failed for {}: {}", code, e);
                e
            })?;
            if used {
                return Ok(Self::reject(code, definition, Rejection::AlreadyUsed));
            }
        }

        let amount = Self::compute_amount(&definition, subtotal);
        tracing::debug!("Discount {} admitted for {}", code, amount);

        Ok(DiscountEvaluation::admitted(code, definition, amount))
    }

    fn reject(code: &str, definition: DiscountDefinition, rejection: Rejection) -> DiscountEvaluation {
        if rejection.is_exhaustion() {
            tracing::warn!("Discount code {} rejected: {}", code, rejection);
        } else {
            tracing::debug!("Discount code {} rejected: {}", code, rejection);
        }
        DiscountEvaluation::rejected(code, Some(definition), rejection)
    }

    /// Amount by kind, clamped to the subtotal
    ///
    /// `buy_x_get_y` and `free_shipping` have no cart-level amount.
    pub fn compute_amount(definition: &DiscountDefinition, subtotal: Decimal) -> Decimal {
        let raw = match definition.kind {
            DiscountKind::Percentage => PriceCalculator::percentage_of(subtotal, definition.value),
            DiscountKind::FixedAmount => definition.value,
            DiscountKind::BuyXGetY | DiscountKind::FreeShipping => Decimal::ZERO,
        };
        PriceCalculator::clamp_discount(raw, subtotal)
    }
}
