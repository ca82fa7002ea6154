// Discount kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Kind of a discount code
///
/// Determines how `value` on the definition is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `value` is a percentage of the subtotal (10 = 10% off)
    Percentage,

    /// `value` is a Rupiah amount taken off the subtotal
    FixedAmount,

    /// Buy X get Y; currently yields no cart-level amount
    #[sqlx(rename = "buy_x_get_y")]
    #[serde(rename = "buy_x_get_y")]
    BuyXGetY,

    /// Free shipping; currently yields no cart-level amount
    FreeShipping,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percentage => "percentage",
            DiscountKind::FixedAmount => "fixed_amount",
            DiscountKind::BuyXGetY => "buy_x_get_y",
            DiscountKind::FreeShipping => "free_shipping",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DiscountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountKind::Percentage),
            "fixed_amount" => Ok(DiscountKind::FixedAmount),
            "buy_x_get_y" => Ok(DiscountKind::BuyXGetY),
            "free_shipping" => Ok(DiscountKind::FreeShipping),
            _ => Err(format!("Invalid discount kind: {}", s)),
        }
    }
}
