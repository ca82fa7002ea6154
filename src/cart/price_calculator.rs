use rust_decimal::Decimal;

/// Arithmetic for cart and checkout amounts
///
/// Amounts stay exact; rounding to whole Rupiah only happens for display.
pub struct PriceCalculator;

impl PriceCalculator {
    /// Price one copy sells for: the catalog markdown when present, otherwise list price
    pub fn effective_unit_price(unit_price: Decimal, discount_price: Option<Decimal>) -> Decimal {
        discount_price.unwrap_or(unit_price)
    }

    /// Subtotal for a cart line
    ///
    /// # Arguments
    /// * `quantity` - Number of copies
    /// * `unit_price` - List price per copy
    /// * `discount_price` - Per-book markdown, if the catalog carries one
    pub fn calculate_line_total(
        quantity: i32,
        unit_price: Decimal,
        discount_price: Option<Decimal>,
    ) -> Decimal {
        Decimal::from(quantity) * Self::effective_unit_price(unit_price, discount_price)
    }

    /// Sum of line subtotals
    pub fn calculate_total(subtotals: &[Decimal]) -> Decimal {
        subtotals.iter().sum()
    }

    /// `subtotal * percent / 100`, unclamped
    pub fn percentage_of(subtotal: Decimal, percent: Decimal) -> Decimal {
        subtotal * percent / Decimal::ONE_HUNDRED
    }

    /// A code discount never exceeds the subtotal it applies to
    pub fn clamp_discount(amount: Decimal, subtotal: Decimal) -> Decimal {
        amount.min(subtotal).max(Decimal::ZERO)
    }

    /// Amount payable at checkout: `subtotal + shipping - discount`, floored at zero
    pub fn calculate_payable(subtotal: Decimal, shipping: Decimal, discount: Decimal) -> Decimal {
        (subtotal + shipping - discount).max(Decimal::ZERO)
    }
}
