// Currency helpers
// Amounts are Indonesian Rupiah held as `Decimal`; display drops fractional subunits

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount the way the storefront shows prices: `Rp 1.250.000`
///
/// Rounds half away from zero to whole Rupiah and groups thousands with dots.
pub fn format_rupiah(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_small_amount() {
        assert_eq!(format_rupiah(dec!(500)), "Rp 500");
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(format_rupiah(dec!(50000)), "Rp 50.000");
        assert_eq!(format_rupiah(dec!(1250000)), "Rp 1.250.000");
    }

    #[test]
    fn test_format_drops_fraction() {
        assert_eq!(format_rupiah(dec!(9999.50)), "Rp 10.000");
        assert_eq!(format_rupiah(dec!(15000.00)), "Rp 15.000");
    }

    #[test]
    fn test_format_zero_and_negative() {
        assert_eq!(format_rupiah(Decimal::ZERO), "Rp 0");
        assert_eq!(format_rupiah(dec!(-15000)), "-Rp 15.000");
    }
}
