// Validation rules for discount definitions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use crate::discounts::models::{CreateDiscountRequest, DiscountDefinition};
use crate::discounts::types::DiscountKind;

pub const MAX_CODE_LENGTH: usize = 50;

/// Codes are 1 to 50 characters with no inner whitespace
pub fn validate_discount_code(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();
    if code.is_empty() || code.chars().count() > MAX_CODE_LENGTH {
        return Err(ValidationError::new("invalid_code_length"));
    }
    if code.chars().any(char::is_whitespace) {
        return Err(ValidationError::new("code_contains_whitespace"));
    }
    Ok(())
}

/// Monetary and percentage values are never negative
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        Err(ValidationError::new("amount_must_not_be_negative"))
    } else {
        Ok(())
    }
}

/// Rules that span several fields of a definition
pub fn validate_definition_rules(
    kind: DiscountKind,
    value: Decimal,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    if kind == DiscountKind::Percentage && value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("percentage_above_100"));
    }

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end <= start {
            return Err(ValidationError::new("end_date_not_after_start_date"));
        }
    }

    Ok(())
}

/// Schema-level check for creation requests
pub fn validate_new_discount(request: &CreateDiscountRequest) -> Result<(), ValidationError> {
    validate_definition_rules(request.kind, request.value, request.start_date, request.end_date)
}

/// Re-check a definition after a partial update has been applied
pub fn validate_merged_definition(definition: &DiscountDefinition) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(error) = validate_discount_code(&definition.code) {
        errors.add("code", error);
    }
    if let Err(error) = validate_definition_rules(
        definition.kind,
        definition.value,
        Some(definition.start_date),
        definition.end_date,
    ) {
        errors.add("__all__", error);
    }
    if let Some(max_uses) = definition.max_uses {
        if max_uses < 1 {
            errors.add("max_uses", ValidationError::new("range"));
        } else if max_uses < definition.uses_count {
            errors.add("max_uses", ValidationError::new("max_uses_below_uses_count"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use validator::Validate;

    fn create_request() -> CreateDiscountRequest {
        CreateDiscountRequest {
            code: "SUMMER10".to_string(),
            name: "Summer sale".to_string(),
            description: None,
            kind: DiscountKind::Percentage,
            value: dec!(10),
            min_purchase_amount: Some(dec!(50000)),
            min_quantity: Some(1),
            max_uses: None,
            start_date: None,
            end_date: None,
            is_active: None,
        }
    }

    #[test]
    fn test_code_rules() {
        assert!(validate_discount_code("SUMMER10").is_ok());
        assert!(validate_discount_code("").is_err());
        assert!(validate_discount_code("   ").is_err());
        assert!(validate_discount_code("SUMMER 10").is_err());
        assert!(validate_discount_code(&"A".repeat(51)).is_err());
        assert!(validate_discount_code(&"A".repeat(50)).is_ok());
    }

    #[test]
    fn test_non_negative_amount() {
        assert!(validate_non_negative_amount(&dec!(0)).is_ok());
        assert!(validate_non_negative_amount(&dec!(15000)).is_ok());
        assert!(validate_non_negative_amount(&dec!(-0.01)).is_err());
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(create_request().validate().is_ok());
    }

    #[test]
    fn test_percentage_above_100_rejected() {
        let mut request = create_request();
        request.value = dec!(150);
        assert!(request.validate().is_err());

        request.kind = DiscountKind::FixedAmount;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_end_date_must_follow_start_date() {
        let mut request = create_request();
        let start = Utc::now();
        request.start_date = Some(start);
        request.end_date = Some(start - Duration::hours(1));
        assert!(request.validate().is_err());

        request.end_date = Some(start + Duration::days(30));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_field_ranges() {
        let mut request = create_request();
        request.min_quantity = Some(0);
        assert!(request.validate().is_err());

        let mut request = create_request();
        request.max_uses = Some(0);
        assert!(request.validate().is_err());

        let mut request = create_request();
        request.min_purchase_amount = Some(dec!(-1));
        assert!(request.validate().is_err());
    }
}
