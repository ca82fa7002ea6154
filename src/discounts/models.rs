use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::cart::CartItemInput;
use crate::discounts::evaluator::DiscountEvaluation;
use crate::discounts::types::DiscountKind;
use crate::discounts::validation::{
    validate_discount_code, validate_new_discount, validate_non_negative_amount,
};
use crate::money::format_rupiah;

/// A promotional code and its eligibility rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DiscountDefinition {
    pub id: Uuid,
    /// Unique, case-sensitive code customers type in
    #[schema(example = "SUMMER10")]
    pub code: String,
    #[schema(example = "Summer sale")]
    pub name: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    /// Percentage points or Rupiah, depending on `kind`
    #[schema(example = "10")]
    pub value: Decimal,
    #[schema(example = "50000")]
    pub min_purchase_amount: Decimal,
    #[schema(example = 1)]
    pub min_quantity: i32,
    /// `None` means unlimited
    pub max_uses: Option<i32>,
    pub uses_count: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiscountDefinition {
    /// Active and `start_date <= now < end_date` (open-ended when `end_date` is absent)
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_date <= now
            && self.end_date.map_or(true, |end| now < end)
    }

    pub fn has_uses_remaining(&self) -> bool {
        self.max_uses.map_or(true, |max| self.uses_count < max)
    }
}

/// Fully resolved values for a new definition
#[derive(Debug, Clone)]
pub struct NewDiscount {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_purchase_amount: Decimal,
    pub min_quantity: i32,
    pub max_uses: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Request body for POST /api/admin/discounts
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_new_discount"))]
pub struct CreateDiscountRequest {
    #[validate(custom = "validate_discount_code")]
    #[schema(example = "SUMMER10")]
    pub code: String,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    #[validate(custom = "validate_non_negative_amount")]
    #[schema(example = "10")]
    pub value: Decimal,
    /// Defaults to 0
    #[validate(custom = "validate_non_negative_amount")]
    pub min_purchase_amount: Option<Decimal>,
    /// Defaults to 1
    #[validate(range(min = 1, message = "Minimum quantity must be at least 1"))]
    pub min_quantity: Option<i32>,
    #[validate(range(min = 1, message = "Maximum uses must be at least 1"))]
    pub max_uses: Option<i32>,
    /// Defaults to the time of creation
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Defaults to true
    pub is_active: Option<bool>,
}

impl CreateDiscountRequest {
    /// Resolve defaults against `now`
    pub fn into_new_discount(self, now: DateTime<Utc>) -> NewDiscount {
        NewDiscount {
            code: self.code.trim().to_string(),
            name: self.name.trim().to_string(),
            description: self.description,
            kind: self.kind,
            value: self.value,
            min_purchase_amount: self.min_purchase_amount.unwrap_or(Decimal::ZERO),
            min_quantity: self.min_quantity.unwrap_or(1),
            max_uses: self.max_uses,
            start_date: self.start_date.unwrap_or(now),
            end_date: self.end_date,
            is_active: self.is_active.unwrap_or(true),
        }
    }
}

/// Distinguishes an absent field from an explicit `null`
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request body for PUT /api/admin/discounts/:id
///
/// Absent fields keep their value. `max_uses` and `end_date` accept `null` to
/// clear the limit.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDiscountRequest {
    #[validate(custom = "validate_discount_code")]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<DiscountKind>,
    #[validate(custom = "validate_non_negative_amount")]
    pub value: Option<Decimal>,
    #[validate(custom = "validate_non_negative_amount")]
    pub min_purchase_amount: Option<Decimal>,
    #[validate(range(min = 1, message = "Minimum quantity must be at least 1"))]
    pub min_quantity: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub max_uses: Option<Option<i32>>,
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

impl UpdateDiscountRequest {
    /// Apply the present fields on top of an existing definition
    pub fn apply_to(self, mut definition: DiscountDefinition) -> DiscountDefinition {
        if let Some(code) = self.code {
            definition.code = code.trim().to_string();
        }
        if let Some(name) = self.name {
            definition.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            definition.description = Some(description);
        }
        if let Some(kind) = self.kind {
            definition.kind = kind;
        }
        if let Some(value) = self.value {
            definition.value = value;
        }
        if let Some(min_purchase_amount) = self.min_purchase_amount {
            definition.min_purchase_amount = min_purchase_amount;
        }
        if let Some(min_quantity) = self.min_quantity {
            definition.min_quantity = min_quantity;
        }
        if let Some(max_uses) = self.max_uses {
            definition.max_uses = max_uses;
        }
        if let Some(start_date) = self.start_date {
            definition.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            definition.end_date = end_date;
        }
        if let Some(is_active) = self.is_active {
            definition.is_active = is_active;
        }
        definition
    }
}

/// Evidence that an identity consumed a discount
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UsageRecord {
    pub id: Uuid,
    pub user_id: String,
    pub discount_id: Uuid,
    pub order_id: Option<Uuid>,
    pub used_at: DateTime<Utc>,
}

/// Catalog entity a discount is associated with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountTarget {
    Product(Uuid),
    Category(Uuid),
    Subcategory(Uuid),
}

/// Path segment naming a kind of target association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Products,
    Categories,
    Subcategories,
}

impl TargetKind {
    pub fn target(self, id: Uuid) -> DiscountTarget {
        match self {
            TargetKind::Products => DiscountTarget::Product(id),
            TargetKind::Categories => DiscountTarget::Category(id),
            TargetKind::Subcategories => DiscountTarget::Subcategory(id),
        }
    }
}

/// Associations of one discount, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiscountTargets {
    pub product_ids: Vec<Uuid>,
    pub category_ids: Vec<Uuid>,
    pub subcategory_ids: Vec<Uuid>,
}

/// A definition together with its target associations
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiscountDetail {
    #[serde(flatten)]
    pub discount: DiscountDefinition,
    pub targets: DiscountTargets,
}

/// Request body for POST /api/discounts/validate
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ValidateDiscountRequest {
    #[validate(length(min = 1, message = "Discount code is required"))]
    #[schema(example = "SUMMER10")]
    pub code: String,
    #[validate]
    pub items: Vec<CartItemInput>,
}

/// Verdict for a code against a cart
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiscountEvaluationResponse {
    pub valid: bool,
    pub discount: Option<DiscountDefinition>,
    #[schema(example = "10000")]
    pub discount_amount: Decimal,
    #[schema(example = "Rp 10.000")]
    pub discount_amount_display: String,
    #[schema(example = "SUMMER10")]
    pub code: String,
    /// Machine-readable rejection, when not valid
    #[schema(example = "MINIMUM_PURCHASE_NOT_MET")]
    pub reason_code: Option<String>,
    /// Human-readable rejection, when not valid
    pub message: Option<String>,
}

impl From<DiscountEvaluation> for DiscountEvaluationResponse {
    fn from(evaluation: DiscountEvaluation) -> Self {
        Self {
            valid: evaluation.admissible,
            discount_amount_display: format_rupiah(evaluation.amount),
            discount_amount: evaluation.amount,
            reason_code: evaluation.rejection.as_ref().map(|r| r.code().to_string()),
            message: evaluation.reason(),
            discount: evaluation.definition,
            code: evaluation.code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn definition() -> DiscountDefinition {
        let now = Utc::now();
        DiscountDefinition {
            id: Uuid::new_v4(),
            code: "SUMMER10".to_string(),
            name: "Summer sale".to_string(),
            description: None,
            kind: DiscountKind::Percentage,
            value: dec!(10),
            min_purchase_amount: dec!(50000),
            min_quantity: 1,
            max_uses: None,
            uses_count: 0,
            start_date: now - Duration::days(1),
            end_date: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_window_boundaries() {
        let mut discount = definition();
        let now = Utc::now();

        discount.start_date = now;
        assert!(discount.is_valid_at(now));

        discount.end_date = Some(now);
        assert!(!discount.is_valid_at(now));

        discount.end_date = Some(now + Duration::seconds(1));
        assert!(discount.is_valid_at(now));

        discount.is_active = false;
        assert!(!discount.is_valid_at(now));
    }

    #[test]
    fn test_uses_remaining() {
        let mut discount = definition();
        assert!(discount.has_uses_remaining());

        discount.max_uses = Some(3);
        discount.uses_count = 2;
        assert!(discount.has_uses_remaining());

        discount.uses_count = 3;
        assert!(!discount.has_uses_remaining());
    }

    #[test]
    fn test_create_request_defaults() {
        let now = Utc::now();
        let request: CreateDiscountRequest = serde_json::from_value(serde_json::json!({
            "code": " WELCOME ",
            "name": "Welcome",
            "kind": "fixed_amount",
            "value": "25000"
        }))
        .unwrap();

        let new = request.into_new_discount(now);
        assert_eq!(new.code, "WELCOME");
        assert_eq!(new.min_purchase_amount, Decimal::ZERO);
        assert_eq!(new.min_quantity, 1);
        assert_eq!(new.start_date, now);
        assert!(new.is_active);
        assert!(new.max_uses.is_none());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let mut discount = definition();
        discount.max_uses = Some(5);
        discount.end_date = Some(Utc::now() + Duration::days(7));

        let keep: UpdateDiscountRequest =
            serde_json::from_value(serde_json::json!({ "name": "Renamed" })).unwrap();
        let kept = keep.apply_to(discount.clone());
        assert_eq!(kept.name, "Renamed");
        assert_eq!(kept.max_uses, Some(5));
        assert!(kept.end_date.is_some());

        let clear: UpdateDiscountRequest =
            serde_json::from_value(serde_json::json!({ "max_uses": null, "end_date": null })).unwrap();
        let cleared = clear.apply_to(discount);
        assert_eq!(cleared.max_uses, None);
        assert_eq!(cleared.end_date, None);
    }
}
