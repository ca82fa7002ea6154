// Discount consumption
//
// Records that an identity used a discount on an order. Runs after the order
// has been accepted; evaluation never reaches this code.

use std::sync::Arc;
use uuid::Uuid;

use crate::discounts::error::DiscountError;
use crate::discounts::evaluator::Rejection;
use crate::discounts::ledger::UsageLedger;
use crate::discounts::models::UsageRecord;
use crate::discounts::registry::DiscountRegistry;

#[derive(Clone)]
pub struct DiscountConsumer {
    registry: Arc<dyn DiscountRegistry>,
    ledger: Arc<dyn UsageLedger>,
}

impl DiscountConsumer {
    pub fn new(registry: Arc<dyn DiscountRegistry>, ledger: Arc<dyn UsageLedger>) -> Self {
        Self { registry, ledger }
    }

    /// Consume one use of a discount for `identity`
    ///
    /// The usage counter is bumped with a guarded single-statement update, so
    /// concurrent consumers can never push `uses_count` past `max_uses`. The
    /// counter is not rolled back if the ledger insert then loses a race.
    pub async fn consume(
        &self,
        identity: &str,
        discount_id: Uuid,
        order_id: Option<Uuid>,
    ) -> Result<UsageRecord, DiscountError> {
        if identity.trim().is_empty() {
            return Err(DiscountError::IdentityRequired);
        }

        if self.ledger.exists(identity, discount_id).await? {
            tracing::warn!("Discount {} already used by {}", discount_id, identity);
            return Err(DiscountError::Ineligible(Rejection::AlreadyUsed));
        }

        if !self.registry.increment_uses(discount_id).await? {
            tracing::warn!("Discount {} has no uses remaining", discount_id);
            return Err(DiscountError::Ineligible(Rejection::UsageLimitReached));
        }

        match self.ledger.insert(identity, discount_id, order_id).await? {
            Some(record) => {
                tracing::info!("Discount {} consumed by {}", discount_id, identity);
                Ok(record)
            }
            None => {
                tracing::warn!(
                    "Concurrent consumption of discount {} by {}; usage count kept",
                    discount_id,
                    identity
                );
                Err(DiscountError::Ineligible(Rejection::AlreadyUsed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discounts::ledger::MockUsageLedger;
    use crate::discounts::registry::MockDiscountRegistry;
    use crate::discounts::types::DiscountKind;
    use crate::memory::{sample_discount, InMemoryDiscountRegistry, InMemoryUsageLedger};
    use rust_decimal_macros::dec;

    fn consumer_with_cap(
        max_uses: Option<i32>,
    ) -> (DiscountConsumer, Arc<InMemoryDiscountRegistry>, Arc<InMemoryUsageLedger>, Uuid) {
        let mut discount = sample_discount("SUMMER10", DiscountKind::Percentage, dec!(10));
        discount.max_uses = max_uses;
        let id = discount.id;

        let registry = Arc::new(InMemoryDiscountRegistry::with_discounts(vec![discount]));
        let ledger = Arc::new(InMemoryUsageLedger::new());
        let consumer = DiscountConsumer::new(registry.clone(), ledger.clone());
        (consumer, registry, ledger, id)
    }

    #[tokio::test]
    async fn test_consume_records_usage_and_increments() {
        let (consumer, registry, ledger, id) = consumer_with_cap(Some(3));
        let order_id = Uuid::new_v4();

        let record = consumer.consume("reader-1", id, Some(order_id)).await.unwrap();

        assert_eq!(record.user_id, "reader-1");
        assert_eq!(record.discount_id, id);
        assert_eq!(record.order_id, Some(order_id));
        assert!(ledger.exists("reader-1", id).await.unwrap());
        assert_eq!(registry.get_by_id(id).await.unwrap().unwrap().uses_count, 1);
    }

    #[tokio::test]
    async fn test_second_consumption_by_same_identity_fails() {
        let (consumer, registry, _, id) = consumer_with_cap(None);

        consumer.consume("reader-1", id, None).await.unwrap();
        let second = consumer.consume("reader-1", id, None).await;

        assert!(matches!(
            second,
            Err(DiscountError::Ineligible(Rejection::AlreadyUsed))
        ));
        assert_eq!(registry.get_by_id(id).await.unwrap().unwrap().uses_count, 1);
    }

    #[tokio::test]
    async fn test_cap_is_never_exceeded() {
        let (consumer, registry, _, id) = consumer_with_cap(Some(2));

        consumer.consume("reader-1", id, None).await.unwrap();
        consumer.consume("reader-2", id, None).await.unwrap();
        let third = consumer.consume("reader-3", id, None).await;

        assert!(matches!(
            third,
            Err(DiscountError::Ineligible(Rejection::UsageLimitReached))
        ));
        assert_eq!(registry.get_by_id(id).await.unwrap().unwrap().uses_count, 2);
    }

    #[tokio::test]
    async fn test_concurrent_consumers_respect_cap() {
        let (consumer, registry, _, id) = consumer_with_cap(Some(5));

        let handles: Vec<_> = (0..20)
            .map(|n| {
                let consumer = consumer.clone();
                tokio::spawn(async move { consumer.consume(&format!("reader-{}", n), id, None).await })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 5);
        assert_eq!(registry.get_by_id(id).await.unwrap().unwrap().uses_count, 5);
    }

    #[tokio::test]
    async fn test_blank_identity_is_rejected() {
        let (consumer, _, _, id) = consumer_with_cap(None);

        let result = consumer.consume("  ", id, None).await;

        assert!(matches!(result, Err(DiscountError::IdentityRequired)));
    }

    #[tokio::test]
    async fn test_lost_insert_race_reports_already_used() {
        let id = Uuid::new_v4();

        let mut registry = MockDiscountRegistry::new();
        registry.expect_increment_uses().times(1).returning(|_| Ok(true));

        let mut ledger = MockUsageLedger::new();
        ledger.expect_exists().returning(|_, _| Ok(false));
        ledger.expect_insert().returning(|_, _, _| Ok(None));

        let consumer = DiscountConsumer::new(Arc::new(registry), Arc::new(ledger));
        let result = consumer.consume("reader-1", id, None).await;

        assert!(matches!(
            result,
            Err(DiscountError::Ineligible(Rejection::AlreadyUsed))
        ));
    }

    #[tokio::test]
    async fn test_registry_failure_propagates() {
        let mut registry = MockDiscountRegistry::new();
        registry
            .expect_increment_uses()
            .returning(|_| Err(DiscountError::Collaborator("connection reset".to_string())));

        let mut ledger = MockUsageLedger::new();
        ledger.expect_exists().returning(|_, _| Ok(false));
        ledger.expect_insert().never();

        let consumer = DiscountConsumer::new(Arc::new(registry), Arc::new(ledger));
        let result = consumer.consume("reader-1", Uuid::new_v4(), None).await;

        assert!(matches!(result, Err(DiscountError::Collaborator(_))));
    }
}
