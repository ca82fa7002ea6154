use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::discounts::error::DiscountError;
use crate::discounts::models::{
    CreateDiscountRequest, DiscountDefinition, DiscountDetail, DiscountTarget, DiscountTargets,
    UpdateDiscountRequest,
};
use crate::discounts::registry::DiscountRegistry;
use crate::discounts::validation::{validate_definition_rules, validate_merged_definition};

/// Service for discount administration and the public active listing
#[derive(Clone)]
pub struct DiscountService {
    registry: Arc<dyn DiscountRegistry>,
}

impl DiscountService {
    pub fn new(registry: Arc<dyn DiscountRegistry>) -> Self {
        Self { registry }
    }

    pub async fn list(&self) -> Result<Vec<DiscountDefinition>, DiscountError> {
        self.registry.list().await
    }

    /// Discounts a customer could apply right now
    pub async fn list_active(&self) -> Result<Vec<DiscountDefinition>, DiscountError> {
        self.registry.list_active(Utc::now()).await
    }

    pub async fn get(&self, id: Uuid) -> Result<DiscountDetail, DiscountError> {
        let discount = self.require(id).await?;
        let targets = self.registry.list_targets(id).await?;
        Ok(DiscountDetail { discount, targets })
    }

    pub async fn create(
        &self,
        request: CreateDiscountRequest,
    ) -> Result<DiscountDefinition, DiscountError> {
        request.validate()?;

        let discount = request.into_new_discount(Utc::now());
        // start_date may only be known after defaults are resolved
        if let Err(error) = validate_definition_rules(
            discount.kind,
            discount.value,
            Some(discount.start_date),
            discount.end_date,
        ) {
            let mut errors = ValidationErrors::new();
            errors.add("__all__", error);
            return Err(errors.into());
        }

        let created = self.registry.create(discount).await?;

        tracing::info!("Discount {} created with code {}", created.id, created.code);
        Ok(created)
    }

    /// Partial update; `uses_count` is never touched
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDiscountRequest,
    ) -> Result<DiscountDefinition, DiscountError> {
        request.validate()?;

        let existing = self.require(id).await?;
        let merged = request.apply_to(existing);
        validate_merged_definition(&merged)?;

        let updated = self
            .registry
            .update(&merged)
            .await?
            .ok_or(DiscountError::DefinitionNotFound(id))?;

        tracing::info!("Discount {} updated", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DiscountError> {
        if !self.registry.delete(id).await? {
            return Err(DiscountError::DefinitionNotFound(id));
        }
        tracing::info!("Discount {} deleted", id);
        Ok(())
    }

    pub async fn add_target(&self, id: Uuid, target: DiscountTarget) -> Result<DiscountTargets, DiscountError> {
        self.require(id).await?;
        self.registry.add_target(id, target).await?;
        tracing::info!("Discount {} associated with {:?}", id, target);
        self.registry.list_targets(id).await
    }

    pub async fn remove_target(&self, id: Uuid, target: DiscountTarget) -> Result<(), DiscountError> {
        self.require(id).await?;
        if !self.registry.remove_target(id, target).await? {
            return Err(DiscountError::TargetNotFound(format!("{:?}", target)));
        }
        tracing::info!("Discount {} no longer associated with {:?}", id, target);
        Ok(())
    }

    pub async fn list_targets(&self, id: Uuid) -> Result<DiscountTargets, DiscountError> {
        self.require(id).await?;
        self.registry.list_targets(id).await
    }

    async fn require(&self, id: Uuid) -> Result<DiscountDefinition, DiscountError> {
        tracing::debug!("Fetching discount {}", id);
        self.registry
            .get_by_id(id)
            .await?
            .ok_or(DiscountError::DefinitionNotFound(id))
    }
}
