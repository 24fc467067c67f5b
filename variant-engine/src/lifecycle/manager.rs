//! Lifecycle write path
//!
//! Every lifecycle write follows the same shape: load, check the pure
//! transition/guard rules, then a version-checked compare-and-swap at the
//! storage boundary. A CAS conflict re-reads and re-checks; the rules are
//! never interleaved with the write itself.

use super::{
    auto_stock_transition, guard_identity_field, price, validate_transition, LockReason,
    VariantStatus,
};
use crate::db::models::{Variant, VariantUpdate};
use crate::db::repository::RepoError;
use crate::error::{EngineError, EngineResult};
use crate::identity;
use crate::services::{MasterDataLookup, VariantStore};
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct LifecycleManager {
    store: Arc<dyn VariantStore>,
    master: Arc<dyn MasterDataLookup>,
    max_retries: u32,
}

impl LifecycleManager {
    pub fn new(
        store: Arc<dyn VariantStore>,
        master: Arc<dyn MasterDataLookup>,
        max_retries: u32,
    ) -> Self {
        Self {
            store,
            master,
            max_retries,
        }
    }

    async fn load(&self, variant_id: &str) -> EngineResult<Variant> {
        self.store
            .find_by_id(variant_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Variant {variant_id} not found")).into())
    }

    /// Transition a variant to `to`, enforcing the transition table.
    ///
    /// Entering ACTIVE locks the governance block; entering LOCKED records a
    /// manual lock. ARCHIVED is terminal.
    pub async fn transition(&self, variant_id: &str, to: VariantStatus) -> EngineResult<Variant> {
        for attempt in 0..=self.max_retries {
            let variant = self.load(variant_id).await?;
            validate_transition(variant.status, to)?;

            let mut governance = variant.governance.clone();
            match to {
                VariantStatus::Active => {
                    governance.is_locked = true;
                    governance.lock_reason = Some(LockReason::Activation);
                }
                VariantStatus::Locked => {
                    governance.is_locked = true;
                    governance.lock_reason = Some(LockReason::Manual);
                }
                _ => {}
            }

            match self
                .store
                .update_status(variant_id, variant.governance.version, to, &governance)
                .await
            {
                Ok(updated) => {
                    tracing::info!(
                        variant = variant_id,
                        from = %variant.status,
                        to = %to,
                        "variant transitioned"
                    );
                    return Ok(updated);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(EngineError::WriteConflict {
            attempts: self.max_retries + 1,
        })
    }

    /// Apply a field patch under the identity-lock guard.
    ///
    /// Identity-bearing edits are only legal in DRAFT with an unlocked
    /// governance block, and recompute the configHash so it stays a pure
    /// function of the identity fields. Base-price changes recompute the
    /// price resolution log.
    pub async fn update(&self, variant_id: &str, patch: VariantUpdate) -> EngineResult<Variant> {
        for attempt in 0..=self.max_retries {
            let variant = self.load(variant_id).await?;

            if let Some(field) = patch.touched_identity_fields().first() {
                guard_identity_field(variant.status, &variant.governance, field)?;
            }

            let mut patch = patch.clone();
            self.prepare_patch(&variant, &mut patch).await?;

            match self
                .store
                .update_guarded(variant_id, variant.governance.version, &patch)
                .await
            {
                Ok(updated) => return Ok(updated),
                Err(e) if e.is_transient() && attempt < self.max_retries => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(EngineError::WriteConflict {
            attempts: self.max_retries + 1,
        })
    }

    /// Inventory-driven ACTIVE/OUT_OF_STOCK move for an on-hand quantity.
    /// No-op while the variant is locked for a non-stock reason.
    pub async fn apply_stock_level(
        &self,
        variant_id: &str,
        on_hand: i64,
    ) -> EngineResult<Option<Variant>> {
        let variant = self.load(variant_id).await?;
        let Some(next) = auto_stock_transition(variant.status, &variant.governance, on_hand)
        else {
            return Ok(None);
        };
        // Stock moves keep the governance block as-is
        let updated = self
            .store
            .update_status(variant_id, variant.governance.version, next, &variant.governance)
            .await?;
        tracing::info!(
            variant = variant_id,
            on_hand,
            to = %next,
            "stock-driven status change"
        );
        Ok(Some(updated))
    }

    /// Recompute derived fields a patch invalidates.
    async fn prepare_patch(&self, variant: &Variant, patch: &mut VariantUpdate) -> EngineResult<()> {
        let identity_touched = !patch.touched_identity_fields().is_empty();

        if identity_touched {
            // Re-derive the hash from the post-patch identity fields
            let mut projected = variant.clone();
            if let Some(color) = &patch.color {
                projected.color = color.clone();
            }
            if let Some(sizes) = &patch.sizes {
                projected.sizes = sizes.clone();
            }
            if let Some(attrs) = &patch.attribute_dimensions {
                projected.attribute_dimensions = attrs.clone();
            }
            let selection = projected.identity_selection();
            identity::validate_cardinality(&selection.attributes)?;
            patch.config_hash = Some(identity::build_config_hash(
                &projected.product_group,
                &selection,
            )?);
        }

        if patch.base_price.is_some() || identity_touched {
            let base = patch.base_price.unwrap_or(variant.base_price);
            let attrs = patch
                .attribute_dimensions
                .as_ref()
                .unwrap_or(&variant.attribute_dimensions);
            let modifiers = self.price_modifiers(attrs).await?;
            let (final_price, log) = price::resolve_price(base, &modifiers);
            tracing::debug!(
                variant = ?variant.id,
                %final_price,
                "price resolution recomputed"
            );
            patch.final_price = Some(final_price);
            patch.price_resolution = Some(log);
        }

        Ok(())
    }

    async fn price_modifiers(
        &self,
        attrs: &[crate::db::models::AttributeRef],
    ) -> EngineResult<Vec<(String, Decimal)>> {
        if attrs.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = attrs.iter().map(|a| a.value.clone()).collect();
        let values = self.master.load_attribute_values(&ids).await?;
        Ok(values
            .into_iter()
            .filter(|v| v.price_modifier != Decimal::ZERO)
            .map(|v| (v.id, v.price_modifier))
            .collect())
    }
}
