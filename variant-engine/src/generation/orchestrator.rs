//! Generation orchestrator
//!
//! The write pipeline: validate limits, enrich from master data, expand,
//! derive each candidate's identity, drop the ones that already exist, then
//! insert in unordered chunks. Concurrency safety rests on the storage
//! layer's unique `(product_group, config_hash)` index; a collision lost to
//! a concurrent writer is counted, never treated as a failure. There is no
//! cross-chunk transaction, so cancellation between chunks retains the
//! chunks already written.

use super::cache::PreviewCache;
use super::enrich::{self, load_and_enrich};
use super::preview::PreviewService;
use super::sku;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::expansion;
use crate::identity;
use crate::lifecycle::{price, Governance, VariantStatus};
use crate::limits;
use crate::services::{
    ChunkOutcome, InventoryService, MasterDataLookup, SnapshotScheduler, VariantStore,
};
use chrono::Utc;
use rust_decimal::Decimal;
use shared::util::to_slug;
use shared::{GenerationRequest, GenerationResult};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub struct VariantGenerator {
    config: EngineConfig,
    master: Arc<dyn MasterDataLookup>,
    store: Arc<dyn VariantStore>,
    inventory: Arc<dyn InventoryService>,
    snapshots: Arc<dyn SnapshotScheduler>,
    preview: Arc<PreviewService>,
}

impl VariantGenerator {
    pub fn new(
        config: EngineConfig,
        master: Arc<dyn MasterDataLookup>,
        store: Arc<dyn VariantStore>,
        inventory: Arc<dyn InventoryService>,
        snapshots: Arc<dyn SnapshotScheduler>,
    ) -> Self {
        let cache = Arc::new(PreviewCache::new(config.preview_cache_capacity));
        let preview = Arc::new(PreviewService::new(
            config.clone(),
            master.clone(),
            store.clone(),
            cache,
        ));
        Self {
            config,
            master,
            store,
            inventory,
            snapshots,
            preview,
        }
    }

    /// The read-only preview surface, sharing this generator's caches so a
    /// successful generation invalidates stale previews.
    pub fn preview_service(&self) -> Arc<PreviewService> {
        self.preview.clone()
    }

    /// Expand, deduplicate and persist one generation request.
    pub async fn generate(
        &self,
        req: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> EngineResult<GenerationResult> {
        limits::validate_request_limits(req)?;

        let group_id =
            identity::normalize_id(&req.product_group_id).ok_or(EngineError::MissingProductGroup)?;
        let group = self
            .master
            .load_product_group(&group_id)
            .await?
            .ok_or(EngineError::MissingProductGroup)?;
        let group_slug = if group.slug.is_empty() {
            to_slug(&group.name)
        } else {
            group.slug.clone()
        };
        let brand = req.brand.as_deref().or(group.brand.as_deref());

        let enriched = load_and_enrich(self.master.as_ref(), req).await?;
        let soft_limit = req
            .max_combinations
            .unwrap_or(self.config.soft_limit_default);
        let combinations = expansion::expand(&enriched.dimensions, soft_limit)?;

        let batch_id = Uuid::new_v4().to_string();
        let base_price = req
            .base_price
            .and_then(Decimal::from_f64_retain)
            .unwrap_or(Decimal::ZERO);

        // ---- derive candidates ----
        let now = Utc::now();
        let mut candidates = Vec::with_capacity(combinations.len());
        for combination in &combinations {
            let selection = enrich::selection_for(combination);
            identity::validate_cardinality(&selection.attributes)?;
            let config_hash = identity::build_config_hash(&group_id, &selection)?;

            let modifiers: Vec<(String, Decimal)> = selection
                .attributes
                .iter()
                .filter_map(|attr| {
                    enriched
                        .price_modifiers
                        .get(&attr.value_id)
                        .map(|m| (attr.value_id.clone(), *m))
                })
                .collect();
            let (final_price, price_resolution) = price::resolve_price(base_price, &modifiers);

            candidates.push(crate::db::models::Variant {
                id: Some(format!("variant:{}", Uuid::new_v4().simple())),
                product_group: group_id.clone(),
                sku: sku::build_sku(brand, &group_slug, &config_hash),
                combination_key: combination.combination_key.clone(),
                config_hash,
                color: selection.color_id.clone(),
                sizes: selection
                    .sizes
                    .iter()
                    .map(|s| crate::db::models::SizeRef {
                        category: s.category.clone(),
                        size: s.size_id.clone(),
                    })
                    .collect(),
                attribute_dimensions: selection
                    .attributes
                    .iter()
                    .map(|a| crate::db::models::AttributeRef {
                        attribute: a.attribute_id.clone(),
                        value: a.value_id.clone(),
                    })
                    .collect(),
                status: VariantStatus::Draft,
                governance: Governance::default(),
                base_price,
                final_price,
                price_resolution,
                generation_batch: Some(batch_id.clone()),
                tenant: req.tenant_id.clone(),
                created_at: now,
                updated_at: now,
            });
        }

        // ---- drop identities that already exist ----
        let hashes: Vec<String> = candidates.iter().map(|v| v.config_hash.clone()).collect();
        let existing = self.store.existing_hashes(&group_id, &hashes).await?;
        let before = candidates.len() as u64;
        candidates.retain(|v| !existing.contains(&v.config_hash));
        let skipped = before - candidates.len() as u64;

        tracing::info!(
            product_group = %group_id,
            batch = %batch_id,
            expanded = before,
            skipped,
            to_insert = candidates.len(),
            "generation batch prepared"
        );

        // ---- chunked inserts ----
        let mut created = 0u64;
        let mut race_duplicates = 0u64;
        let mut created_ids = Vec::new();
        let mut cancelled = false;
        for chunk in candidates.chunks(self.config.insert_chunk_size) {
            if cancel.is_cancelled() {
                tracing::warn!(
                    product_group = %group_id,
                    batch = %batch_id,
                    created,
                    "generation cancelled, retaining inserted chunks"
                );
                cancelled = true;
                break;
            }
            let outcome = self.insert_chunk_with_retry(chunk.to_vec()).await?;
            created += outcome.created;
            race_duplicates += outcome.race_duplicates;
            created_ids.extend(outcome.created_ids);
        }

        // ---- post-insert side effects ----
        for id in &created_ids {
            // Inventory is reconciled out of band; a failed placeholder is
            // not worth failing the batch over.
            if let Err(e) = self.inventory.ensure_placeholder(id, &group_id).await {
                tracing::error!(variant = %id, error = %e, "inventory placeholder failed");
            }
        }
        if created > 0 {
            self.snapshots.schedule_recompute(&group_id);
            self.preview.invalidate_group(&group_id);
        }

        Ok(GenerationResult {
            success: !cancelled,
            total_generated: created,
            skipped,
            race_duplicates,
            batch_id: Some(batch_id),
        })
    }

    async fn insert_chunk_with_retry(
        &self,
        chunk: Vec<crate::db::models::Variant>,
    ) -> EngineResult<ChunkOutcome> {
        let mut attempt = 0u32;
        loop {
            match self.store.insert_chunk(chunk.clone()).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_transient() && attempt < self.config.max_write_retries => {
                    attempt += 1;
                    let backoff = self.config.retry_backoff_ms << (attempt - 1);
                    tracing::warn!(attempt, backoff_ms = backoff, error = %e, "insert chunk retry");
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) if e.is_transient() => {
                    return Err(EngineError::WriteConflict { attempts: attempt })
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// In-batch duplicate guard, exposed for the store implementations: an
/// unordered insert may not assume the caller deduplicated.
pub fn dedup_by_hash(variants: &mut Vec<crate::db::models::Variant>) -> u64 {
    let mut seen = HashSet::new();
    let before = variants.len() as u64;
    variants.retain(|v| seen.insert(v.config_hash.clone()));
    before - variants.len() as u64
}
