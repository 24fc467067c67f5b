//! In-memory collaborators and fixture builders for the integration tests

// Not every test binary touches every helper
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::{AttributeAxisInput, BaseDimensions, GenerationRequest};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use variant_engine::db::models::{
    AttributeAxisRecord, AttributeValueRecord, ColorRecord, ProductGroupRecord, SizeRecord,
    Variant, VariantUpdate,
};
use variant_engine::db::repository::{RepoError, RepoResult};
use variant_engine::lifecycle::{Governance, VariantStatus};
use variant_engine::services::{
    ChunkOutcome, InventoryService, MasterDataLookup, SnapshotScheduler, VariantStore,
};

/// Console logging for test debugging, safe to call from every test.
pub fn init_tracing() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

// =============================================================================
// Master data
// =============================================================================

#[derive(Default)]
pub struct MemoryMasterData {
    pub groups: HashMap<String, ProductGroupRecord>,
    pub colors: HashMap<String, ColorRecord>,
    pub sizes: HashMap<String, SizeRecord>,
    pub axes: HashMap<String, AttributeAxisRecord>,
    pub values: HashMap<String, AttributeValueRecord>,
    /// Batched lookup calls served, for cache assertions
    pub lookups: AtomicU64,
}

impl MemoryMasterData {
    fn pick<T: Clone>(&self, map: &HashMap<String, T>, ids: &[String]) -> Vec<T> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        ids.iter().filter_map(|id| map.get(id).cloned()).collect()
    }
}

#[async_trait]
impl MasterDataLookup for MemoryMasterData {
    async fn load_product_group(&self, id: &str) -> RepoResult<Option<ProductGroupRecord>> {
        Ok(self.groups.get(id).cloned())
    }

    async fn load_colors(&self, ids: &[String]) -> RepoResult<Vec<ColorRecord>> {
        Ok(self.pick(&self.colors, ids))
    }

    async fn load_sizes(&self, ids: &[String]) -> RepoResult<Vec<SizeRecord>> {
        Ok(self.pick(&self.sizes, ids))
    }

    async fn load_attribute_axes(&self, ids: &[String]) -> RepoResult<Vec<AttributeAxisRecord>> {
        Ok(self.pick(&self.axes, ids))
    }

    async fn load_attribute_values(
        &self,
        ids: &[String],
    ) -> RepoResult<Vec<AttributeValueRecord>> {
        Ok(self.pick(&self.values, ids))
    }
}

// =============================================================================
// Variant store
// =============================================================================

/// HashMap-backed store that mimics the unique `(product_group, config_hash)`
/// index and version-checked writes.
#[derive(Default)]
pub struct MemoryVariantStore {
    inner: Mutex<HashMap<String, Variant>>,
    /// When set, `existing_hashes` reports nothing so every insert races
    /// the stored records, exercising the duplicate-tolerant path.
    pub hide_existing: AtomicBool,
}

impl MemoryVariantStore {
    pub fn stored(&self) -> Vec<Variant> {
        self.inner.lock().values().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.inner.lock().len()
    }
}

#[async_trait]
impl VariantStore for MemoryVariantStore {
    async fn existing_hashes(
        &self,
        product_group: &str,
        hashes: &[String],
    ) -> RepoResult<HashSet<String>> {
        if self.hide_existing.load(Ordering::SeqCst) {
            return Ok(HashSet::new());
        }
        let wanted: HashSet<&String> = hashes.iter().collect();
        Ok(self
            .inner
            .lock()
            .values()
            .filter(|v| v.product_group == product_group && wanted.contains(&v.config_hash))
            .map(|v| v.config_hash.clone())
            .collect())
    }

    async fn insert_chunk(&self, variants: Vec<Variant>) -> RepoResult<ChunkOutcome> {
        let mut inner = self.inner.lock();
        let mut outcome = ChunkOutcome::default();
        for variant in variants {
            let clash = inner.values().any(|v| {
                v.product_group == variant.product_group && v.config_hash == variant.config_hash
            });
            if clash {
                outcome.race_duplicates += 1;
                continue;
            }
            let id = variant.id.clone().unwrap();
            inner.insert(id.clone(), variant);
            outcome.created += 1;
            outcome.created_ids.push(id);
        }
        Ok(outcome)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Variant>> {
        Ok(self.inner.lock().get(id).cloned())
    }

    async fn list_by_group(&self, product_group: &str) -> RepoResult<Vec<Variant>> {
        let mut variants: Vec<Variant> = self
            .inner
            .lock()
            .values()
            .filter(|v| v.product_group == product_group)
            .cloned()
            .collect();
        variants.sort_by(|a, b| a.combination_key.cmp(&b.combination_key));
        Ok(variants)
    }

    async fn update_guarded(
        &self,
        id: &str,
        expected_version: u64,
        patch: &VariantUpdate,
    ) -> RepoResult<Variant> {
        let mut inner = self.inner.lock();
        let variant = inner
            .get_mut(id)
            .ok_or_else(|| RepoError::NotFound(format!("Variant {id} not found")))?;
        if variant.governance.version != expected_version {
            return Err(RepoError::Conflict(format!("version mismatch on {id}")));
        }
        if let Some(color) = &patch.color {
            variant.color = color.clone();
        }
        if let Some(sizes) = &patch.sizes {
            variant.sizes = sizes.clone();
        }
        if let Some(attrs) = &patch.attribute_dimensions {
            variant.attribute_dimensions = attrs.clone();
        }
        if let Some(hash) = &patch.config_hash {
            variant.config_hash = hash.clone();
        }
        if let Some(group) = &patch.product_group {
            variant.product_group = group.clone();
        }
        if let Some(base) = patch.base_price {
            variant.base_price = base;
        }
        if let Some(final_price) = patch.final_price {
            variant.final_price = final_price;
        }
        if let Some(log) = &patch.price_resolution {
            variant.price_resolution = log.clone();
        }
        if let Some(sku) = &patch.sku {
            variant.sku = sku.clone();
        }
        variant.governance.version = expected_version + 1;
        Ok(variant.clone())
    }

    async fn update_status(
        &self,
        id: &str,
        expected_version: u64,
        status: VariantStatus,
        governance: &Governance,
    ) -> RepoResult<Variant> {
        let mut inner = self.inner.lock();
        let variant = inner
            .get_mut(id)
            .ok_or_else(|| RepoError::NotFound(format!("Variant {id} not found")))?;
        if variant.governance.version != expected_version {
            return Err(RepoError::Conflict(format!("version mismatch on {id}")));
        }
        variant.status = status;
        variant.governance = governance.clone();
        variant.governance.version = expected_version + 1;
        Ok(variant.clone())
    }
}

// =============================================================================
// Inventory and snapshots
// =============================================================================

#[derive(Default)]
pub struct RecordingInventory {
    pub placeholders: Mutex<Vec<String>>,
}

#[async_trait]
impl InventoryService for RecordingInventory {
    async fn ensure_placeholder(&self, variant_id: &str, _product_group: &str) -> RepoResult<()> {
        self.placeholders.lock().push(variant_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSnapshots {
    pub scheduled: Mutex<Vec<String>>,
}

impl SnapshotScheduler for RecordingSnapshots {
    fn schedule_recompute(&self, product_group: &str) {
        self.scheduled.lock().push(product_group.to_string());
    }
}

// =============================================================================
// Fixture builders
// =============================================================================

pub fn color(id: &str, name: &str) -> ColorRecord {
    ColorRecord {
        id: id.to_string(),
        display_name: name.to_string(),
        hex_code: None,
        is_active: true,
    }
}

pub fn size(id: &str, name: &str, category: &str) -> SizeRecord {
    SizeRecord {
        id: id.to_string(),
        display_name: name.to_string(),
        category: category.to_string(),
        sort_order: 0,
        is_active: true,
    }
}

pub fn axis(id: &str, name: &str, generating: bool) -> AttributeAxisRecord {
    AttributeAxisRecord {
        id: id.to_string(),
        name: name.to_string(),
        is_variant_generating: generating,
        is_active: true,
    }
}

pub fn attr_value(id: &str, axis: &str, name: &str, modifier: &str) -> AttributeValueRecord {
    AttributeValueRecord {
        id: id.to_string(),
        attribute: Some(axis.to_string()),
        display_name: name.to_string(),
        price_modifier: modifier.parse::<Decimal>().unwrap(),
        is_active: true,
    }
}

/// A phone-shaped master data set: 2 colors, 1 storage axis with 2 values,
/// 1 ram axis with 2 values, giving a 2x2x2 expansion.
pub fn phone_master() -> Arc<MemoryMasterData> {
    init_tracing();
    let mut master = MemoryMasterData::default();
    master.groups.insert(
        "product_group:iphone".to_string(),
        ProductGroupRecord {
            id: "product_group:iphone".to_string(),
            name: "iPhone 15".to_string(),
            slug: "iphone-15".to_string(),
            brand: Some("Apple".to_string()),
        },
    );
    master
        .colors
        .insert("color:black".to_string(), color("color:black", "Black Titanium"));
    master
        .colors
        .insert("color:blue".to_string(), color("color:blue", "Blue Titanium"));
    master
        .axes
        .insert("attribute:storage".to_string(), axis("attribute:storage", "Storage", true));
    master
        .axes
        .insert("attribute:ram".to_string(), axis("attribute:ram", "RAM", true));
    master.values.insert(
        "attribute_value:128gb".to_string(),
        attr_value("attribute_value:128gb", "attribute:storage", "128GB", "0"),
    );
    master.values.insert(
        "attribute_value:256gb".to_string(),
        attr_value("attribute_value:256gb", "attribute:storage", "256GB", "100"),
    );
    master.values.insert(
        "attribute_value:8gb".to_string(),
        attr_value("attribute_value:8gb", "attribute:ram", "8GB", "0"),
    );
    master.values.insert(
        "attribute_value:16gb".to_string(),
        attr_value("attribute_value:16gb", "attribute:ram", "16GB", "50"),
    );
    Arc::new(master)
}

pub fn phone_request() -> GenerationRequest {
    GenerationRequest {
        product_group_id: "product_group:iphone".to_string(),
        brand: Some("Apple".to_string()),
        base_price: Some(999.0),
        tenant_id: None,
        base_dimensions: BaseDimensions {
            color: vec!["color:black".to_string(), "color:blue".to_string()],
            size: vec![],
        },
        attribute_dimensions: vec![
            AttributeAxisInput {
                attribute_id: "attribute:ram".to_string(),
                values: vec![
                    "attribute_value:8gb".to_string(),
                    "attribute_value:16gb".to_string(),
                ],
                disabled: false,
            },
            AttributeAxisInput {
                attribute_id: "attribute:storage".to_string(),
                values: vec![
                    "attribute_value:128gb".to_string(),
                    "attribute_value:256gb".to_string(),
                ],
                disabled: false,
            },
        ],
        max_combinations: None,
    }
}
