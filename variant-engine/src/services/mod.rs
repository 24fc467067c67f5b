//! Collaborator traits the orchestrator is built over
//!
//! The generation pipeline never talks to concrete storage directly; it is
//! constructed over these traits so the write pipeline, master lookups,
//! inventory initialization and snapshot scheduling can each be swapped
//! (SurrealDB in production, in-memory fakes in tests) without lazy
//! resolution or hidden module cycles.

use crate::db::models::{
    AttributeAxisRecord, AttributeValueRecord, ColorRecord, ProductGroupRecord, SizeRecord,
    Variant, VariantUpdate,
};
use crate::db::repository::RepoResult;
use async_trait::async_trait;
use std::collections::HashSet;

pub mod snapshot;

pub use snapshot::{DebouncedSnapshotScheduler, SnapshotTarget};

/// Batched, read-only master-data lookup. One call per entity type per
/// generation request, each scoped to the union of ids actually referenced.
#[async_trait]
pub trait MasterDataLookup: Send + Sync {
    async fn load_product_group(&self, id: &str) -> RepoResult<Option<ProductGroupRecord>>;
    async fn load_colors(&self, ids: &[String]) -> RepoResult<Vec<ColorRecord>>;
    async fn load_sizes(&self, ids: &[String]) -> RepoResult<Vec<SizeRecord>>;
    async fn load_attribute_axes(&self, ids: &[String]) -> RepoResult<Vec<AttributeAxisRecord>>;
    async fn load_attribute_values(&self, ids: &[String])
        -> RepoResult<Vec<AttributeValueRecord>>;
}

/// Outcome of one unordered insert chunk
#[derive(Debug, Clone, Default)]
pub struct ChunkOutcome {
    /// Records actually created
    pub created: u64,
    /// Duplicate-key collisions lost to a concurrent writer
    pub race_duplicates: u64,
    /// Ids of the created records, for inventory initialization
    pub created_ids: Vec<String>,
}

/// The variant collection, the only resource this engine writes.
#[async_trait]
pub trait VariantStore: Send + Sync {
    /// Batched existence check over candidate hashes within one group
    async fn existing_hashes(
        &self,
        product_group: &str,
        hashes: &[String],
    ) -> RepoResult<HashSet<String>>;

    /// Unordered insert of one chunk. Duplicate-key failures are counted,
    /// not surfaced; any other failure aborts the chunk.
    async fn insert_chunk(&self, variants: Vec<Variant>) -> RepoResult<ChunkOutcome>;

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Variant>>;

    async fn list_by_group(&self, product_group: &str) -> RepoResult<Vec<Variant>>;

    /// Version-checked compare-and-swap write. Fails with
    /// [`crate::db::repository::RepoError::Conflict`] when the stored
    /// version does not match `expected_version`.
    async fn update_guarded(
        &self,
        id: &str,
        expected_version: u64,
        patch: &VariantUpdate,
    ) -> RepoResult<Variant>;

    /// Status + governance write, also version-checked.
    async fn update_status(
        &self,
        id: &str,
        expected_version: u64,
        status: crate::lifecycle::VariantStatus,
        governance: &crate::lifecycle::Governance,
    ) -> RepoResult<Variant>;
}

/// Inventory placeholder contract: ensure a zero-stock record exists for a
/// variant. Idempotent; failures are logged and reconciled out of band.
#[async_trait]
pub trait InventoryService: Send + Sync {
    async fn ensure_placeholder(&self, variant_id: &str, product_group: &str) -> RepoResult<()>;
}

/// Fire-and-forget snapshot recompute notification, debounced and coalesced
/// per product group by the implementation.
pub trait SnapshotScheduler: Send + Sync {
    fn schedule_recompute(&self, product_group: &str);
}
