//! Master-data repository
//!
//! Read-only lookups, one batched `IN` query per entity type. Missing ids
//! simply come back absent; placeholder synthesis is the enrichment
//! layer's concern, not ours.

use super::{record_id, BaseRepository, RepoResult};
use crate::db::models::{
    AttributeAxisRecord, AttributeValueRecord, ColorRecord, ProductGroupRecord, SizeRecord,
};
use crate::services::MasterDataLookup;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct SurrealMasterData {
    base: BaseRepository,
}

impl SurrealMasterData {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn load_batch<T>(&self, table: &str, ids: &[String]) -> RepoResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rids: Vec<RecordId> = ids.iter().map(|id| record_id(table, id)).collect();
        let records: Vec<T> = self
            .base
            .db()
            .query(format!("SELECT * FROM {table} WHERE id IN $ids"))
            .bind(("ids", rids))
            .await?
            .take(0)?;
        Ok(records)
    }
}

#[async_trait]
impl MasterDataLookup for SurrealMasterData {
    async fn load_product_group(&self, id: &str) -> RepoResult<Option<ProductGroupRecord>> {
        let group: Option<ProductGroupRecord> = self
            .base
            .db()
            .select(record_id("product_group", id))
            .await?;
        Ok(group)
    }

    async fn load_colors(&self, ids: &[String]) -> RepoResult<Vec<ColorRecord>> {
        self.load_batch("color", ids).await
    }

    async fn load_sizes(&self, ids: &[String]) -> RepoResult<Vec<SizeRecord>> {
        self.load_batch("size", ids).await
    }

    async fn load_attribute_axes(&self, ids: &[String]) -> RepoResult<Vec<AttributeAxisRecord>> {
        self.load_batch("attribute", ids).await
    }

    async fn load_attribute_values(
        &self,
        ids: &[String],
    ) -> RepoResult<Vec<AttributeValueRecord>> {
        self.load_batch("attribute_value", ids).await
    }
}
