//! Inventory repository
//!
//! The placeholder row is keyed by the variant's key, which makes the
//! ensure call idempotent: a second attempt hits the existing record and
//! is a no-op.

use super::{record_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::InventoryRecord;
use crate::services::InventoryService;
use async_trait::async_trait;
use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

const TABLE: &str = "inventory";

#[derive(Clone)]
pub struct SurrealInventory {
    base: BaseRepository,
}

impl SurrealInventory {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl InventoryService for SurrealInventory {
    async fn ensure_placeholder(&self, variant_id: &str, product_group: &str) -> RepoResult<()> {
        let variant_key = record_id("variant", variant_id).key().to_string();
        let record = InventoryRecord {
            id: None,
            variant: variant_id.to_string(),
            product_group: product_group.to_string(),
            on_hand: 0,
            created_at: Utc::now(),
        };
        let created: Result<Option<InventoryRecord>, surrealdb::Error> = self
            .base
            .db()
            .create((TABLE, variant_key))
            .content(record)
            .await;
        match created {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = RepoError::from(e);
                // Already present, nothing to do
                if err.is_duplicate() {
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }
}
