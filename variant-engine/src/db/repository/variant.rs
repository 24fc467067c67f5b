//! Variant repository
//!
//! Insert-time identity safety comes from the unique index on
//! `(product_group, config_hash)`: a concurrent writer losing the race gets
//! a duplicate-key error, which this repository counts instead of
//! surfacing. Guarded writes are compare-and-swap on `governance.version`;
//! an empty CAS result is disambiguated into NotFound vs Conflict with a
//! follow-up read.

use super::{record_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{Variant, VariantUpdate};
use crate::lifecycle::{Governance, VariantStatus};
use crate::services::{ChunkOutcome, VariantStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;
use uuid::Uuid;

const TABLE: &str = "variant";

#[derive(Clone)]
pub struct SurrealVariantStore {
    base: BaseRepository,
}

impl SurrealVariantStore {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Re-read after an empty CAS result to tell a stale version apart
    /// from a missing record.
    async fn cas_miss(&self, id: &str) -> RepoError {
        match self.base.db().select::<Option<Variant>>(record_id(TABLE, id)).await {
            Ok(Some(_)) => RepoError::Conflict(format!("version mismatch on {id}")),
            Ok(None) => RepoError::NotFound(format!("Variant {id} not found")),
            Err(e) => e.into(),
        }
    }
}

#[async_trait]
impl VariantStore for SurrealVariantStore {
    async fn existing_hashes(
        &self,
        product_group: &str,
        hashes: &[String],
    ) -> RepoResult<HashSet<String>> {
        if hashes.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<String> = self
            .base
            .db()
            .query("SELECT VALUE config_hash FROM variant WHERE product_group = $group AND config_hash IN $hashes")
            .bind(("group", product_group.to_string()))
            .bind(("hashes", hashes.to_vec()))
            .await?
            .take(0)?;
        Ok(found.into_iter().collect())
    }

    async fn insert_chunk(&self, mut variants: Vec<Variant>) -> RepoResult<ChunkOutcome> {
        let dropped = crate::generation::orchestrator::dedup_by_hash(&mut variants);
        if dropped > 0 {
            tracing::warn!(dropped, "insert chunk carried in-batch duplicate hashes");
        }

        let mut outcome = ChunkOutcome::default();
        for mut variant in variants {
            let full_id = variant
                .id
                .take()
                .unwrap_or_else(|| format!("{TABLE}:{}", Uuid::new_v4().simple()));
            let rid = record_id(TABLE, &full_id);
            let created: Result<Option<Variant>, surrealdb::Error> =
                self.base.db().create(rid).content(variant).await;
            match created {
                Ok(Some(_)) => {
                    outcome.created += 1;
                    outcome.created_ids.push(full_id);
                }
                Ok(None) => {
                    return Err(RepoError::Database(format!(
                        "create returned no record for {full_id}"
                    )))
                }
                Err(e) => {
                    let err = RepoError::from(e);
                    if err.is_duplicate() {
                        tracing::debug!(variant = %full_id, "identity lost to concurrent writer");
                        outcome.race_duplicates += 1;
                    } else {
                        return Err(err);
                    }
                }
            }
        }
        Ok(outcome)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Variant>> {
        let variant: Option<Variant> = self.base.db().select(record_id(TABLE, id)).await?;
        Ok(variant)
    }

    async fn list_by_group(&self, product_group: &str) -> RepoResult<Vec<Variant>> {
        let variants: Vec<Variant> = self
            .base
            .db()
            .query("SELECT * FROM variant WHERE product_group = $group ORDER BY combination_key")
            .bind(("group", product_group.to_string()))
            .await?
            .take(0)?;
        Ok(variants)
    }

    async fn update_guarded(
        &self,
        id: &str,
        expected_version: u64,
        patch: &VariantUpdate,
    ) -> RepoResult<Variant> {
        let mut merge = serde_json::to_value(patch)
            .map_err(|e| RepoError::Validation(format!("unserializable patch: {e}")))?;
        merge["governance"] = serde_json::json!({ "version": expected_version + 1 });
        merge["updated_at"] = serde_json::json!(Utc::now());

        let updated: Vec<Variant> = self
            .base
            .db()
            .query("UPDATE $rid MERGE $patch WHERE governance.version = $expected RETURN AFTER")
            .bind(("rid", record_id(TABLE, id)))
            .bind(("patch", merge))
            .bind(("expected", expected_version))
            .await?
            .take(0)?;
        match updated.into_iter().next() {
            Some(v) => Ok(v),
            None => Err(self.cas_miss(id).await),
        }
    }

    async fn update_status(
        &self,
        id: &str,
        expected_version: u64,
        status: VariantStatus,
        governance: &Governance,
    ) -> RepoResult<Variant> {
        let mut governance = governance.clone();
        governance.version = expected_version + 1;

        let updated: Vec<Variant> = self
            .base
            .db()
            .query("UPDATE $rid SET status = $status, governance = $governance, updated_at = $now WHERE governance.version = $expected RETURN AFTER")
            .bind(("rid", record_id(TABLE, id)))
            .bind(("status", status))
            .bind(("governance", governance))
            .bind(("now", Utc::now()))
            .bind(("expected", expected_version))
            .await?
            .take(0)?;
        match updated.into_iter().next() {
            Some(v) => Ok(v),
            None => Err(self.cas_miss(id).await),
        }
    }
}
