//! Repository module
//!
//! SurrealDB-backed implementations of the engine's storage traits. The
//! variant table carries a unique index on `(product_group, config_hash)`;
//! duplicate-key violations surface as [`RepoError::Duplicate`] so the
//! write pipeline can treat lost races as benign.

pub mod inventory;
pub mod master;
pub mod variant;

pub use inventory::SurrealInventory;
pub use master::SurrealMasterData;
pub use variant::SurrealVariantStore;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

// ID convention: the whole stack passes "table:id" strings; RecordId is
// confined to the repository layer.

/// Parse a "table:id" string, falling back to treating the whole input as
/// the key when it carries no table prefix.
pub(crate) fn record_id(table: &str, id: &str) -> RecordId {
    match id.parse::<RecordId>() {
        Ok(rid) if rid.table() == table => rid,
        _ => RecordId::from_table_key(table, id),
    }
}

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Transient write conflict, safe to retry
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl RepoError {
    /// Duplicate-key condition (unique index violation)
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RepoError::Duplicate(_))
    }

    /// Transient condition worth a backoff-and-retry
    pub fn is_transient(&self) -> bool {
        matches!(self, RepoError::Conflict(_))
    }
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // SurrealDB reports unique index violations as "index ... already
        // contains", record-id collisions as "already exists", and
        // optimistic txn failures as retryable conflicts
        if msg.contains("already contains") || msg.contains("already exists") {
            RepoError::Duplicate(msg)
        } else if msg.contains("try the transaction again") || msg.contains("timed out") {
            RepoError::Conflict(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
