//! Database module
//!
//! Embedded SurrealDB, RocksDB-backed on disk or in-memory for tests. The
//! schema layer is intentionally thin: tables are schemaless, and the one
//! constraint the engine depends on is the unique index over
//! `(product_group, config_hash)` that turns concurrent identity races
//! into duplicate-key errors.

pub mod models;
pub mod repository;

use repository::{RepoError, RepoResult};
use std::path::Path;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;

const NAMESPACE: &str = "variant_engine";
const DATABASE: &str = "main";

/// Schema statements applied on every startup; all idempotent.
const SCHEMA: &[&str] = &[
    "DEFINE TABLE IF NOT EXISTS variant SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS variant_identity ON TABLE variant FIELDS product_group, config_hash UNIQUE",
    "DEFINE INDEX IF NOT EXISTS variant_group ON TABLE variant FIELDS product_group",
    "DEFINE TABLE IF NOT EXISTS inventory SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS inventory_variant ON TABLE inventory FIELDS variant UNIQUE",
];

/// Open the on-disk database and apply the schema.
pub async fn connect(path: &Path) -> RepoResult<Surreal<Db>> {
    let db: Surreal<Db> = Surreal::new::<RocksDb>(path)
        .await
        .map_err(|e| RepoError::Database(format!("Failed to open database: {e}")))?;
    init(&db).await?;
    tracing::info!(path = %path.display(), "database connection established");
    Ok(db)
}

/// In-memory database, used by the integration tests.
pub async fn connect_memory() -> RepoResult<Surreal<Db>> {
    let db: Surreal<Db> = Surreal::new::<Mem>(())
        .await
        .map_err(|e| RepoError::Database(format!("Failed to open in-memory database: {e}")))?;
    init(&db).await?;
    Ok(db)
}

async fn init(db: &Surreal<Db>) -> RepoResult<()> {
    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(RepoError::from)?;
    for stmt in SCHEMA {
        db.query(*stmt).await.map_err(RepoError::from)?;
    }
    tracing::debug!(statements = SCHEMA.len(), "schema applied");
    Ok(())
}
