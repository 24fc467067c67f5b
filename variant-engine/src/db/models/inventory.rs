//! Inventory placeholder model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Zero-stock placeholder created for every generated variant so downstream
/// stock tooling never sees a variant without an inventory row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// "inventory:xxx", keyed by the variant's key for idempotency
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::serde_helpers::flexible_id"
    )]
    pub id: Option<String>,
    /// "variant:xxx"
    pub variant: String,
    /// "product_group:xxx"
    pub product_group: String,
    #[serde(default)]
    pub on_hand: i64,
    pub created_at: DateTime<Utc>,
}
