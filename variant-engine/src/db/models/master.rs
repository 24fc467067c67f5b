//! Master-data models referenced by variants
//!
//! These records are read-only from the engine's perspective. Missing
//! references degrade to synthesized placeholders instead of aborting a
//! whole generation batch.

use super::serde_helpers::{self, default_true};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Color master record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorRecord {
    /// "color:xxx"
    #[serde(with = "serde_helpers::record_id")]
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub hex_code: Option<String>,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,
}

impl ColorRecord {
    /// Placeholder for a referenced id absent from the master table.
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: format!("Unknown color {id}"),
            hex_code: None,
            is_active: true,
        }
    }
}

/// Size master record; `category` scopes the size system (shoe, shirt, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeRecord {
    /// "size:xxx"
    #[serde(with = "serde_helpers::record_id")]
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,
}

impl SizeRecord {
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: format!("Unknown size {id}"),
            category: "general".to_string(),
            sort_order: 0,
            is_active: true,
        }
    }
}

/// Attribute axis record. Only variant-generating axes take part in
/// identity; descriptive axes are excluded from expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeAxisRecord {
    /// "attribute:xxx"
    #[serde(with = "serde_helpers::record_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_variant_generating: bool,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,
}

/// Attribute value record, owned by one axis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValueRecord {
    /// "attribute_value:xxx"
    #[serde(with = "serde_helpers::record_id")]
    pub id: String,
    /// Owning axis, "attribute:xxx"
    #[serde(default, with = "serde_helpers::flexible_id")]
    pub attribute: Option<String>,
    pub display_name: String,
    /// Price modifier applied on top of the base price
    #[serde(default, with = "rust_decimal::serde::str")]
    pub price_modifier: Decimal,
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,
}

impl AttributeValueRecord {
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            attribute: None,
            display_name: format!("Unknown attribute value {id}"),
            price_modifier: Decimal::ZERO,
            is_active: true,
        }
    }
}

/// Product group record, the variants' parent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductGroupRecord {
    /// "product_group:xxx"
    #[serde(with = "serde_helpers::record_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub brand: Option<String>,
}
