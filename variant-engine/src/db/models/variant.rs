//! Variant record model
//!
//! A persisted variant owns at most one color reference, zero-or-more
//! `(category, size)` pairs with unique categories, and zero-or-more
//! `(axis, value)` attribute pairs with unique axes. `config_hash` is a
//! pure function of `(product_group, color, sizes, attribute_dimensions)`
//! and unique within the product group; any mutation of those fields must
//! pass the identity-lock guard.

use crate::identity::{AttributeSelection, IdentitySelection, SizeSelection};
use crate::lifecycle::{Governance, PriceResolutionEntry, VariantStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One `(category, size)` reference on a variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeRef {
    pub category: String,
    /// Size master record, "size:xxx"
    pub size: String,
}

/// One `(axis, value)` attribute reference on a variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRef {
    /// Owning attribute axis, "attribute:xxx"; None when the source record
    /// carried no resolvable axis id
    pub attribute: Option<String>,
    /// Attribute value record, "attribute_value:xxx"
    pub value: String,
}

/// Persisted variant record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    /// "variant:xxx"
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::serde_helpers::flexible_id"
    )]
    pub id: Option<String>,
    /// Owning product group, "product_group:xxx"
    pub product_group: String,
    /// Deterministic SKU
    pub sku: String,
    /// Human-legible slug join, display only
    pub combination_key: String,
    /// 64-hex canonical identity, unique within the product group
    pub config_hash: String,

    // Identity-bearing references
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub sizes: Vec<SizeRef>,
    #[serde(default)]
    pub attribute_dimensions: Vec<AttributeRef>,

    // Lifecycle
    pub status: VariantStatus,
    #[serde(default)]
    pub governance: Governance,

    // Pricing
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub final_price: Decimal,
    #[serde(default)]
    pub price_resolution: Vec<PriceResolutionEntry>,

    /// Generation batch correlation id
    #[serde(default)]
    pub generation_batch: Option<String>,
    /// Tenant scope passthrough
    #[serde(default)]
    pub tenant: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    /// Project the identity-bearing fields into the hash input form.
    pub fn identity_selection(&self) -> IdentitySelection {
        IdentitySelection {
            color_id: self.color.clone(),
            sizes: self
                .sizes
                .iter()
                .map(|s| SizeSelection {
                    category: s.category.clone(),
                    size_id: s.size.clone(),
                })
                .collect(),
            attributes: self
                .attribute_dimensions
                .iter()
                .map(|a| AttributeSelection {
                    attribute_id: a.attribute.clone(),
                    value_id: a.value.clone(),
                })
                .collect(),
        }
    }
}

/// Patch applied through the guarded CAS write.
///
/// Identity-bearing fields are present here because the DRAFT state allows
/// correcting them; the lifecycle guard rejects them once the variant is
/// locked. Status changes never travel through a patch — they go through
/// the transition API.
/// Unset fields are skipped on serialization so a MERGE patch only touches
/// what the caller set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<SizeRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_dimensions: Option<Vec<AttributeRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_group: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::str_option"
    )]
    pub base_price: Option<Decimal>,
    /// Derived; recomputed by the lifecycle manager, never set by callers
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::str_option"
    )]
    pub final_price: Option<Decimal>,
    /// Derived; recomputed alongside `final_price`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_resolution: Option<Vec<PriceResolutionEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

impl VariantUpdate {
    /// Names of the identity-bearing fields this patch touches.
    pub fn touched_identity_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.color.is_some() {
            fields.push("color");
        }
        if self.sizes.is_some() {
            fields.push("sizes");
        }
        if self.attribute_dimensions.is_some() {
            fields.push("attribute_dimensions");
        }
        if self.config_hash.is_some() {
            fields.push("config_hash");
        }
        if self.product_group.is_some() {
            fields.push("product_group");
        }
        fields
    }
}
