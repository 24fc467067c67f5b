//! Generation and preview request types
//!
//! The preview request is shape-identical to the generation request; preview
//! is simply the read-only half of the same pipeline.

use serde::{Deserialize, Serialize};

/// One attribute axis in a generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeAxisInput {
    /// Owning attribute axis id (e.g. "attribute:ram")
    pub attribute_id: String,
    /// Referenced attribute value ids
    #[serde(default)]
    pub values: Vec<String>,
    /// Disabled axes are excluded from expansion entirely
    #[serde(default)]
    pub disabled: bool,
}

/// Base (non-attribute) dimensions: color and size reference lists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseDimensions {
    #[serde(default)]
    pub color: Vec<String>,
    #[serde(default)]
    pub size: Vec<String>,
}

/// A variant generation request
///
/// Consumed by the generation orchestrator (write path) and the preview
/// service (read-only path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Owning product group id
    pub product_group_id: String,
    /// Brand name, used for the SKU prefix token
    pub brand: Option<String>,
    /// Base price applied to every generated variant
    pub base_price: Option<f64>,
    /// Tenant scope (passthrough, not part of identity)
    pub tenant_id: Option<String>,
    /// Color / size reference lists
    #[serde(default)]
    pub base_dimensions: BaseDimensions,
    /// Attribute axes with their value id lists
    #[serde(default)]
    pub attribute_dimensions: Vec<AttributeAxisInput>,
    /// Caller-configured soft cap on combination count
    pub max_combinations: Option<u64>,
}

impl GenerationRequest {
    /// Count the axes present in the raw request shape, before expansion.
    ///
    /// Color and size each count as one axis when non-empty; every
    /// non-disabled attribute axis counts as one.
    pub fn raw_axis_count(&self) -> usize {
        let mut count = self
            .attribute_dimensions
            .iter()
            .filter(|a| !a.disabled)
            .count();
        if !self.base_dimensions.color.is_empty() {
            count += 1;
        }
        if !self.base_dimensions.size.is_empty() {
            count += 1;
        }
        count
    }
}
