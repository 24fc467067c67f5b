//! Dimension normalization
//!
//! Raw axis/value input arrives in three shapes: plain strings, foreign
//! records (with `id`/`_id`/`value`/`name` fields), or pre-shaped objects.
//! This is the only place those shapes are told apart; everything downstream
//! sees one canonical [`Dimension`] / [`DimensionValue`] form.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::util::to_slug;
use std::collections::{BTreeMap, HashSet};


/// One canonical value on an axis. Identity is `id`; two values with the
/// same id in one axis are the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionValue {
    pub id: String,
    pub label: String,
    /// Url-safe derived string, used only for human-legible combination keys
    pub slug: String,
    /// Arbitrary passthrough attributes (category, price modifier, ...)
    #[serde(default)]
    pub meta: BTreeMap<String, Value>,
}

impl DimensionValue {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            slug: to_slug(&label),
            label,
            meta: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// One canonical axis with its ordered value set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub values: Vec<DimensionValue>,
}

impl Dimension {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            disabled: false,
            values: Vec::new(),
        }
    }

    /// An axis takes part in expansion only if enabled and non-empty
    pub fn is_active(&self) -> bool {
        !self.disabled && !self.values.is_empty()
    }
}

// =============================================================================
// Raw input shapes
// =============================================================================

/// A raw axis value before normalization: either a bare primitive or a
/// record-like object. Resolved exactly once, at this boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Record(RawValueRecord),
}

/// Record-shaped raw value. Field priority for the identifier is
/// `id` > `_id` > `value` > `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawValueRecord {
    pub id: Option<Value>,
    #[serde(rename = "_id")]
    pub underscore_id: Option<Value>,
    pub value: Option<Value>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub slug: Option<String>,
    #[serde(flatten)]
    pub meta: BTreeMap<String, Value>,
}

/// Raw axis shape. Key priority is `key` > `attributeId` > `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDimension {
    pub key: Option<String>,
    #[serde(rename = "attributeId", alias = "attribute_id")]
    pub attribute_id: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub values: Vec<RawValue>,
}

// =============================================================================
// Normalization
// =============================================================================

/// Normalize one raw value on the axis `axis_key`.
pub fn normalize_value(raw: &RawValue, axis_key: &str) -> EngineResult<DimensionValue> {
    match raw {
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(EngineError::MissingIdentifier {
                    axis: axis_key.to_string(),
                });
            }
            Ok(DimensionValue {
                id: trimmed.to_string(),
                label: trimmed.to_string(),
                slug: to_slug(trimmed),
                meta: BTreeMap::new(),
            })
        }
        RawValue::Record(rec) => {
            let id = [&rec.id, &rec.underscore_id, &rec.value]
                .into_iter()
                .find_map(|v| v.as_ref().and_then(scalar_to_id))
                .or_else(|| rec.name.as_deref().map(str::to_string))
                .ok_or_else(|| EngineError::MissingIdentifier {
                    axis: axis_key.to_string(),
                })?;
            let label = rec
                .label
                .clone()
                .or_else(|| rec.name.clone())
                .unwrap_or_else(|| id.clone());
            let slug = rec
                .slug
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| to_slug(&label));
            Ok(DimensionValue {
                id,
                label,
                slug,
                meta: rec.meta.clone(),
            })
        }
    }
}

/// Normalize one raw axis at `position` in the request.
///
/// Values are deduplicated by id, preserving first-seen order.
pub fn normalize_dimension(raw: &RawDimension, position: usize) -> EngineResult<Dimension> {
    let key = raw
        .key
        .clone()
        .or_else(|| raw.attribute_id.clone())
        .or_else(|| raw.name.clone())
        .filter(|k| !k.trim().is_empty())
        .ok_or(EngineError::MissingAxisKey { position })?;

    let label = raw.label.clone().or_else(|| raw.name.clone()).unwrap_or_else(|| key.clone());

    let mut seen: HashSet<String> = HashSet::new();
    let mut values = Vec::with_capacity(raw.values.len());
    for raw_value in &raw.values {
        let value = normalize_value(raw_value, &key)?;
        if seen.insert(value.id.clone()) {
            values.push(value);
        }
    }

    Ok(Dimension {
        key,
        label,
        disabled: raw.disabled,
        values,
    })
}

/// Render a scalar JSON value as an identifier string. Objects and arrays
/// never become identifiers.
fn scalar_to_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
