//! Canonical identity construction
//!
//! A combination's identity is the SHA-256 of its sorted, pipe-joined
//! segment list, scoped to the owning product group. Segment order is a
//! fixed namespace priority (color, then sizes by category, then attributes
//! by axis id), never the ASCII order of the rendered segment, so the
//! ordering stays stable even if the literal prefixes change.

use crate::error::{EngineError, EngineResult};
use crate::limits::CANONICAL_MAX_BYTES;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;


/// Sentinel axis for attribute entries whose owning axis id does not
/// resolve. The value's presence still reaches the hash; the cardinality
/// validator treats all sentinel entries as one axis, so two unresolvable
/// axes in one combination are rejected instead of silently colliding.
pub const UNKNOWN_AXIS: &str = "unknown";

/// One `(category, size)` selection on a variant. Categories are unique
/// per variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeSelection {
    pub category: String,
    pub size_id: String,
}

/// One `(axis, value)` attribute selection on a variant. Axis ids are
/// unique per variant (the cardinality invariant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSelection {
    pub attribute_id: Option<String>,
    pub value_id: String,
}

/// The identity-bearing fields of a variant, the pure input of configHash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentitySelection {
    pub color_id: Option<String>,
    #[serde(default)]
    pub sizes: Vec<SizeSelection>,
    #[serde(default)]
    pub attributes: Vec<AttributeSelection>,
}

/// One typed identity segment. Derived fact, never stored; only the sorted,
/// pipe-joined concatenation is hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Color { id: String },
    Size { category: String, id: String },
    Attr { axis: String, id: String },
}

impl Segment {
    /// Namespace priority, then sub-key, then value id
    fn sort_key(&self) -> (u8, &str, &str) {
        match self {
            Segment::Color { id } => (1, "", id),
            Segment::Size { category, id } => (2, category, id),
            Segment::Attr { axis, id } => (3, axis, id),
        }
    }

    fn render(&self) -> String {
        match self {
            Segment::Color { id } => format!("COLOR:{id}"),
            Segment::Size { category, id } => format!("SIZE:{category}:{id}"),
            Segment::Attr { axis, id } => format!("ATTR:{axis}:{id}"),
        }
    }
}

/// Canonicalize a raw id: trim, lowercase. `None` for anything empty or for
/// the literal `[object object]` left behind by accidental stringification
/// of a foreign record.
pub fn normalize_id(raw: &str) -> Option<String> {
    let id = raw.trim().to_lowercase();
    if id.is_empty() || id == "[object object]" {
        return None;
    }
    Some(id)
}

/// Build the sorted segment list for a selection.
///
/// A color segment is emitted only if the color id resolves; a size segment
/// only if both category and size id resolve. An attribute segment is
/// emitted whenever the value id resolves — an unresolvable axis id falls
/// back to [`UNKNOWN_AXIS`] rather than dropping the value from the hash.
pub fn build_segments(selection: &IdentitySelection) -> Vec<Segment> {
    let mut segments = Vec::new();

    if let Some(id) = selection.color_id.as_deref().and_then(normalize_id) {
        segments.push(Segment::Color { id });
    }

    for size in &selection.sizes {
        let category = normalize_id(&size.category);
        let id = normalize_id(&size.size_id);
        if let (Some(category), Some(id)) = (category, id) {
            segments.push(Segment::Size { category, id });
        }
    }

    for attr in &selection.attributes {
        let Some(id) = normalize_id(&attr.value_id) else {
            continue;
        };
        let axis = attr
            .attribute_id
            .as_deref()
            .and_then(normalize_id)
            .unwrap_or_else(|| UNKNOWN_AXIS.to_string());
        segments.push(Segment::Attr { axis, id });
    }

    segments.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    segments
}

/// Join the sorted segments into the canonical identity string.
///
/// Fails with [`EngineError::NoValidDimensions`] when zero segments
/// resolve, and with [`EngineError::IdentityTooLarge`] when the UTF-8
/// byte length exceeds the fixed cap.
pub fn build_canonical_string(selection: &IdentitySelection) -> EngineResult<String> {
    let segments = build_segments(selection);
    if segments.is_empty() {
        return Err(EngineError::NoValidDimensions);
    }
    let canonical = segments
        .iter()
        .map(Segment::render)
        .collect::<Vec<_>>()
        .join("|");
    if canonical.len() > CANONICAL_MAX_BYTES {
        return Err(EngineError::IdentityTooLarge {
            bytes: canonical.len(),
            max: CANONICAL_MAX_BYTES,
        });
    }
    Ok(canonical)
}

/// Compute the 64-hex configHash for a selection, scoped to its product
/// group: `SHA256(normalize_id(product_group_id) + "::" + canonical)`.
pub fn build_config_hash(
    product_group_id: &str,
    selection: &IdentitySelection,
) -> EngineResult<String> {
    let group = normalize_id(product_group_id).ok_or(EngineError::MissingProductGroup)?;
    let canonical = build_canonical_string(selection)?;

    let mut hasher = Sha256::new();
    hasher.update(group.as_bytes());
    hasher.update(b"::");
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Enforce the cardinality invariant: at most one value per attribute axis
/// per combination. All [`UNKNOWN_AXIS`] entries count as one axis.
///
/// Fails the moment the same normalized axis id appears twice, reporting
/// the axis and both conflicting value ids.
pub fn validate_cardinality(attributes: &[AttributeSelection]) -> EngineResult<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for attr in attributes {
        let axis = attr
            .attribute_id
            .as_deref()
            .and_then(normalize_id)
            .unwrap_or_else(|| UNKNOWN_AXIS.to_string());
        if let Some(first) = seen.insert(axis.clone(), &attr.value_id) {
            return Err(EngineError::CardinalityViolation {
                axis,
                first: first.to_string(),
                second: attr.value_id.clone(),
            });
        }
    }
    Ok(())
}
