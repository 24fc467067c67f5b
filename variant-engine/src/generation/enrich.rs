//! Master-data loading and dimension enrichment
//!
//! One batched query per referenced entity type, scoped to the union of ids
//! the request actually references. A referenced id missing from master
//! data degrades to a synthesized placeholder (logged) instead of aborting
//! the batch — partial availability must not block the combinations that
//! are resolvable.

use crate::error::EngineResult;
use crate::expansion::Combination;
use crate::identity::{AttributeSelection, IdentitySelection, SizeSelection};
use crate::normalize::{Dimension, DimensionValue};
use crate::services::MasterDataLookup;
use rust_decimal::Decimal;
use shared::GenerationRequest;
use std::collections::{HashMap, HashSet};

/// Axis key reserved for the color dimension
pub const COLOR_AXIS: &str = "color";
/// Axis key reserved for the size dimension
pub const SIZE_AXIS: &str = "size";

/// The request's dimensions joined with their master records.
#[derive(Debug, Default)]
pub struct EnrichedDimensions {
    pub dimensions: Vec<Dimension>,
    /// attribute value id -> price modifier, for the resolution log
    pub price_modifiers: HashMap<String, Decimal>,
}

/// Load master data for every id the request references and build the
/// canonical dimension list, in request order: color, size, then the
/// attribute axes.
pub async fn load_and_enrich(
    master: &dyn MasterDataLookup,
    req: &GenerationRequest,
) -> EngineResult<EnrichedDimensions> {
    let mut enriched = EnrichedDimensions::default();

    // ---- colors ----
    if !req.base_dimensions.color.is_empty() {
        let found: HashMap<String, _> = master
            .load_colors(&req.base_dimensions.color)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        let mut dim = Dimension::new(COLOR_AXIS, "Color");
        for id in dedup(&req.base_dimensions.color) {
            let record = found.get(&id).cloned().unwrap_or_else(|| {
                tracing::warn!(color = %id, "color missing from master data, using placeholder");
                crate::db::models::ColorRecord::placeholder(&id)
            });
            if !record.is_active {
                continue;
            }
            let mut value = DimensionValue::new(record.id, record.display_name);
            if let Some(hex) = record.hex_code {
                value = value.with_meta("hex_code", hex);
            }
            dim.values.push(value);
        }
        enriched.dimensions.push(dim);
    }

    // ---- sizes ----
    if !req.base_dimensions.size.is_empty() {
        let found: HashMap<String, _> = master
            .load_sizes(&req.base_dimensions.size)
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let mut dim = Dimension::new(SIZE_AXIS, "Size");
        for id in dedup(&req.base_dimensions.size) {
            let record = found.get(&id).cloned().unwrap_or_else(|| {
                tracing::warn!(size = %id, "size missing from master data, using placeholder");
                crate::db::models::SizeRecord::placeholder(&id)
            });
            if !record.is_active {
                continue;
            }
            dim.values.push(
                DimensionValue::new(record.id, record.display_name)
                    .with_meta("category", record.category),
            );
        }
        enriched.dimensions.push(dim);
    }

    // ---- attribute axes ----
    let enabled: Vec<_> = req
        .attribute_dimensions
        .iter()
        .filter(|a| !a.disabled)
        .collect();
    if !enabled.is_empty() {
        let axis_ids: Vec<String> = enabled.iter().map(|a| a.attribute_id.clone()).collect();
        let axes: HashMap<String, _> = master
            .load_attribute_axes(&axis_ids)
            .await?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();

        let value_ids: Vec<String> = enabled
            .iter()
            .flat_map(|a| a.values.iter().cloned())
            .collect();
        let values: HashMap<String, _> = master
            .load_attribute_values(&value_ids)
            .await?
            .into_iter()
            .map(|v| (v.id.clone(), v))
            .collect();

        for axis_input in enabled {
            // Descriptive axes never take part in identity
            let generating = axes
                .get(&axis_input.attribute_id)
                .map(|a| a.is_variant_generating && a.is_active)
                .unwrap_or_else(|| {
                    tracing::warn!(
                        axis = %axis_input.attribute_id,
                        "attribute axis missing from master data, treating as variant-generating"
                    );
                    true
                });
            if !generating {
                tracing::debug!(
                    axis = %axis_input.attribute_id,
                    "skipping non-variant-generating axis"
                );
                continue;
            }

            let label = axes
                .get(&axis_input.attribute_id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| axis_input.attribute_id.clone());
            let mut dim = Dimension::new(axis_input.attribute_id.clone(), label);
            for id in dedup(&axis_input.values) {
                let record = values.get(&id).cloned().unwrap_or_else(|| {
                    tracing::warn!(
                        value = %id,
                        "attribute value missing from master data, using placeholder"
                    );
                    crate::db::models::AttributeValueRecord::placeholder(&id)
                });
                if !record.is_active {
                    continue;
                }
                if record.price_modifier != Decimal::ZERO {
                    enriched
                        .price_modifiers
                        .insert(record.id.clone(), record.price_modifier);
                }
                dim.values
                    .push(DimensionValue::new(record.id, record.display_name));
            }
            enriched.dimensions.push(dim);
        }
    }

    Ok(enriched)
}

/// Map one expanded combination back onto the identity-bearing selection.
///
/// The `color`/`size` axis keys are reserved; every other axis key is an
/// attribute axis id. Size categories travel in the value's meta.
pub fn selection_for(combination: &Combination) -> IdentitySelection {
    let mut selection = IdentitySelection::default();
    for (axis, value) in &combination.selections {
        match axis.as_str() {
            COLOR_AXIS => selection.color_id = Some(value.id.clone()),
            SIZE_AXIS => {
                let category = value
                    .meta
                    .get("category")
                    .and_then(|c| c.as_str())
                    .unwrap_or("general")
                    .to_string();
                selection.sizes.push(SizeSelection {
                    category,
                    size_id: value.id.clone(),
                });
            }
            _ => selection.attributes.push(AttributeSelection {
                attribute_id: Some(axis.clone()),
                value_id: value.id.clone(),
            }),
        }
    }
    selection
}

fn dedup(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
