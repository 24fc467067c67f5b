//! Cartesian expansion with explosion guards
//!
//! The combination count is computed in O(D) without materializing anything,
//! checked against a hard system cap and a caller-configured soft limit, and
//! only then expanded. Expansion is iterative (an accumulator that is
//! re-crossed axis by axis), never recursive, so deep axis lists cannot blow
//! the stack. [`lazy::CombinationIter`] produces the identical sequence
//! on demand with O(D) state.

use crate::error::{EngineError, EngineResult};
use crate::limits::HARD_CAP_COMBINATIONS;
use crate::normalize::{Dimension, DimensionValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod lazy;

pub use lazy::CombinationIter;

/// One element of the Cartesian product: exactly one value per active axis.
///
/// `combination_key` is for human legibility only; the configHash computed
/// by the identity builder is the uniqueness authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combination {
    /// axis key -> selected value
    pub selections: BTreeMap<String, DimensionValue>,
    /// Original axis key order of the request
    pub dimension_order: Vec<String>,
    /// Slug-join of the selected values in `dimension_order`
    pub combination_key: String,
}

impl Combination {
    fn from_selection(active: &[&Dimension], indices: &[usize]) -> Self {
        let dimension_order: Vec<String> = active.iter().map(|d| d.key.clone()).collect();
        let mut selections = BTreeMap::new();
        let mut key_parts = Vec::with_capacity(active.len());
        for (dim, &vi) in active.iter().zip(indices) {
            let value = dim.values[vi].clone();
            key_parts.push(value.slug.clone());
            selections.insert(dim.key.clone(), value);
        }
        Self {
            selections,
            dimension_order,
            combination_key: key_parts.join("-"),
        }
    }
}

/// Count combinations over the active dimensions without materializing.
///
/// Returns 0 when no dimension is active — "nothing to generate" is distinct
/// from "one implicit empty combination". Saturates at `u64::MAX` instead of
/// wrapping; the guard rejects anything near that long before.
pub fn count_combinations(dims: &[Dimension]) -> u64 {
    let mut active = dims.iter().filter(|d| d.is_active()).peekable();
    if active.peek().is_none() {
        return 0;
    }
    active.fold(1u64, |acc, d| {
        acc.saturating_mul(d.values.len() as u64)
    })
}

/// Enforce the explosion caps on a pre-computed combination count.
///
/// The hard cap is absolute and independent of caller-supplied limits; the
/// soft limit is the caller's configured ceiling. Both failures carry the
/// actual and the allowed count.
pub fn guard_explosion(count: u64, soft_limit: u64) -> EngineResult<()> {
    if count > HARD_CAP_COMBINATIONS {
        return Err(EngineError::HardCapExceeded {
            actual: count,
            cap: HARD_CAP_COMBINATIONS,
        });
    }
    if count > soft_limit {
        return Err(EngineError::SoftLimitExceeded {
            actual: count,
            limit: soft_limit,
        });
    }
    Ok(())
}

/// Eagerly expand the active dimensions into every combination.
///
/// Inactive axes (disabled or empty) are excluded entirely; if nothing is
/// active the result is an empty vector, not an error. The same normalized
/// input yields a byte-identical combination sequence on every call.
pub fn expand(dims: &[Dimension], max_combinations: u64) -> EngineResult<Vec<Combination>> {
    let active: Vec<&Dimension> = dims.iter().filter(|d| d.is_active()).collect();
    if active.is_empty() {
        return Ok(Vec::new());
    }

    let count = count_combinations(dims);
    guard_explosion(count, max_combinations)?;

    // Iterative accumulator: one empty partial selection, then for each axis
    // the flat cross of every existing partial with every value of that axis.
    let mut acc: Vec<Vec<usize>> = vec![Vec::new()];
    for dim in &active {
        let mut next = Vec::with_capacity(acc.len() * dim.values.len());
        for partial in &acc {
            for value_idx in 0..dim.values.len() {
                let mut extended = Vec::with_capacity(partial.len() + 1);
                extended.extend_from_slice(partial);
                extended.push(value_idx);
                next.push(extended);
            }
        }
        acc = next;
    }

    tracing::debug!(
        combinations = acc.len(),
        axes = active.len(),
        "expanded dimension set"
    );

    Ok(acc
        .iter()
        .map(|indices| Combination::from_selection(&active, indices))
        .collect())
}

/// Lazy counterpart of [`expand`]: identical sequence, produced on demand.
///
/// The iterator holds O(D) state and supports early termination without side
/// effects; each call to this function restarts from the first combination.
pub fn expand_lazy<'a>(
    dims: &'a [Dimension],
    max_combinations: u64,
) -> EngineResult<CombinationIter<'a>> {
    let active: Vec<&Dimension> = dims.iter().filter(|d| d.is_active()).collect();
    if !active.is_empty() {
        guard_explosion(count_combinations(dims), max_combinations)?;
    }
    Ok(CombinationIter::new(active))
}
