//! Fixed system ceilings and the pre-expansion limit guard
//!
//! These limits are evaluated against the raw request shape, before any
//! master-data load or expansion, so oversized requests are rejected without
//! touching storage. The ceilings are system constants, not configuration.

use crate::error::{EngineError, EngineResult};
use shared::GenerationRequest;

/// Maximum attribute axes per request
pub const MAX_ATTR_DIMENSIONS: usize = 10;
/// Maximum total axes (color + size + attribute axes)
pub const MAX_AXES: usize = 12;
/// Maximum color values per request
pub const MAX_COLORS: usize = 50;
/// Maximum size values per request
pub const MAX_SIZES: usize = 50;
/// Maximum values on any single attribute axis
pub const MAX_VALUES_PER_AXIS: usize = 100;
/// Absolute ceiling on combination count, independent of caller limits
pub const HARD_CAP_COMBINATIONS: u64 = 10_000;
/// Byte cap on the canonical identity string
pub const CANONICAL_MAX_BYTES: usize = 4096;

/// Validate the raw request shape against the fixed system ceilings.
///
/// Checks run in a fixed order: attribute-axis count, total axis count,
/// color count, size count, then per-axis value counts. The first violation
/// aborts with [`EngineError::LimitExceeded`] carrying the offending axis
/// and both counts.
pub fn validate_request_limits(req: &GenerationRequest) -> EngineResult<()> {
    let attr_axes = req
        .attribute_dimensions
        .iter()
        .filter(|a| !a.disabled)
        .count();
    if attr_axes > MAX_ATTR_DIMENSIONS {
        return Err(limit_exceeded("attribute_dimensions", attr_axes, MAX_ATTR_DIMENSIONS));
    }

    let total_axes = req.raw_axis_count();
    if total_axes > MAX_AXES {
        return Err(limit_exceeded("axes", total_axes, MAX_AXES));
    }

    let colors = req.base_dimensions.color.len();
    if colors > MAX_COLORS {
        return Err(limit_exceeded("color", colors, MAX_COLORS));
    }

    let sizes = req.base_dimensions.size.len();
    if sizes > MAX_SIZES {
        return Err(limit_exceeded("size", sizes, MAX_SIZES));
    }

    for axis in req.attribute_dimensions.iter().filter(|a| !a.disabled) {
        if axis.values.len() > MAX_VALUES_PER_AXIS {
            return Err(limit_exceeded(
                &axis.attribute_id,
                axis.values.len(),
                MAX_VALUES_PER_AXIS,
            ));
        }
    }

    Ok(())
}

fn limit_exceeded(axis: &str, actual: usize, allowed: usize) -> EngineError {
    EngineError::LimitExceeded {
        axis: axis.to_string(),
        actual: actual as u64,
        allowed: allowed as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::request::{AttributeAxisInput, BaseDimensions};

    fn request_with(colors: usize, sizes: usize, axes: Vec<(usize, bool)>) -> GenerationRequest {
        GenerationRequest {
            product_group_id: "product_group:g1".into(),
            brand: None,
            base_price: None,
            tenant_id: None,
            base_dimensions: BaseDimensions {
                color: (0..colors).map(|i| format!("color:c{i}")).collect(),
                size: (0..sizes).map(|i| format!("size:s{i}")).collect(),
            },
            attribute_dimensions: axes
                .into_iter()
                .enumerate()
                .map(|(i, (n, disabled))| AttributeAxisInput {
                    attribute_id: format!("attribute:a{i}"),
                    values: (0..n).map(|j| format!("attribute_value:v{i}_{j}")).collect(),
                    disabled,
                })
                .collect(),
            max_combinations: None,
        }
    }

    #[test]
    fn test_accepts_within_limits() {
        let req = request_with(2, 3, vec![(4, false), (5, false)]);
        assert!(validate_request_limits(&req).is_ok());
    }

    #[test]
    fn test_rejects_too_many_attr_axes() {
        let req = request_with(0, 0, vec![(1, false); MAX_ATTR_DIMENSIONS + 1]);
        let err = validate_request_limits(&req).unwrap_err();
        match err {
            EngineError::LimitExceeded { axis, actual, allowed } => {
                assert_eq!(axis, "attribute_dimensions");
                assert_eq!(actual, (MAX_ATTR_DIMENSIONS + 1) as u64);
                assert_eq!(allowed, MAX_ATTR_DIMENSIONS as u64);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_disabled_axes_do_not_count() {
        let mut axes = vec![(1, true); 5];
        axes.extend(vec![(1, false); MAX_ATTR_DIMENSIONS]);
        let req = request_with(0, 0, axes);
        assert!(validate_request_limits(&req).is_ok());
    }

    #[test]
    fn test_rejects_too_many_colors() {
        let req = request_with(MAX_COLORS + 1, 0, vec![]);
        let err = validate_request_limits(&req).unwrap_err();
        assert!(matches!(err, EngineError::LimitExceeded { ref axis, .. } if axis == "color"));
    }

    #[test]
    fn test_rejects_oversized_axis_by_id() {
        let req = request_with(0, 0, vec![(MAX_VALUES_PER_AXIS + 1, false)]);
        let err = validate_request_limits(&req).unwrap_err();
        assert!(
            matches!(err, EngineError::LimitExceeded { ref axis, .. } if axis == "attribute:a0")
        );
    }
}
