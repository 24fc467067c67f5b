//! Price resolution log
//!
//! Whenever a price-affecting input changes (base price, attribute price
//! modifiers) the resolution log is recomputed from scratch: one entry per
//! contributing source in application order, then the final price.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One entry in a variant's price resolution log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResolutionEntry {
    /// Contributing source, e.g. `base` or an attribute value id
    pub source: String,
    /// Signed amount contributed by this source
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// Application order, starting at 0 for the base price
    pub applied_order: u32,
}

/// Recompute the resolution log and the final price.
///
/// The base price is entry 0; each `(source, modifier)` pair follows in the
/// given order. The final price never goes below zero.
pub fn resolve_price(
    base_price: Decimal,
    modifiers: &[(String, Decimal)],
) -> (Decimal, Vec<PriceResolutionEntry>) {
    let mut log = Vec::with_capacity(modifiers.len() + 1);
    log.push(PriceResolutionEntry {
        source: "base".to_string(),
        amount: base_price,
        applied_order: 0,
    });

    let mut total = base_price;
    for (order, (source, amount)) in modifiers.iter().enumerate() {
        total += *amount;
        log.push(PriceResolutionEntry {
            source: source.clone(),
            amount: *amount,
            applied_order: (order + 1) as u32,
        });
    }

    (total.max(Decimal::ZERO), log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;

    #[test]
    fn test_base_only() {
        let (total, log) = resolve_price(Decimal::new(9_99, 2), &[]);
        assert_eq!(total, Decimal::new(9_99, 2));
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].source, "base");
        assert_eq!(log[0].applied_order, 0);
    }

    #[test]
    fn test_modifiers_applied_in_order() {
        let modifiers = vec![
            ("attribute_value:ram16".to_string(), Decimal::new(50_00, 2)),
            ("attribute_value:ssd512".to_string(), Decimal::new(-10_00, 2)),
        ];
        let (total, log) = resolve_price(Decimal::new(100_00, 2), &modifiers);
        assert_eq!(total, Decimal::new(140_00, 2));
        assert_eq!(log.len(), 3);
        assert_eq!(log[1].applied_order, 1);
        assert_eq!(log[2].source, "attribute_value:ssd512");
    }

    #[test]
    fn test_price_floors_at_zero() {
        let modifiers = vec![("discount".to_string(), Decimal::new(-200_00, 2))];
        let (total, _) = resolve_price(Decimal::new(100_00, 2), &modifiers);
        assert_eq!(total, Decimal::ZERO);
    }
}
