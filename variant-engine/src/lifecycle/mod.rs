//! Variant lifecycle and governance
//!
//! The transition table is pure data checked before any write; the write
//! itself is a version-checked compare-and-swap at the storage boundary.
//! Entering ACTIVE locks the identity-bearing fields; from then on the only
//! way to change a variant's combination is archive-and-recreate.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod manager;
pub mod price;

pub use manager::LifecycleManager;
pub use price::{resolve_price, PriceResolutionEntry};

/// Variant lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariantStatus {
    Draft,
    Active,
    OutOfStock,
    Locked,
    Archived,
}

impl VariantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::OutOfStock => "OUT_OF_STOCK",
            Self::Locked => "LOCKED",
            Self::Archived => "ARCHIVED",
        }
    }

    /// The transition table. ARCHIVED is terminal: no outgoing transitions.
    pub fn allowed_next(&self) -> &'static [VariantStatus] {
        match self {
            Self::Draft => &[Self::Active, Self::Archived],
            Self::Active => &[Self::OutOfStock, Self::Archived, Self::Locked],
            Self::OutOfStock => &[Self::Active, Self::Archived],
            Self::Locked => &[Self::Active, Self::Archived],
            Self::Archived => &[],
        }
    }
}

impl fmt::Display for VariantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a variant's governance block is locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockReason {
    /// Implied by entering ACTIVE
    Activation,
    /// Explicit operator lock
    Manual,
    /// Stock-driven hold
    Stock,
}

/// Governance block persisted on every variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Governance {
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub lock_reason: Option<LockReason>,
    /// Optimistic-concurrency counter, bumped by every guarded write
    #[serde(default)]
    pub version: u64,
}

impl Default for Governance {
    fn default() -> Self {
        Self {
            is_locked: false,
            lock_reason: None,
            version: 0,
        }
    }
}

/// Check a transition against the table.
pub fn validate_transition(from: VariantStatus, to: VariantStatus) -> EngineResult<()> {
    if from.allowed_next().contains(&to) {
        Ok(())
    } else {
        Err(EngineError::InvalidTransition { from, to })
    }
}

/// Whether the identity-bearing fields of a variant are frozen.
pub fn identity_locked(status: VariantStatus, governance: &Governance) -> bool {
    status == VariantStatus::Active || governance.is_locked
}

/// Guard a mutation of one identity-bearing field.
pub fn guard_identity_field(
    status: VariantStatus,
    governance: &Governance,
    field: &str,
) -> EngineResult<()> {
    if identity_locked(status, governance) {
        return Err(EngineError::IdentityLocked {
            field: field.to_string(),
            status,
        });
    }
    Ok(())
}

/// Inventory-driven auto-transition between ACTIVE and OUT_OF_STOCK.
///
/// Returns the status the variant should move to, or `None` when no move is
/// needed. Suppressed entirely while the record is explicitly LOCKED or its
/// governance lock was taken for a non-stock reason other than activation.
pub fn auto_stock_transition(
    status: VariantStatus,
    governance: &Governance,
    on_hand: i64,
) -> Option<VariantStatus> {
    if status == VariantStatus::Locked {
        return None;
    }
    if governance.is_locked && governance.lock_reason == Some(LockReason::Manual) {
        return None;
    }
    match (status, on_hand) {
        (VariantStatus::Active, q) if q <= 0 => Some(VariantStatus::OutOfStock),
        (VariantStatus::OutOfStock, q) if q > 0 => Some(VariantStatus::Active),
        _ => None,
    }
}
