//! Generation and preview result types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of a generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    /// Records actually inserted by this request
    pub total_generated: u64,
    /// Candidates skipped because their identity already existed
    pub skipped: u64,
    /// Insert-time duplicate-key collisions lost to concurrent writers
    pub race_duplicates: u64,
    /// Correlation id stamped on every record of this batch
    pub batch_id: Option<String>,
}

/// One combination in a preview result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationView {
    /// Human-legible slug join of the selected values, in axis order
    pub combination_key: String,
    /// 64-hex canonical identity, the uniqueness authority
    pub config_hash: String,
    /// axis key -> selected value label
    pub selections: BTreeMap<String, String>,
}

/// Result of a read-only preview request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResult {
    pub total_combinations: u64,
    /// axis label -> value count
    pub dimension_breakdown: BTreeMap<String, u64>,
    pub combinations: Vec<CombinationView>,
}
