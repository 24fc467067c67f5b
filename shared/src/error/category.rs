//! Error category classification

use serde::{Deserialize, Serialize};

/// Error category classification
///
/// Categories group codes by the layer that can act on them: input and
/// identity errors are caller-fixable and never retried; explosion errors
/// abort before any storage work; lifecycle errors report governance
/// violations; system errors are the only retryable class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors
    General,
    /// Request shape errors (caller-fixable)
    Input,
    /// Combination identity errors (caller-fixable)
    Identity,
    /// Combination count guard errors
    Explosion,
    /// Status machine and governance errors
    Lifecycle,
    /// Storage and internal errors
    System,
}

impl ErrorCategory {
    /// Whether errors in this category may be retried by the engine
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::System)
    }
}
