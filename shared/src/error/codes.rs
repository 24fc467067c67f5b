//! Unified error codes for the variant platform
//!
//! Error codes cross the process boundary as stable SCREAMING_SNAKE_CASE
//! strings so that non-Rust consumers (storefront, admin UI) can match on
//! them without a numeric lookup table. Codes are organized by category:
//! - input: caller-fixable request shape problems
//! - identity: malformed combination identity
//! - explosion: combination count guards
//! - lifecycle: status machine and governance violations
//! - system: storage and internal failures

use super::category::ErrorCategory;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// The serialized form is the canonical wire identifier, e.g.
/// `CARDINALITY_VIOLATION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ==================== General ====================
    /// Operation completed successfully
    Success,
    /// Unknown error
    Unknown,
    /// Generic validation failure
    ValidationFailed,
    /// Resource not found
    NotFound,
    /// Resource already exists
    AlreadyExists,
    /// A referenced dimension value does not exist or is malformed
    InvalidDimensionValue,

    // ==================== Input ====================
    /// A raw axis carries no resolvable key
    MissingAxisKey,
    /// A raw axis value carries no resolvable identifier
    MissingIdentifier,
    /// A fixed system ceiling was exceeded
    LimitExceeded,
    /// The same attribute axis appears twice in one combination
    CardinalityViolation,

    // ==================== Identity ====================
    /// A combination resolves to zero identity segments
    NoValidDimensions,
    /// The canonical identity string exceeds the byte cap
    IdentityTooLarge,
    /// The owning product group id does not resolve
    MissingProductGroup,

    // ==================== Explosion ====================
    /// Combination count exceeds the absolute system ceiling
    HardCapExceeded,
    /// Combination count exceeds the caller-configured limit
    SoftLimitExceeded,

    // ==================== Lifecycle ====================
    /// The requested status transition is not in the transition table
    InvalidTransition,
    /// An identity-bearing field was mutated on a locked variant
    IdentityLocked,

    // ==================== System ====================
    /// Storage layer failure
    DatabaseError,
    /// Optimistic-concurrency write conflict after retries
    WriteConflict,
    /// Internal engine error
    Internal,
}

impl ErrorCode {
    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidDimensionValue => "Invalid dimension value",
            Self::MissingAxisKey => "Dimension axis has no resolvable key",
            Self::MissingIdentifier => "Dimension value has no resolvable identifier",
            Self::LimitExceeded => "System limit exceeded",
            Self::CardinalityViolation => "Attribute axis appears more than once in a combination",
            Self::NoValidDimensions => "Combination resolves to no identity segments",
            Self::IdentityTooLarge => "Canonical identity exceeds the size cap",
            Self::MissingProductGroup => "Product group id does not resolve",
            Self::HardCapExceeded => "Combination count exceeds the hard cap",
            Self::SoftLimitExceeded => "Combination count exceeds the configured limit",
            Self::InvalidTransition => "Status transition not allowed",
            Self::IdentityLocked => "Identity fields are locked for this variant",
            Self::DatabaseError => "Database error",
            Self::WriteConflict => "Concurrent write conflict",
            Self::Internal => "Internal error",
        }
    }

    /// Canonical wire identifier, e.g. `CARDINALITY_VIOLATION`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Unknown => "UNKNOWN",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::InvalidDimensionValue => "INVALID_DIMENSION_VALUE",
            Self::MissingAxisKey => "MISSING_AXIS_KEY",
            Self::MissingIdentifier => "MISSING_IDENTIFIER",
            Self::LimitExceeded => "LIMIT_EXCEEDED",
            Self::CardinalityViolation => "CARDINALITY_VIOLATION",
            Self::NoValidDimensions => "NO_VALID_DIMENSIONS",
            Self::IdentityTooLarge => "IDENTITY_TOO_LARGE",
            Self::MissingProductGroup => "MISSING_PRODUCT_GROUP",
            Self::HardCapExceeded => "HARD_CAP_EXCEEDED",
            Self::SoftLimitExceeded => "SOFT_LIMIT_EXCEEDED",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::IdentityLocked => "IDENTITY_LOCKED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::WriteConflict => "WRITE_CONFLICT",
            Self::Internal => "INTERNAL",
        }
    }

    /// Error category for this code
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Success | Self::Unknown | Self::ValidationFailed | Self::NotFound | Self::AlreadyExists => {
                ErrorCategory::General
            }
            Self::MissingAxisKey
            | Self::MissingIdentifier
            | Self::LimitExceeded
            | Self::CardinalityViolation
            | Self::InvalidDimensionValue => ErrorCategory::Input,
            Self::NoValidDimensions | Self::IdentityTooLarge | Self::MissingProductGroup => {
                ErrorCategory::Identity
            }
            Self::HardCapExceeded | Self::SoftLimitExceeded => ErrorCategory::Explosion,
            Self::InvalidTransition | Self::IdentityLocked => ErrorCategory::Lifecycle,
            Self::DatabaseError | Self::WriteConflict | Self::Internal => ErrorCategory::System,
        }
    }

    /// HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::InvalidTransition | Self::IdentityLocked => StatusCode::CONFLICT,
            Self::WriteConflict => StatusCode::CONFLICT,
            Self::Success => StatusCode::OK,
            Self::DatabaseError | Self::Internal | Self::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::HardCapExceeded | Self::SoftLimitExceeded | Self::CardinalityViolation => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
