//! Engine error type
//!
//! One thiserror enum for the whole pipeline, carrying the structured detail
//! each error class needs (offending axis, actual vs. allowed counts, the
//! attempted transition). [`EngineError::code`] maps every variant onto the
//! wire-facing [`shared::ErrorCode`] taxonomy.

use crate::db::repository::RepoError;
use crate::lifecycle::VariantStatus;
use shared::{AppError, ErrorCode};
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    // ========== Input errors (caller-fixable, never retried) ==========
    #[error("dimension at position {position} has no resolvable axis key")]
    MissingAxisKey { position: usize },

    #[error("value on axis '{axis}' has no resolvable identifier")]
    MissingIdentifier { axis: String },

    #[error("limit exceeded on '{axis}': {actual} > {allowed}")]
    LimitExceeded {
        axis: String,
        actual: u64,
        allowed: u64,
    },

    #[error("axis '{axis}' selected twice in one combination: '{first}' and '{second}'")]
    CardinalityViolation {
        axis: String,
        first: String,
        second: String,
    },

    #[error("referenced dimension value is invalid: {0}")]
    InvalidDimensionValue(String),

    // ========== Identity errors ==========
    #[error("combination resolves to no identity segments")]
    NoValidDimensions,

    #[error("canonical identity is {bytes} bytes, cap is {max}")]
    IdentityTooLarge { bytes: usize, max: usize },

    #[error("product group id does not resolve")]
    MissingProductGroup,

    // ========== Explosion errors (abort before any storage work) ==========
    #[error("combination count {actual} exceeds the hard cap {cap}")]
    HardCapExceeded { actual: u64, cap: u64 },

    #[error("combination count {actual} exceeds the configured limit {limit}")]
    SoftLimitExceeded { actual: u64, limit: u64 },

    // ========== Lifecycle errors ==========
    #[error("transition {from} -> {to} is not allowed")]
    InvalidTransition {
        from: VariantStatus,
        to: VariantStatus,
    },

    #[error("identity field '{field}' is locked (status {status})")]
    IdentityLocked {
        field: String,
        status: VariantStatus,
    },

    // ========== System errors ==========
    #[error("write conflict persisted after {attempts} attempts")]
    WriteConflict { attempts: u32 },

    #[error(transparent)]
    Store(#[from] RepoError),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    /// Wire-facing error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingAxisKey { .. } => ErrorCode::MissingAxisKey,
            Self::MissingIdentifier { .. } => ErrorCode::MissingIdentifier,
            Self::LimitExceeded { .. } => ErrorCode::LimitExceeded,
            Self::CardinalityViolation { .. } => ErrorCode::CardinalityViolation,
            Self::InvalidDimensionValue(_) => ErrorCode::InvalidDimensionValue,
            Self::NoValidDimensions => ErrorCode::NoValidDimensions,
            Self::IdentityTooLarge { .. } => ErrorCode::IdentityTooLarge,
            Self::MissingProductGroup => ErrorCode::MissingProductGroup,
            Self::HardCapExceeded { .. } => ErrorCode::HardCapExceeded,
            Self::SoftLimitExceeded { .. } => ErrorCode::SoftLimitExceeded,
            Self::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            Self::IdentityLocked { .. } => ErrorCode::IdentityLocked,
            Self::WriteConflict { .. } => ErrorCode::WriteConflict,
            Self::Store(RepoError::NotFound(_)) => ErrorCode::NotFound,
            Self::Store(RepoError::Duplicate(_)) => ErrorCode::AlreadyExists,
            Self::Store(_) => ErrorCode::DatabaseError,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Convert into the structured wire error, attaching detail fields.
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::with_message(self.code(), self.to_string());
        match self {
            Self::LimitExceeded {
                axis,
                actual,
                allowed,
            } => err
                .with_detail("axis", axis.as_str())
                .with_detail("actual", *actual)
                .with_detail("allowed", *allowed),
            Self::CardinalityViolation { axis, first, second } => err
                .with_detail("axis", axis.as_str())
                .with_detail("first", first.as_str())
                .with_detail("second", second.as_str()),
            Self::HardCapExceeded { actual, cap } => err
                .with_detail("actual", *actual)
                .with_detail("allowed", *cap),
            Self::SoftLimitExceeded { actual, limit } => err
                .with_detail("actual", *actual)
                .with_detail("allowed", *limit),
            Self::InvalidTransition { from, to } => err
                .with_detail("from", from.as_str())
                .with_detail("to", to.as_str()),
            Self::IdentityLocked { field, status } => err
                .with_detail("field", field.as_str())
                .with_detail("status", status.as_str()),
            Self::IdentityTooLarge { bytes, max } => err
                .with_detail("bytes", *bytes as u64)
                .with_detail("max", *max as u64),
            _ => err,
        }
    }
}
