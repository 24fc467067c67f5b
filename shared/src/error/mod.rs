//! Unified error system for the variant platform
//!
//! This module provides:
//! - [`ErrorCode`]: standardized machine-readable codes for all error types
//! - [`ErrorCategory`]: classification of errors by the layer that can act
//! - [`AppError`]: rich error type with codes, messages, and details
//! - [`ApiResponse`]: unified response envelope
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! // Create an error with a custom message
//! let err = AppError::with_message(ErrorCode::LimitExceeded, "Too many colors");
//!
//! // Attach structured detail
//! let err = err.with_detail("axis", "color").with_detail("actual", 75);
//!
//! // Convert to a response envelope
//! let response = ApiResponse::<()>::error(&err);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::ErrorCode;
pub use types::{ApiResponse, AppError};
