//! Shared types for the variant platform
//!
//! Common types used across the engine and its consumers: error codes,
//! response structures and the generation/preview wire types.

pub mod error;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, ErrorCategory, ErrorCode};
pub use request::{AttributeAxisInput, BaseDimensions, GenerationRequest};
pub use response::{CombinationView, GenerationResult, PreviewResult};
