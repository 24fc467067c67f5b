//! Variant generation pipeline
//!
//! `VariantGenerator` owns the write path; `PreviewService` shares its
//! caches over the read path. Master-data enrichment, SKU derivation and
//! the memo/singleflight caches each live in their own submodule.

pub mod cache;
pub mod enrich;
pub mod orchestrator;
pub mod preview;
pub mod sku;

pub use cache::{request_cache_key, PreviewCache, Singleflight};
pub use enrich::{load_and_enrich, EnrichedDimensions, COLOR_AXIS, SIZE_AXIS};
pub use orchestrator::VariantGenerator;
pub use preview::{ConfiguratorMatrix, PreviewService};
pub use sku::build_sku;
