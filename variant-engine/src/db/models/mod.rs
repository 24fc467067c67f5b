//! Database models

pub mod inventory;
pub mod master;
pub mod serde_helpers;
pub mod variant;

pub use inventory::InventoryRecord;
pub use master::{
    AttributeAxisRecord, AttributeValueRecord, ColorRecord, ProductGroupRecord, SizeRecord,
};
pub use variant::{AttributeRef, SizeRef, Variant, VariantUpdate};
