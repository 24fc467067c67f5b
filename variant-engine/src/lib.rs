//! Variant Identity & Generation Engine
//!
//! Expands attribute axes into variant combinations, assigns each one a
//! canonical order-independent identity (configHash), and drives the
//! concurrency-safe write pipeline that turns combinations into persisted
//! variant records. The lifecycle state machine gates later mutation of that
//! identity once a variant goes active.
//!
//! Module layout follows dependency order, leaves first:
//! - [`normalize`] — raw axis/value shapes into canonical dimensions
//! - [`expansion`] — Cartesian expansion with explosion guards
//! - [`identity`] — canonical string + configHash construction
//! - [`limits`] — fixed system ceilings checked before any expansion
//! - [`generation`] — the orchestrator, SKU builder and preview service
//! - [`lifecycle`] — status transitions and identity-field governance
//! - [`db`] — SurrealDB models and repositories
//! - [`services`] — collaborator traits the orchestrator is built over

pub mod config;
pub mod db;
pub mod error;
pub mod expansion;
pub mod generation;
pub mod identity;
pub mod lifecycle;
pub mod limits;
pub mod normalize;
pub mod services;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
