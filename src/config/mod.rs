//! # Configuration Module
//!
//! Centralizes every tunable of the table layer so interdependent values never
//! drift apart.
//!
//! ## Module Organization
//!
//! - [`constants`]: Numeric layout and sizing values with dependency documentation
//! - [`builder`]: `BlockStoreBuilder`, the fluent configuration surface for block
//!   stores (block sizing and exhaustion limit)

pub mod builder;
pub mod constants;

pub use builder::BlockStoreBuilder;
pub use constants::*;
