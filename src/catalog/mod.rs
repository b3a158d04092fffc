//! # Catalog Surface
//!
//! The catalog owns table and column metadata. The table layer only consumes
//! what it needs to build a physical layout: the ordered column list with each
//! column's oid, raw attribute width and nullability.
//!
//! ## Module Structure
//!
//! - `column`: `SqlType` and `Column`
//! - `schema`: `Schema`, the ordered column list with oid assignment

mod column;
mod schema;

pub use column::{Column, SqlType};
pub use schema::Schema;
