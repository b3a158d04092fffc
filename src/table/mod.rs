//! # Table Layer
//!
//! Maps a table's logical columns onto physical storage slots and moves rows
//! between tables.
//!
//! ## Data Flow
//!
//! ```text
//! Schema --build_layout--> (BlockLayout, ColumnMap)      once per table
//!                                     |
//!             resolve / project <-----+                  every access
//!                                     |
//!                   copy_all --------+                   per copy
//! ```
//!
//! ## Module Structure
//!
//! - `layout_builder`: width bucketing and slot assignment
//! - `column_map`: immutable oid <-> slot map and projection maps
//! - `sql_table`: `SqlTable`, the logical table with row accessors
//! - `copy`: `copy_all`, full-table materialization under a transaction

mod column_map;
mod copy;
mod layout_builder;
mod sql_table;

pub use column_map::{ColumnMap, ProjectionMap};
pub use copy::{copy_all, CopyStats};
pub use layout_builder::{build_layout, build_layout_for_schema};
pub use sql_table::SqlTable;
