//! # Storage Layer
//!
//! In-memory tuple storage the table layer is built on. It knows nothing about
//! logical column oids: everything here is addressed by physical `ColumnId`
//! and `TupleSlot`.
//!
//! ## Architecture
//!
//! ```text
//! +-------------------+      +------------------+
//! | BlockLayout       |----->| DataTable        |
//! | widths per slot   |      | versioned tuples |
//! +-------------------+      +--------+---------+
//!                                     | allocate / release
//!                            +--------v---------+
//!                            | BlockStore       |
//!                            | bounded, shared  |
//!                            +------------------+
//! ```
//!
//! ## Module Structure
//!
//! - `layout`: `BlockLayout` and `compute_base_attribute_offsets`
//! - `block_store`: bounded block allocator shared across tables
//! - `projected_row`: row buffers over a subset of slots
//! - `data_table`: versioned tuple storage with select/insert/update/delete
//! - `error`: `StorageError`

mod block_store;
mod data_table;
mod error;
pub mod layout;
mod projected_row;

pub use block_store::BlockStore;
pub use data_table::{DataTable, SlotIter};
pub use error::StorageError;
pub use layout::{compute_base_attribute_offsets, BlockLayout};
pub use projected_row::{Attr, ProjectedRow, ProjectedRowInitializer};
