//! # sqltable - Logical-to-Physical Table Layer
//!
//! `sqltable` maps the columns of a SQL table onto width-bucketed physical
//! slots and moves rows between tables under snapshot-isolated transactions.
//!
//! - **Dense layouts**: slots grouped by width, variable-length first, so rows
//!   need no padding
//! - **Canonical projections**: a column subset always maps to the same buffer
//!   positions, whatever order it was requested in
//! - **Owned copies**: copying a table never shares a reclaimable varlen
//!   allocation with the source
//!
//! ## Quick Start
//!
//! ```ignore
//! use sqltable::{BlockStore, Column, Schema, SqlTable, SqlType, TransactionManager};
//!
//! let store = BlockStore::builder().max_blocks(1024).build()?;
//! let schema = Schema::new(vec![
//!     Column::new("id", SqlType::BigInt, false),
//!     Column::new("name", SqlType::Varchar, true),
//! ]);
//! let table = SqlTable::new(Arc::clone(&store), &schema)?;
//!
//! let mgr = TransactionManager::new();
//! let mut txn = mgr.begin_txn()?;
//! let oids = table.column_oids();
//! let (init, proj) = table.initializer_for_projected_row(&oids)?;
//! let mut redo = txn.stage_write(DbOid::new(1), TableOid::new(1), &init);
//! redo.delta_mut().set_i64(proj[&oids[0]], 42)?;
//! table.insert(&mut txn, redo)?;
//! txn.commit();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------+
//! |  execution (CteScanIterator)               |
//! +--------------------------------------------+
//! |  table (SqlTable, ColumnMap, copy_all)     |
//! +----------------------+---------------------+
//! |  storage             |  mvcc               |
//! |  BlockLayout         |  TransactionManager |
//! |  ProjectedRow        |  Transaction        |
//! |  DataTable           |  VersionHeader      |
//! |  BlockStore          |                     |
//! +----------------------+---------------------+
//! |  catalog, types, config                    |
//! +--------------------------------------------+
//! ```
//!
//! ## Module Overview
//!
//! - [`config`]: constants and `BlockStoreBuilder`
//! - [`types`]: identifiers, width classes, varlen entries
//! - [`catalog`]: columns and schemas
//! - [`storage`]: layouts, row buffers, in-memory versioned tuples
//! - [`mvcc`]: transactions and visibility
//! - [`table`]: layout building, column maps, projections, table copy
//! - [`execution`]: temporary-table consumer for CTEs

#[macro_use]
mod macros;

pub mod catalog;
pub mod config;
pub mod execution;
pub mod mvcc;
pub mod storage;
pub mod table;
pub mod types;

pub use catalog::{Column, Schema, SqlType};
pub use config::BlockStoreBuilder;
pub use execution::CteScanIterator;
pub use mvcc::{RedoRecord, Transaction, TransactionManager, TxnId};
pub use storage::{BlockStore, ProjectedRow, ProjectedRowInitializer, StorageError};
pub use table::{copy_all, ColumnMap, CopyStats, ProjectionMap, SqlTable};
pub use types::{
    ColumnId, ColumnOid, DbOid, TableOid, TupleSlot, VarlenEntry, WidthClass, WidthError,
};
