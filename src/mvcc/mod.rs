//! # Multi-Version Concurrency Control (MVCC)
//!
//! Snapshot isolation for in-memory tables. Readers never block writers:
//! every tuple version is tagged with the transaction that wrote it, and a
//! read decides per version whether its snapshot includes that write.
//!
//! ## Transaction Lifecycle
//!
//! ```text
//! begin() -----> Active -----> commit() -----> Committed
//!                  |                              |
//!                  |                              v
//!                  +--> abort() ---> Aborted      +--> versions visible to
//!                                                      later snapshots
//! ```
//!
//! ## Staged Writes
//!
//! A write starts life as a `RedoRecord` obtained from
//! `Transaction::stage_write`. The caller fills its delta row and hands the
//! record to the table, which stores the row and appends a `WriteEntry` to the
//! transaction. Aborting leaves the rows in place but invisible.
//!
//! ## Key Structures
//!
//! - `TxnId`: 8-byte transaction identifier (u64)
//! - `TransactionManager`: timestamp allocation, active slots, commit log
//! - `Transaction`: per-transaction context with write entries
//! - `VersionHeader`: writer/deleter pair stored with every tuple

mod redo;
mod transaction;
mod version;

pub use redo::{RedoRecord, WriteEntry};
pub use transaction::{Transaction, TransactionManager, TxnId, TxnOutcome};
pub use version::{VersionHeader, VisibilityResult, WriteCheckResult};
