//! Consumers of the table layer used during query execution.

mod cte_scan;

pub use cte_scan::CteScanIterator;
