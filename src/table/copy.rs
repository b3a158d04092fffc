//! # Table Copy
//!
//! Materializes every row of one table that is visible to a transaction into
//! another table, as staged inserts of that transaction.
//!
//! ## Column Routing
//!
//! Both tables must carry the same logical columns with the same width class
//! per column. Their physical ids may differ, so values are routed by oid:
//!
//! ```text
//! oid ---> source projection position ---> destination projection position
//! ```
//!
//! ## Per-Row Flow
//!
//! ```text
//! for slot in src.slots():
//!     scratch.clear()
//!     src.select(txn, slot, scratch)   // false -> skip, not an error
//!     redo = txn.stage_write(dst identity, dst initializer)
//!     move each routed attribute scratch -> redo
//!     dst.insert(txn, redo)            // error -> stop here
//! ```
//!
//! `select` duplicates every owned varlen payload out of the source storage,
//! so the entries moved into the staged row never share an allocation with
//! the source. `Shared` and inlined entries are carried over verbatim.
//!
//! ## Failure
//!
//! An insert failure stops the copy at the current row. Rows already inserted
//! stay staged in `txn`; aborting it hides them.

use std::ptr;

use eyre::{ensure, eyre, Result, WrapErr};

use crate::mvcc::Transaction;
use crate::table::SqlTable;
use crate::types::{ColumnOid, DbOid, TableOid, VarlenEntry};

/// Outcome of a completed copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub copied: usize,
    /// Slots not visible to the transaction.
    pub skipped: usize,
    pub deep_copied_varlens: usize,
}

fn check_compatible(src: &SqlTable, dst: &SqlTable, oids: &[ColumnOid]) -> Result<()> {
    ensure!(
        src.column_map().len() == oids.len(),
        "source table has {} columns but destination has {}",
        src.column_map().len(),
        oids.len()
    );
    for &oid in oids {
        let dst_class = dst.width_class_of(oid)?;
        let src_class = src
            .width_class_of(oid)
            .wrap_err_with(|| format!("source table lacks destination column oid {}", oid))?;
        ensure!(
            src_class == dst_class,
            "column oid {} is {} in the source but {} in the destination",
            oid,
            src_class,
            dst_class
        );
    }
    Ok(())
}

/// Copies the rows of `src` visible to `txn` into `dst`, staging each one as
/// a write against `db_oid`/`table_oid`.
pub fn copy_all(
    src: &SqlTable,
    dst: &SqlTable,
    txn: &mut Transaction<'_>,
    db_oid: DbOid,
    table_oid: TableOid,
) -> Result<CopyStats> {
    ensure!(!ptr::eq(src, dst), "cannot copy a table into itself");

    let oids = dst.column_oids();
    check_compatible(src, dst, &oids)?;

    let (dst_init, dst_proj) = dst.initializer_for_projected_row(&oids)?;
    let (src_init, src_proj) = src.initializer_for_projected_row(&oids)?;
    let routes = oids
        .iter()
        .map(|oid| {
            let from = src_proj.get(oid).copied();
            let to = dst_proj.get(oid).copied();
            from.zip(to)
                .ok_or_else(|| eyre!("column oid {} missing from a projection", oid))
        })
        .collect::<Result<Vec<(u16, u16)>>>()?;

    let mut scratch = src_init.initialize_row();
    let mut stats = CopyStats::default();

    for slot in src.slots() {
        scratch.clear();
        if !src.select(txn, slot, &mut scratch)? {
            stats.skipped += 1;
            continue;
        }

        let mut redo = txn.stage_write(db_oid, table_oid, &dst_init);
        let row = redo.delta_mut();
        for &(from, to) in &routes {
            if scratch.varlen(from).is_some_and(VarlenEntry::needs_reclaim) {
                stats.deep_copied_varlens += 1;
            }
            row.move_attribute(to, &mut scratch, from)?;
        }

        let new_slot = dst.insert(txn, redo).wrap_err_with(|| {
            format!(
                "copy into table {} stopped at source slot {} after {} rows",
                table_oid, slot, stats.copied
            )
        })?;
        tracing::trace!(from = %slot, to = %new_slot, "copied row");
        stats.copied += 1;
    }

    tracing::debug!(
        table = %table_oid,
        copied = stats.copied,
        skipped = stats.skipped,
        deep_copied_varlens = stats.deep_copied_varlens,
        "table copy finished"
    );
    Ok(stats)
}

impl SqlTable {
    /// Fills this table with the rows of `src` visible to `txn`. See
    /// [`copy_all`].
    pub fn copy_table(
        &self,
        txn: &mut Transaction<'_>,
        src: &SqlTable,
        db_oid: DbOid,
        table_oid: TableOid,
    ) -> Result<CopyStats> {
        copy_all(src, self, txn, db_oid, table_oid)
    }
}
