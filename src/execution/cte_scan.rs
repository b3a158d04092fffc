//! # CTE Scan
//!
//! `CteScanIterator` owns the temporary table a common table expression is
//! materialized into. The producer pushes rows one at a time:
//!
//! ```text
//! let row = cte.insert_temp_table_pr(&txn);   // stage an empty row
//! row.set_i64(cte.projection_map()[&oid], 1)?;
//! cte.table_insert(&mut txn)?;                // store it
//! ```
//!
//! Every temp column is nullable. At most one row is staged at a time;
//! staging again discards the previous row.

use std::sync::Arc;

use eyre::{bail, ensure, Result};

use crate::catalog::{Column, Schema, SqlType};
use crate::mvcc::{RedoRecord, Transaction};
use crate::storage::{BlockStore, ProjectedRow, ProjectedRowInitializer};
use crate::table::{ProjectionMap, SqlTable};
use crate::types::{ColumnOid, DbOid, TableOid, TupleSlot};

pub struct CteScanIterator {
    table: SqlTable,
    db_oid: DbOid,
    table_oid: TableOid,
    column_oids: Vec<ColumnOid>,
    initializer: ProjectedRowInitializer,
    projection_map: ProjectionMap,
    staged: Option<RedoRecord>,
}

impl CteScanIterator {
    pub fn new(
        block_store: Arc<BlockStore>,
        db_oid: DbOid,
        table_oid: TableOid,
        columns: &[(ColumnOid, SqlType)],
    ) -> Result<Self> {
        for &(oid, _) in columns {
            ensure!(oid.is_valid(), "temp table column oid {} is invalid", oid);
        }
        let schema = Schema::new(
            columns
                .iter()
                .map(|&(oid, sql_type)| {
                    Column::new(format!("cte_col_{}", oid), sql_type, true).with_oid(oid)
                })
                .collect(),
        );
        let table = SqlTable::new(block_store, &schema)?;
        let column_oids = table.column_oids();
        let (initializer, projection_map) = table.initializer_for_projected_row(&column_oids)?;

        tracing::debug!(table = %table_oid, columns = column_oids.len(), "opened cte temp table");
        Ok(Self {
            table,
            db_oid,
            table_oid,
            column_oids,
            initializer,
            projection_map,
            staged: None,
        })
    }

    pub fn table(&self) -> &SqlTable {
        &self.table
    }

    pub fn table_oid(&self) -> TableOid {
        self.table_oid
    }

    pub fn db_oid(&self) -> DbOid {
        self.db_oid
    }

    pub fn column_oids(&self) -> &[ColumnOid] {
        &self.column_oids
    }

    /// Position of each temp column in the staged row.
    pub fn projection_map(&self) -> &ProjectionMap {
        &self.projection_map
    }

    /// Stages an empty all-NULL row and returns it for filling.
    pub fn insert_temp_table_pr(&mut self, txn: &Transaction<'_>) -> &mut ProjectedRow {
        let redo = txn.stage_write(self.db_oid, self.table_oid, &self.initializer);
        self.staged.insert(redo).delta_mut()
    }

    /// Inserts the staged row into the temp table.
    pub fn table_insert(&mut self, txn: &mut Transaction<'_>) -> Result<TupleSlot> {
        let Some(redo) = self.staged.take() else {
            bail!(
                "no row staged for temp table {}; call insert_temp_table_pr first",
                self.table_oid
            );
        };
        self.table.insert(txn, redo)
    }

    /// Empties the temp table for reuse.
    pub fn reset(&mut self) {
        self.staged = None;
        self.table.reset();
    }
}
