//! # SQL Table
//!
//! `SqlTable` is the logical face of a table. It owns one `DataTable`, the
//! immutable `ColumnMap` built alongside its layout and the schema it came
//! from, and translates between logical column oids and physical slots for
//! every caller.
//!
//! ## Access Pattern
//!
//! ```text
//! let (init, proj) = table.initializer_for_projected_row(&[name, id])?;
//! let mut row = init.initialize_row();
//! table.select(&txn, slot, &mut row)?;
//! row.varlen(proj[&name]);   // position 0
//! row.get_i64(proj[&id]);    // position 1
//! ```
//!
//! Writes go through a staged `RedoRecord`:
//!
//! ```text
//! let mut redo = txn.stage_write(db_oid, table_oid, &init);
//! redo.delta_mut().set_i64(proj[&id], 7)?;
//! table.insert(&mut txn, redo)?;
//! ```
//!
//! ## Concurrency
//!
//! Resolution and projection only read the column map and need no locking.
//! Row accessors synchronize inside the `DataTable`.

use std::sync::Arc;

use eyre::{ensure, Result};

use crate::catalog::Schema;
use crate::mvcc::{RedoRecord, Transaction, WriteEntry};
use crate::storage::{
    BlockLayout, BlockStore, DataTable, ProjectedRow, ProjectedRowInitializer, SlotIter,
};
use crate::table::{build_layout_for_schema, ColumnMap, ProjectionMap};
use crate::types::{ColumnId, ColumnOid, DbOid, LayoutVersion, TableOid, TupleSlot, WidthClass};

pub struct SqlTable {
    schema: Schema,
    column_map: ColumnMap,
    data_table: DataTable,
}

impl SqlTable {
    pub fn new(block_store: Arc<BlockStore>, schema: &Schema) -> Result<Self> {
        let (layout, column_map) = build_layout_for_schema(schema)?;
        let data_table = DataTable::new(block_store, layout, LayoutVersion::new(0))?;
        tracing::debug!(
            columns = column_map.len(),
            slots = column_map.num_physical_slots(),
            "created sql table"
        );
        Ok(Self {
            schema: schema.clone(),
            column_map,
            data_table,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Logical-to-physical mapping fixed at construction.
    pub fn column_map(&self) -> &ColumnMap {
        &self.column_map
    }

    pub fn layout(&self) -> &BlockLayout {
        self.data_table.layout()
    }

    /// Always 0; tables never change layout after construction.
    pub fn layout_version(&self) -> LayoutVersion {
        self.data_table.layout_version()
    }

    pub fn block_store(&self) -> &Arc<BlockStore> {
        self.data_table.block_store()
    }

    /// Every logical column in declaration order.
    pub fn column_oids(&self) -> Vec<ColumnOid> {
        self.schema.oids()
    }

    /// Physical ids for `oids`, in the order the oids were given.
    pub fn col_ids_for_oids(&self, oids: &[ColumnOid]) -> Result<Vec<ColumnId>> {
        self.column_map.resolve(oids)
    }

    /// `None` for reserved slots and ids outside the layout.
    pub fn oid_for_col_id(&self, col_id: ColumnId) -> Option<ColumnOid> {
        self.column_map.reverse_resolve(col_id)
    }

    /// Position of each oid in a row built from the same oids, ordered by
    /// physical id rather than request order.
    pub fn projection_map_for_oids(&self, oids: &[ColumnOid]) -> Result<ProjectionMap> {
        self.column_map.project(oids)
    }

    /// Width class of the slot holding `oid`.
    pub fn width_class_of(&self, oid: ColumnOid) -> Result<WidthClass> {
        let col_id = self.column_map.resolve_one(oid)?;
        Ok(self.layout().width_class(col_id))
    }

    /// Row initializer for `oids` together with the position of each oid in
    /// rows it produces.
    pub fn initializer_for_projected_row(
        &self,
        oids: &[ColumnOid],
    ) -> Result<(ProjectedRowInitializer, ProjectionMap)> {
        ensure!(
            !oids.is_empty(),
            "a projected row needs at least one column"
        );
        let col_ids = self.col_ids_for_oids(oids)?;
        let initializer = ProjectedRowInitializer::new(self.layout(), col_ids)?;
        let projection_map = self.projection_map_for_oids(oids)?;
        Ok((initializer, projection_map))
    }

    /// Reads the tuple at `slot` into `out` if it is visible to `txn`.
    pub fn select(
        &self,
        txn: &Transaction<'_>,
        slot: TupleSlot,
        out: &mut ProjectedRow,
    ) -> Result<bool> {
        self.data_table.select(txn, slot, out)
    }

    /// Stores the delta of `redo` as a new tuple and records the write
    /// against the record's table identity. Columns missing from the delta
    /// are stored as NULL.
    pub fn insert(&self, txn: &mut Transaction<'_>, redo: RedoRecord) -> Result<TupleSlot> {
        let db_oid = redo.db_oid();
        let table_oid = redo.table_oid();
        let slot = self.data_table.insert(txn, redo.into_delta())?;
        txn.add_write_entry(WriteEntry::Insert {
            db_oid,
            table_oid,
            slot,
        });
        Ok(slot)
    }

    /// Replaces the tuple at `slot` with its visible image overlaid by the
    /// columns of `redo`. Returns the slot of the new version, or `None` if
    /// the tuple is not visible or is being changed by someone else.
    pub fn update(
        &self,
        txn: &mut Transaction<'_>,
        slot: TupleSlot,
        redo: RedoRecord,
    ) -> Result<Option<TupleSlot>> {
        let Some(new_slot) = self.data_table.update(txn, slot, redo.delta())? else {
            return Ok(None);
        };
        txn.add_write_entry(WriteEntry::Delete {
            db_oid: redo.db_oid(),
            table_oid: redo.table_oid(),
            slot,
        });
        txn.add_write_entry(WriteEntry::Insert {
            db_oid: redo.db_oid(),
            table_oid: redo.table_oid(),
            slot: new_slot,
        });
        Ok(Some(new_slot))
    }

    /// Deletes the tuple at `slot`, recording the write against
    /// `db_oid`/`table_oid`. Returns false if the tuple is not visible or is
    /// being changed by someone else.
    pub fn delete(
        &self,
        txn: &mut Transaction<'_>,
        db_oid: DbOid,
        table_oid: TableOid,
        slot: TupleSlot,
    ) -> Result<bool> {
        let deleted = self.data_table.delete(txn, slot)?;
        if deleted {
            txn.add_write_entry(WriteEntry::Delete {
                db_oid,
                table_oid,
                slot,
            });
        }
        Ok(deleted)
    }

    /// Every stored slot, visible or not. Restartable with
    /// `SlotIter::restart`.
    pub fn slots(&self) -> SlotIter<'_> {
        self.data_table.slots()
    }

    /// Stored tuples, including versions other transactions cannot see.
    pub fn num_tuples(&self) -> usize {
        self.data_table.num_tuples()
    }

    /// Drops every tuple, keeping the layout.
    pub fn reset(&self) {
        self.data_table.reset();
    }
}
