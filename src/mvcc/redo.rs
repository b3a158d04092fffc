//! Staged writes and the per-transaction write set.

use crate::storage::ProjectedRow;
use crate::types::{DbOid, TableOid, TupleSlot};

/// A pending row write: the destination identity plus the delta row.
///
/// Produced by `Transaction::stage_write` and consumed by the table's
/// `insert`/`update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedoRecord {
    db_oid: DbOid,
    table_oid: TableOid,
    delta: ProjectedRow,
}

impl RedoRecord {
    pub(crate) fn new(db_oid: DbOid, table_oid: TableOid, delta: ProjectedRow) -> Self {
        Self {
            db_oid,
            table_oid,
            delta,
        }
    }

    pub fn db_oid(&self) -> DbOid {
        self.db_oid
    }

    pub fn table_oid(&self) -> TableOid {
        self.table_oid
    }

    pub fn delta(&self) -> &ProjectedRow {
        &self.delta
    }

    pub fn delta_mut(&mut self) -> &mut ProjectedRow {
        &mut self.delta
    }

    pub fn into_delta(self) -> ProjectedRow {
        self.delta
    }
}

/// A slot touched by a transaction, tagged with the table it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteEntry {
    Insert {
        db_oid: DbOid,
        table_oid: TableOid,
        slot: TupleSlot,
    },
    Delete {
        db_oid: DbOid,
        table_oid: TableOid,
        slot: TupleSlot,
    },
}

impl WriteEntry {
    pub fn slot(&self) -> TupleSlot {
        match self {
            WriteEntry::Insert { slot, .. } | WriteEntry::Delete { slot, .. } => *slot,
        }
    }

    pub fn db_oid(&self) -> DbOid {
        match self {
            WriteEntry::Insert { db_oid, .. } | WriteEntry::Delete { db_oid, .. } => *db_oid,
        }
    }

    pub fn table_oid(&self) -> TableOid {
        match self {
            WriteEntry::Insert { table_oid, .. } | WriteEntry::Delete { table_oid, .. } => {
                *table_oid
            }
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, WriteEntry::Insert { .. })
    }
}
