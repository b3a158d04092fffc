//! # Table Schema
//!
//! An ordered list of columns as declared. Column order matters: it is the
//! order the layout builder assigns slots in within each width bucket.
//!
//! `Schema::new` plays the catalog's role of handing out oids: every column
//! still carrying `ColumnOid::INVALID` receives the next oid above the largest
//! one already present, in declaration order. Explicit oids are kept as given,
//! including duplicates, which the layout builder rejects. Columns left over
//! once the oid space above the largest explicit oid is used up stay
//! `INVALID`, which the layout builder rejects as well.

use crate::catalog::Column;
use crate::types::ColumnOid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(mut columns: Vec<Column>) -> Self {
        if columns.iter().all(|c| c.oid().is_valid()) {
            return Self { columns };
        }

        let mut next_oid = columns
            .iter()
            .map(|c| c.oid().as_raw())
            .max()
            .unwrap_or(0)
            .checked_add(1);

        // past u32::MAX the column keeps INVALID and the layout builder rejects it
        for column in columns.iter_mut().filter(|c| !c.oid().is_valid()) {
            let Some(oid) = next_oid else { break };
            column.set_oid(ColumnOid::new(oid));
            next_oid = oid.checked_add(1);
        }

        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, oid: ColumnOid) -> Option<&Column> {
        self.columns.iter().find(|c| c.oid() == oid)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Oids in declaration order.
    pub fn oids(&self) -> Vec<ColumnOid> {
        self.columns.iter().map(Column::oid).collect()
    }
}
