//! # Column Map
//!
//! The bijection between a table's logical column oids and its physical
//! column ids, fixed when the table is built. Lookups in both directions are
//! O(1) and the map is never mutated afterwards, so it is shared freely
//! between threads.
//!
//! ## Projection Maps
//!
//! `project` answers "where does each requested column sit inside a row
//! buffer built for exactly these columns". Positions are assigned in
//! ascending physical-id order, the same order `ProjectedRowInitializer`
//! lays out its buffer:
//!
//! ```text
//! request:        [name, id]
//! physical ids:   name -> 1, id -> 2
//! projection:     name -> 0, id -> 1
//! ```
//!
//! The result depends only on the requested set, never on request order.

use eyre::{ensure, eyre, Result};
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::types::{ColumnId, ColumnOid};

/// Buffer position of each requested logical column.
pub type ProjectionMap = HashMap<ColumnOid, u16>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    oid_to_id: HashMap<ColumnOid, ColumnId>,
    id_to_oid: Vec<Option<ColumnOid>>,
}

impl ColumnMap {
    /// `num_slots` counts every physical slot, reserved ones included.
    pub(crate) fn new(oid_to_id: HashMap<ColumnOid, ColumnId>, num_slots: u16) -> Self {
        let mut id_to_oid = vec![None; num_slots as usize];
        for (&oid, &id) in &oid_to_id {
            id_to_oid[id.index()] = Some(oid);
        }
        Self {
            oid_to_id,
            id_to_oid,
        }
    }

    /// Number of logical columns.
    pub fn len(&self) -> usize {
        self.oid_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oid_to_id.is_empty()
    }

    pub fn num_physical_slots(&self) -> usize {
        self.id_to_oid.len()
    }

    pub fn contains(&self, oid: ColumnOid) -> bool {
        self.oid_to_id.contains_key(&oid)
    }

    pub fn resolve_one(&self, oid: ColumnOid) -> Result<ColumnId> {
        self.oid_to_id
            .get(&oid)
            .copied()
            .ok_or_else(|| eyre!("column oid {} does not belong to this table", oid))
    }

    /// Physical ids for `oids`, in the same order. Any unknown oid fails the
    /// whole call.
    pub fn resolve(&self, oids: &[ColumnOid]) -> Result<Vec<ColumnId>> {
        oids.iter().map(|&oid| self.resolve_one(oid)).collect()
    }

    /// Logical oid stored at `id`, or `None` for reserved and unknown slots.
    pub fn reverse_resolve(&self, id: ColumnId) -> Option<ColumnOid> {
        self.id_to_oid.get(id.index()).copied().flatten()
    }

    pub fn project(&self, oids: &[ColumnOid]) -> Result<ProjectionMap> {
        let mut by_id: SmallVec<[(ColumnId, ColumnOid); 16]> = SmallVec::with_capacity(oids.len());
        for &oid in oids {
            by_id.push((self.resolve_one(oid)?, oid));
        }
        by_id.sort_unstable_by_key(|&(id, _)| id);
        for pair in by_id.windows(2) {
            ensure!(pair[0].0 != pair[1].0, "column oid {} requested twice", pair[0].1);
        }

        Ok(by_id
            .into_iter()
            .enumerate()
            .map(|(pos, (_, oid))| (oid, pos as u16))
            .collect())
    }

    /// Logical oids ordered by physical id.
    pub fn oids_by_physical_id(&self) -> Vec<ColumnOid> {
        self.id_to_oid.iter().flatten().copied().collect()
    }
}
