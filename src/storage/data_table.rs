//! # Data Table
//!
//! `DataTable` stores the tuples of one table layout. Tuples live in blocks of
//! `tuples_per_block` entries allocated from the shared `BlockStore`; a
//! `TupleSlot` names a block and an offset within it.
//!
//! ```text
//! DataTable
//! +--------------------------------------------+
//! | blocks: RwLock<BlockList>                  |
//! |   Block 0: [tuple, tuple, ..., tuple]      |  full
//! |   Block 7: [tuple, tuple]                  |  append target
//! +--------------------------------------------+
//!   tuple = VersionHeader + full ProjectedRow
//! ```
//!
//! Every stored row has the layout's full user-column shape. Rows inserted
//! with fewer columns are widened, the missing ones left NULL.
//!
//! ## Versions
//!
//! Nothing is overwritten in place. A delete sets the tuple's deleter; an
//! update deletes the old tuple and appends the new image. Readers filter by
//! `VersionHeader::visibility`.
//!
//! ## Iteration
//!
//! `slots()` walks every slot ever written, visible or not, block by block.
//! The lock is taken per step, so callers may read or write other tables
//! between steps.

use std::sync::Arc;

use eyre::{eyre, Result};
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::mvcc::{Transaction, VersionHeader, VisibilityResult, WriteCheckResult};
use crate::storage::{BlockLayout, BlockStore, ProjectedRow, ProjectedRowInitializer, StorageError};
use crate::types::{BlockId, ColumnId, LayoutVersion, TupleSlot};

struct StoredTuple {
    version: VersionHeader,
    row: ProjectedRow,
}

struct Block {
    id: BlockId,
    tuples: Vec<StoredTuple>,
}

#[derive(Default)]
struct BlockList {
    blocks: Vec<Block>,
    index: HashMap<BlockId, usize>,
}

impl BlockList {
    fn tuple(&self, slot: TupleSlot) -> Result<&StoredTuple, StorageError> {
        self.index
            .get(&slot.block())
            .and_then(|&idx| self.blocks[idx].tuples.get(slot.offset() as usize))
            .ok_or(StorageError::SlotOutOfRange(slot))
    }

    fn tuple_mut(&mut self, slot: TupleSlot) -> Result<&mut StoredTuple, StorageError> {
        let idx = *self
            .index
            .get(&slot.block())
            .ok_or(StorageError::SlotOutOfRange(slot))?;
        self.blocks[idx]
            .tuples
            .get_mut(slot.offset() as usize)
            .ok_or(StorageError::SlotOutOfRange(slot))
    }

    // tuples grow on demand; a block is reserved, not preallocated
    fn push_block(&mut self, id: BlockId) {
        self.index.insert(id, self.blocks.len());
        self.blocks.push(Block {
            id,
            tuples: Vec::new(),
        });
    }

    fn clear(&mut self) -> usize {
        let released = self.blocks.len();
        self.blocks.clear();
        self.index.clear();
        released
    }
}

pub struct DataTable {
    block_store: Arc<BlockStore>,
    layout: BlockLayout,
    layout_version: LayoutVersion,
    full_row: ProjectedRowInitializer,
    blocks: RwLock<BlockList>,
}

impl DataTable {
    pub fn new(
        block_store: Arc<BlockStore>,
        layout: BlockLayout,
        layout_version: LayoutVersion,
    ) -> Result<Self> {
        let full_row = ProjectedRowInitializer::new(&layout, layout.user_column_ids().collect())?;
        Ok(Self {
            block_store,
            layout,
            layout_version,
            full_row,
            blocks: RwLock::new(BlockList::default()),
        })
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    pub fn layout_version(&self) -> LayoutVersion {
        self.layout_version
    }

    pub fn block_store(&self) -> &Arc<BlockStore> {
        &self.block_store
    }

    fn full_position(&self, col: ColumnId) -> Result<u16, StorageError> {
        if !self.layout.is_user_column(col) {
            return Err(StorageError::ColumnNotInLayout {
                col,
                num_columns: self.layout.num_columns(),
            });
        }
        Ok(col.as_raw() - self.layout.num_reserved())
    }

    /// Copies the columns of `out` from the tuple at `slot` if it is visible
    /// to `txn`. Returns false, leaving `out` untouched, otherwise.
    pub fn select(&self, txn: &Transaction<'_>, slot: TupleSlot, out: &mut ProjectedRow) -> Result<bool> {
        let blocks = self.blocks.read();
        let tuple = blocks.tuple(slot)?;
        let visibility = tuple.version.visibility(txn);
        if visibility != VisibilityResult::Visible {
            tracing::trace!(%slot, txn = txn.id(), ?visibility, "slot not visible");
            return Ok(false);
        }
        for pos in 0..out.num_columns() {
            let full_pos = self.full_position(out.column_id(pos))?;
            out.copy_attribute(pos, &tuple.row, full_pos)?;
        }
        Ok(true)
    }

    /// Stores `row` as a new tuple written by `txn`.
    pub fn insert(&self, txn: &Transaction<'_>, row: ProjectedRow) -> Result<TupleSlot> {
        let row = self.widen(row)?;
        let tuples_per_block = self.block_store.tuples_per_block();

        let mut blocks = self.blocks.write();
        let needs_block = blocks
            .blocks
            .last()
            .map_or(true, |block| block.tuples.len() >= tuples_per_block);
        if needs_block {
            let id = self.block_store.allocate()?;
            blocks.push_block(id);
            tracing::debug!(block = %id, blocks = blocks.blocks.len(), "table grew by one block");
        }

        let block = blocks
            .blocks
            .last_mut()
            .ok_or_else(|| eyre!("table has no block to append to"))?;
        let slot = TupleSlot::new(block.id, block.tuples.len() as u32);
        block.tuples.push(StoredTuple {
            version: VersionHeader::new(txn.id()),
            row,
        });
        Ok(slot)
    }

    fn widen(&self, mut row: ProjectedRow) -> Result<ProjectedRow> {
        if row.column_ids() == self.full_row.column_ids() {
            return Ok(row);
        }
        let mut full = self.full_row.initialize_row();
        for pos in 0..row.num_columns() {
            let full_pos = self.full_position(row.column_id(pos))?;
            full.move_attribute(full_pos, &mut row, pos)?;
        }
        Ok(full)
    }

    /// Marks the tuple at `slot` deleted by `txn`. Returns false when the
    /// tuple is not visible or another transaction already deleted it.
    pub fn delete(&self, txn: &Transaction<'_>, slot: TupleSlot) -> Result<bool> {
        let mut blocks = self.blocks.write();
        let tuple = blocks.tuple_mut(slot)?;
        match tuple.version.can_delete(txn) {
            WriteCheckResult::CanWrite => {
                tuple.version.deleter = Some(txn.id());
                Ok(true)
            }
            conflict => {
                tracing::trace!(%slot, txn = txn.id(), ?conflict, "delete refused");
                Ok(false)
            }
        }
    }

    /// Applies `delta` on top of the visible image at `slot` and stores the
    /// result as a new tuple. Returns the new slot, or `None` if the old
    /// tuple could not be deleted.
    pub fn update(&self, txn: &Transaction<'_>, slot: TupleSlot, delta: &ProjectedRow) -> Result<Option<TupleSlot>> {
        let mut image = self.full_row.initialize_row();
        if !self.select(txn, slot, &mut image)? {
            return Ok(None);
        }
        for pos in 0..delta.num_columns() {
            let full_pos = self.full_position(delta.column_id(pos))?;
            image.copy_attribute(full_pos, delta, pos)?;
        }
        if !self.delete(txn, slot)? {
            return Ok(None);
        }
        self.insert(txn, image).map(Some)
    }

    pub fn slots(&self) -> SlotIter<'_> {
        SlotIter {
            table: self,
            block_idx: 0,
            offset: 0,
        }
    }

    /// Tuples stored, including deleted and uncommitted ones.
    pub fn num_tuples(&self) -> usize {
        self.blocks.read().blocks.iter().map(|b| b.tuples.len()).sum()
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.read().blocks.len()
    }

    /// Drops every tuple and returns the blocks to the store.
    pub fn reset(&self) {
        let released = self.blocks.write().clear();
        self.block_store.release(released);
        tracing::debug!(released, "reset table");
    }
}

impl Drop for DataTable {
    fn drop(&mut self) {
        let released = self.blocks.get_mut().clear();
        self.block_store.release(released);
    }
}

/// Lazy walk over every stored slot in insertion order.
#[derive(Clone)]
pub struct SlotIter<'a> {
    table: &'a DataTable,
    block_idx: usize,
    offset: u32,
}

impl SlotIter<'_> {
    pub fn restart(&mut self) {
        self.block_idx = 0;
        self.offset = 0;
    }
}

impl Iterator for SlotIter<'_> {
    type Item = TupleSlot;

    fn next(&mut self) -> Option<TupleSlot> {
        loop {
            let blocks = self.table.blocks.read();
            let block = blocks.blocks.get(self.block_idx)?;
            if (self.offset as usize) < block.tuples.len() {
                let slot = TupleSlot::new(block.id, self.offset);
                self.offset += 1;
                return Some(slot);
            }
            self.block_idx += 1;
            self.offset = 0;
        }
    }
}
