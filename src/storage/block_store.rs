//! # Block Store
//!
//! The block store is the bounded allocator every table draws blocks from. It
//! is shared between tables through `Arc` and only tracks how many blocks are
//! in use; the tuples themselves live in the owning `DataTable`.
//!
//! ## Exhaustion
//!
//! Allocation fails with `StorageError::BlockStoreExhausted` once
//! `max_blocks` blocks are in use. Blocks return to the store when a table is
//! reset or dropped.
//!
//! ## Concurrency
//!
//! Allocation is a CAS loop on the in-use counter, so concurrent tables never
//! overshoot the limit.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::config::{BlockStoreBuilder, DEFAULT_MAX_BLOCKS, DEFAULT_TUPLES_PER_BLOCK};
use crate::storage::StorageError;
use crate::types::BlockId;

#[derive(Debug)]
pub struct BlockStore {
    tuples_per_block: usize,
    max_blocks: usize,
    next_block_id: AtomicU32,
    in_use: AtomicUsize,
}

impl BlockStore {
    pub fn builder() -> BlockStoreBuilder {
        BlockStoreBuilder::new()
    }

    pub(crate) fn new(tuples_per_block: usize, max_blocks: usize) -> Self {
        Self {
            tuples_per_block,
            max_blocks,
            next_block_id: AtomicU32::new(0),
            in_use: AtomicUsize::new(0),
        }
    }

    pub fn tuples_per_block(&self) -> usize {
        self.tuples_per_block
    }

    pub fn max_blocks(&self) -> usize {
        self.max_blocks
    }

    pub fn blocks_in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    pub fn allocate(&self) -> Result<BlockId, StorageError> {
        let mut in_use = self.in_use.load(Ordering::Acquire);
        loop {
            if in_use >= self.max_blocks {
                tracing::warn!(max_blocks = self.max_blocks, "block store exhausted");
                return Err(StorageError::BlockStoreExhausted {
                    max_blocks: self.max_blocks,
                });
            }
            match self.in_use.compare_exchange_weak(
                in_use,
                in_use + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(current) => in_use = current,
            }
        }

        let id = BlockId::new(self.next_block_id.fetch_add(1, Ordering::Relaxed));
        tracing::trace!(block = %id, in_use = in_use + 1, "allocated block");
        Ok(id)
    }

    pub fn release(&self, count: usize) {
        if count == 0 {
            return;
        }
        let previous = self.in_use.fetch_sub(count, Ordering::AcqRel);
        debug_assert!(previous >= count, "released more blocks than allocated");
        tracing::trace!(count, in_use = previous - count, "released blocks");
    }
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new(DEFAULT_TUPLES_PER_BLOCK, DEFAULT_MAX_BLOCKS)
    }
}
