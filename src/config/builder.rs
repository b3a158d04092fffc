//! # Block Store Builder
//!
//! This module provides the `BlockStoreBuilder` API for configuring the block
//! allocator every table draws its storage from.
//!
//! ## Configuration Options
//!
//! | Option           | Default | Description                                   |
//! |------------------|---------|-----------------------------------------------|
//! | tuples_per_block | 1024    | Tuples a block holds before a new one is used (at most 65536) |
//! | max_blocks       | 65536   | Blocks handed out before allocation fails     |
//!
//! ## Usage
//!
//! ```ignore
//! let store = BlockStore::builder()
//!     .tuples_per_block(256)
//!     .max_blocks(1024)
//!     .build()?;
//! ```
//!
//! A store is shared between tables through `Arc`, so `max_blocks` bounds the
//! combined footprint of every table built on it.

use std::sync::Arc;

use eyre::{ensure, Result};

use crate::config::{DEFAULT_MAX_BLOCKS, DEFAULT_TUPLES_PER_BLOCK, MAX_TUPLES_PER_BLOCK};
use crate::storage::BlockStore;

/// Builder for configuring a [`BlockStore`].
///
/// Use `BlockStore::builder()` to create a new builder, then chain configuration
/// methods before calling `build()`.
#[derive(Debug, Clone, Copy)]
pub struct BlockStoreBuilder {
    tuples_per_block: Option<usize>,
    max_blocks: Option<usize>,
}

impl Default for BlockStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tuples_per_block: None,
            max_blocks: None,
        }
    }

    /// Sets how many tuples fit in one block.
    pub fn tuples_per_block(mut self, tuples: usize) -> Self {
        self.tuples_per_block = Some(tuples);
        self
    }

    /// Sets the number of blocks the store may hand out in total.
    ///
    /// Once reached, inserts into any table on this store fail with
    /// [`StorageError::BlockStoreExhausted`](crate::storage::StorageError).
    pub fn max_blocks(mut self, blocks: usize) -> Self {
        self.max_blocks = Some(blocks);
        self
    }

    /// Validates the configuration and creates the shared store.
    pub fn build(self) -> Result<Arc<BlockStore>> {
        let tuples_per_block = self.tuples_per_block.unwrap_or(DEFAULT_TUPLES_PER_BLOCK);
        let max_blocks = self.max_blocks.unwrap_or(DEFAULT_MAX_BLOCKS);

        ensure!(tuples_per_block > 0, "tuples_per_block must be non-zero");
        ensure!(max_blocks > 0, "max_blocks must be non-zero");
        ensure!(
            tuples_per_block <= MAX_TUPLES_PER_BLOCK,
            "tuples_per_block {} exceeds the limit of {}",
            tuples_per_block,
            MAX_TUPLES_PER_BLOCK
        );

        Ok(Arc::new(BlockStore::new(tuples_per_block, max_blocks)))
    }
}
