//! # Table Layout Constants
//!
//! This module centralizes the numeric configuration of the table layer. Values
//! that depend on each other live next to each other and their relationships are
//! enforced through compile-time assertions at the bottom of the file.
//!
//! ## Dependency Graph
//!
//! ```text
//! NUM_RESERVED_COLUMNS (1)
//!       │
//!       ├─> RESERVED_COLUMN_SIZE (8 bytes each, version pointer slot)
//!       │
//!       └─> MAX_USER_COLUMNS (derived: u16 id space minus reserved slots)
//!
//! VARLEN_ENTRY_SIZE (16 bytes)
//!       │
//!       ├─> VARLEN_COLUMN (catalog width marker: high bit | entry size)
//!       │
//!       └─> VARLEN_INLINE_THRESHOLD (12, must leave room for the 4-byte size)
//!
//! DEFAULT_TUPLES_PER_BLOCK (1024)
//!       │
//!       ├─> MAX_TUPLES_PER_BLOCK (65536): largest block a builder accepts
//!       │
//!       └─> DEFAULT_MAX_BLOCKS (65536): upper bound on blocks a store hands out
//! ```
//!
//! ## Critical Invariants
//!
//! 1. `NUM_RESERVED_COLUMNS >= 1` (the version pointer always exists)
//! 2. `VARLEN_INLINE_THRESHOLD + 4 == VARLEN_ENTRY_SIZE` (size prefix + inline bytes)
//! 3. `VARLEN_COLUMN` has the high bit set so it can never collide with a fixed width
//!
//! ## Usage
//!
//! ```ignore
//! use crate::config::{NUM_RESERVED_COLUMNS, VARLEN_COLUMN};
//! ```

/// Leading physical slots reserved for engine bookkeeping. Never assigned to a
/// logical column.
pub const NUM_RESERVED_COLUMNS: u16 = 1;

/// Width of every reserved slot. The single reserved slot holds the version
/// pointer of the tuple.
pub const RESERVED_COLUMN_SIZE: u16 = 8;

/// Bytes a variable-length entry occupies inside the fixed part of a tuple:
/// 4-byte size, then either 12 inline bytes or a 4-byte prefix plus pointer.
pub const VARLEN_ENTRY_SIZE: u16 = 16;

/// Raw attribute width the catalog reports for variable-length columns.
pub const VARLEN_COLUMN: u16 = 0x8000 | VARLEN_ENTRY_SIZE;

/// Payloads up to this many bytes are embedded directly in the entry.
pub const VARLEN_INLINE_THRESHOLD: usize = 12;

/// Largest number of logical columns a single table may declare.
pub const MAX_USER_COLUMNS: usize = (u16::MAX - NUM_RESERVED_COLUMNS) as usize;

/// Tuples a block holds before the table asks the store for another block.
pub const DEFAULT_TUPLES_PER_BLOCK: usize = 1024;

/// Largest `tuples_per_block` a store may be configured with.
pub const MAX_TUPLES_PER_BLOCK: usize = 1 << 16;

/// Blocks a store hands out before reporting exhaustion.
pub const DEFAULT_MAX_BLOCKS: usize = 1 << 16;

/// Hard limit on simultaneously active transactions per manager.
pub const MAX_CONCURRENT_TXNS: usize = 64;

const _: () = assert!(NUM_RESERVED_COLUMNS >= 1);
const _: () = assert!(VARLEN_INLINE_THRESHOLD + 4 == VARLEN_ENTRY_SIZE as usize);
const _: () = assert!(VARLEN_COLUMN & 0x8000 != 0);
const _: () = assert!(DEFAULT_TUPLES_PER_BLOCK > 0 && DEFAULT_MAX_BLOCKS > 0);
const _: () = assert!(DEFAULT_TUPLES_PER_BLOCK <= MAX_TUPLES_PER_BLOCK);
const _: () = assert!(MAX_TUPLES_PER_BLOCK <= u32::MAX as usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varlen_marker_is_not_a_fixed_width() {
        for width in [1u16, 2, 4, 8] {
            assert_ne!(VARLEN_COLUMN, width);
        }
        assert_eq!(VARLEN_COLUMN & 0x7FFF, VARLEN_ENTRY_SIZE);
    }

    #[test]
    fn reserved_slots_leave_room_for_user_columns() {
        assert_eq!(
            MAX_USER_COLUMNS + NUM_RESERVED_COLUMNS as usize,
            u16::MAX as usize
        );
    }
}
