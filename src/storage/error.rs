//! Error types for the storage module.

use std::fmt;

use crate::types::{ColumnId, TupleSlot, WidthClass};

/// Storage failures callers may want to branch on.
///
/// Raised through `eyre` and recovered with `Report::downcast_ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The block store has handed out every block it is allowed to.
    BlockStoreExhausted {
        /// Configured block limit of the store.
        max_blocks: usize,
    },
    /// The slot does not name a tuple of this table.
    SlotOutOfRange(TupleSlot),
    /// The column id is outside the layout or names a reserved slot.
    ColumnNotInLayout {
        /// Offending physical column.
        col: ColumnId,
        /// Total slots of the layout, reserved ones included.
        num_columns: u16,
    },
    /// An attribute was moved between slots of different width classes.
    WidthMismatch {
        /// Class of the receiving slot.
        expected: WidthClass,
        /// Class of the value.
        actual: WidthClass,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::BlockStoreExhausted { max_blocks } => {
                write!(f, "block store exhausted: all {} blocks in use", max_blocks)
            }
            StorageError::SlotOutOfRange(slot) => {
                write!(f, "tuple slot {} does not exist", slot)
            }
            StorageError::ColumnNotInLayout { col, num_columns } => {
                write!(
                    f,
                    "column {} is not a user column of a layout with {} slots",
                    col, num_columns
                )
            }
            StorageError::WidthMismatch { expected, actual } => {
                write!(
                    f,
                    "width mismatch: slot holds {} values, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for StorageError {}
