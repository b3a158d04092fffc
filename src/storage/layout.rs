//! # Block Layout
//!
//! A `BlockLayout` records the width class of every physical slot of a table,
//! indexed by `ColumnId`. Slots are grouped by width so a tuple never needs
//! internal padding:
//!
//! ```text
//! ColumnId:  0 .. R-1      R ..          ..          ..        ..        ..
//!           +-----------+-----------+-----------+---------+---------+---------+
//!           | reserved  | varlen    | 8-byte    | 4-byte  | 2-byte  | 1-byte  |
//!           | (8 bytes) | (16 each) |           |         |         |         |
//!           +-----------+-----------+-----------+---------+---------+---------+
//! ```
//!
//! `R` is `NUM_RESERVED_COLUMNS`. Reserved slots hold engine bookkeeping and
//! are never handed to logical columns.
//!
//! `compute_base_attribute_offsets` returns the first `ColumnId` of each
//! bucket; the layout builder draws ids from those counters in declaration
//! order.

use eyre::{ensure, Result};

use crate::config::{MAX_USER_COLUMNS, NUM_RESERVED_COLUMNS, RESERVED_COLUMN_SIZE};
use crate::types::{ColumnId, WidthClass};

const _: () = assert!(RESERVED_COLUMN_SIZE == WidthClass::Eight.stored_size());

/// First slot id of each width bucket, in bucket order `[varlen, 8, 4, 2, 1]`.
pub fn compute_base_attribute_offsets(classes: &[WidthClass], num_reserved: u16) -> [u16; 5] {
    let mut counts = [0u16; 5];
    for class in classes {
        counts[class.bucket()] += 1;
    }

    let mut offsets = [0u16; 5];
    offsets[0] = num_reserved;
    for bucket in 1..offsets.len() {
        offsets[bucket] = offsets[bucket - 1] + counts[bucket - 1];
    }
    offsets
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    classes: Vec<WidthClass>,
    tuple_size: usize,
}

impl BlockLayout {
    /// Builds the layout for the given user attribute classes. Order of the
    /// input does not matter; slots are bucketed by class.
    pub fn new(user_classes: &[WidthClass]) -> Result<Self> {
        ensure!(
            !user_classes.is_empty(),
            "a block layout needs at least one user column"
        );
        ensure!(
            user_classes.len() <= MAX_USER_COLUMNS,
            "{} columns exceed the limit of {}",
            user_classes.len(),
            MAX_USER_COLUMNS
        );

        let mut sorted = user_classes.to_vec();
        sorted.sort();

        let mut classes = Vec::with_capacity(NUM_RESERVED_COLUMNS as usize + sorted.len());
        classes.extend(std::iter::repeat(WidthClass::Eight).take(NUM_RESERVED_COLUMNS as usize));
        classes.extend(sorted);

        let data_size: usize = classes.iter().map(|c| c.stored_size() as usize).sum();
        let tuple_size = data_size + classes.len().div_ceil(8);

        Ok(Self {
            classes,
            tuple_size,
        })
    }

    /// Total slots, reserved ones included.
    pub fn num_columns(&self) -> u16 {
        self.classes.len() as u16
    }

    pub fn num_reserved(&self) -> u16 {
        NUM_RESERVED_COLUMNS
    }

    pub fn num_user_columns(&self) -> u16 {
        self.num_columns() - NUM_RESERVED_COLUMNS
    }

    pub fn user_column_ids(&self) -> impl Iterator<Item = ColumnId> {
        (NUM_RESERVED_COLUMNS..self.num_columns()).map(ColumnId::new)
    }

    pub fn is_user_column(&self, col: ColumnId) -> bool {
        col.as_raw() >= NUM_RESERVED_COLUMNS && col.as_raw() < self.num_columns()
    }

    /// Width class of every slot; the index is the `ColumnId`.
    pub fn widths(&self) -> &[WidthClass] {
        &self.classes
    }

    pub fn get(&self, col: ColumnId) -> Option<WidthClass> {
        self.classes.get(col.index()).copied()
    }

    /// # Panics
    ///
    /// Panics if `col` is not a slot of this layout.
    pub fn width_class(&self, col: ColumnId) -> WidthClass {
        self.classes[col.index()]
    }

    /// Bytes the slot occupies inside a tuple.
    pub fn attr_size(&self, col: ColumnId) -> u16 {
        self.width_class(col).stored_size()
    }

    pub fn is_varlen(&self, col: ColumnId) -> bool {
        self.width_class(col).is_varlen()
    }

    /// Bytes of one tuple: every slot plus the null bitmap.
    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }
}
