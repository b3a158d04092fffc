//! # Projected Rows
//!
//! A `ProjectedRow` is a row buffer holding a subset of a table's physical
//! slots. Its positions are the requested `ColumnId`s in ascending order, which
//! is the same order `ColumnMap::project` assigns to logical columns.
//!
//! ## Buffer Format
//!
//! ```text
//! +-------------+----------------------------+--------------------------+
//! | null bitmap | fixed-width bytes          | varlen entries           |
//! | 1 bit / pos | packed, widest class first | one Option per varlen pos|
//! +-------------+----------------------------+--------------------------+
//! ```
//!
//! A set bit in the null bitmap marks the position NULL. A freshly
//! initialized row is all NULL; writing a value clears the bit.
//!
//! Because positions follow `ColumnId` order and ids are bucketed by width,
//! fixed-width values are packed widest first and need no padding.
//!
//! ## Initializers
//!
//! `ProjectedRowInitializer` validates a column id set against a
//! `BlockLayout` once and then stamps out empty rows of that shape. The shape
//! is shared through an `Arc`, so `initialize_row` only allocates the buffers.

use std::sync::Arc;

use eyre::{bail, ensure, Result};

use crate::config::VARLEN_ENTRY_SIZE;
use crate::storage::{BlockLayout, StorageError};
use crate::types::{ColumnId, VarlenEntry, WidthClass};

#[derive(Debug, PartialEq, Eq)]
struct RowShape {
    col_ids: Vec<ColumnId>,
    classes: Vec<WidthClass>,
    /// Byte offset into the fixed buffer, or index into the varlen list.
    offsets: Vec<usize>,
    fixed_size: usize,
    num_varlen: usize,
}

impl RowShape {
    fn bitmap_len(&self) -> usize {
        self.col_ids.len().div_ceil(8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRowInitializer {
    shape: Arc<RowShape>,
}

impl ProjectedRowInitializer {
    /// Validates `col_ids` against `layout`. Ids may arrive in any order but
    /// must be distinct user columns of the layout.
    pub fn new(layout: &BlockLayout, mut col_ids: Vec<ColumnId>) -> Result<Self> {
        ensure!(
            !col_ids.is_empty(),
            "a projected row needs at least one column"
        );
        col_ids.sort_unstable();
        for pair in col_ids.windows(2) {
            ensure!(pair[0] != pair[1], "column {} requested twice", pair[0]);
        }

        let mut classes = Vec::with_capacity(col_ids.len());
        let mut offsets = Vec::with_capacity(col_ids.len());
        let mut fixed_size = 0usize;
        let mut num_varlen = 0usize;

        for &col in &col_ids {
            if !layout.is_user_column(col) {
                return Err(StorageError::ColumnNotInLayout {
                    col,
                    num_columns: layout.num_columns(),
                }
                .into());
            }
            let class = layout.width_class(col);
            if class.is_varlen() {
                offsets.push(num_varlen);
                num_varlen += 1;
            } else {
                offsets.push(fixed_size);
                fixed_size += class.attr_size() as usize;
            }
            classes.push(class);
        }

        Ok(Self {
            shape: Arc::new(RowShape {
                col_ids,
                classes,
                offsets,
                fixed_size,
                num_varlen,
            }),
        })
    }

    pub fn initialize_row(&self) -> ProjectedRow {
        let shape = Arc::clone(&self.shape);
        let mut row = ProjectedRow {
            null_bitmap: vec![0; shape.bitmap_len()],
            fixed: vec![0; shape.fixed_size],
            varlens: vec![None; shape.num_varlen],
            shape,
        };
        row.mark_all_null();
        row
    }

    pub fn num_columns(&self) -> usize {
        self.shape.col_ids.len()
    }

    /// Column ids in position order.
    pub fn column_ids(&self) -> &[ColumnId] {
        &self.shape.col_ids
    }

    /// Bytes a row of this shape occupies when serialized: bitmap, fixed
    /// values and one 16-byte entry per varlen position.
    pub fn projected_row_size(&self) -> usize {
        self.shape.bitmap_len()
            + self.shape.fixed_size
            + self.shape.num_varlen * VARLEN_ENTRY_SIZE as usize
    }
}

/// Borrowed view of a non-NULL attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr<'a> {
    Fixed(&'a [u8]),
    Varlen(&'a VarlenEntry),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow {
    shape: Arc<RowShape>,
    null_bitmap: Vec<u8>,
    fixed: Vec<u8>,
    varlens: Vec<Option<VarlenEntry>>,
}

impl ProjectedRow {
    pub fn num_columns(&self) -> u16 {
        self.shape.col_ids.len() as u16
    }

    pub fn column_ids(&self) -> &[ColumnId] {
        &self.shape.col_ids
    }

    /// # Panics
    ///
    /// Panics if `pos` is not a position of this row.
    pub fn column_id(&self, pos: u16) -> ColumnId {
        self.shape.col_ids[pos as usize]
    }

    /// # Panics
    ///
    /// Panics if `pos` is not a position of this row.
    pub fn width_class(&self, pos: u16) -> WidthClass {
        self.shape.classes[pos as usize]
    }

    pub fn position_of(&self, col: ColumnId) -> Option<u16> {
        self.shape
            .col_ids
            .binary_search(&col)
            .ok()
            .map(|pos| pos as u16)
    }

    fn check_pos(&self, pos: u16) -> Result<usize> {
        let idx = pos as usize;
        ensure!(
            idx < self.shape.col_ids.len(),
            "position {} out of range for a row of {} columns",
            pos,
            self.shape.col_ids.len()
        );
        Ok(idx)
    }

    /// # Panics
    ///
    /// Panics if `pos` is not a position of this row.
    pub fn is_null(&self, pos: u16) -> bool {
        let pos = pos as usize;
        self.null_bitmap[pos / 8] & (1 << (pos % 8)) != 0
    }

    /// Marks the position NULL and drops whatever value it held.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not a position of this row.
    pub fn set_null(&mut self, pos: u16) {
        let idx = pos as usize;
        self.null_bitmap[idx / 8] |= 1 << (idx % 8);
        let offset = self.shape.offsets[idx];
        let class = self.shape.classes[idx];
        if class.is_varlen() {
            self.varlens[offset] = None;
        } else {
            self.fixed[offset..offset + class.attr_size() as usize].fill(0);
        }
    }

    fn clear_null(&mut self, pos: u16) {
        let pos = pos as usize;
        self.null_bitmap[pos / 8] &= !(1 << (pos % 8));
    }

    fn mark_all_null(&mut self) {
        for pos in 0..self.shape.col_ids.len() {
            self.null_bitmap[pos / 8] |= 1 << (pos % 8);
        }
    }

    /// Resets every position to NULL, keeping the buffers for reuse.
    pub fn clear(&mut self) {
        self.mark_all_null();
        self.fixed.fill(0);
        for entry in &mut self.varlens {
            *entry = None;
        }
    }

    /// Returns the attribute, or `None` if the position is NULL.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not a position of this row. The typed getters
    /// report that case as an error instead.
    pub fn access_with_null_check(&self, pos: u16) -> Option<Attr<'_>> {
        if self.is_null(pos) {
            return None;
        }
        let idx = pos as usize;
        let offset = self.shape.offsets[idx];
        let class = self.shape.classes[idx];
        if class.is_varlen() {
            self.varlens[offset].as_ref().map(Attr::Varlen)
        } else {
            Some(Attr::Fixed(
                &self.fixed[offset..offset + class.attr_size() as usize],
            ))
        }
    }

    /// Marks a fixed-width position non-NULL and returns its bytes for writing.
    pub fn access_force_not_null(&mut self, pos: u16) -> Result<&mut [u8]> {
        let idx = self.check_pos(pos)?;
        let class = self.shape.classes[idx];
        ensure!(
            !class.is_varlen(),
            "position {} holds variable-length values",
            pos
        );
        self.clear_null(pos);
        let offset = self.shape.offsets[idx];
        Ok(&mut self.fixed[offset..offset + class.attr_size() as usize])
    }

    pub fn set_varlen(&mut self, pos: u16, entry: VarlenEntry) -> Result<()> {
        let idx = self.check_pos(pos)?;
        let class = self.shape.classes[idx];
        if !class.is_varlen() {
            return Err(StorageError::WidthMismatch {
                expected: class,
                actual: WidthClass::VarLen,
            }
            .into());
        }
        self.clear_null(pos);
        self.varlens[self.shape.offsets[idx]] = Some(entry);
        Ok(())
    }

    pub fn varlen(&self, pos: u16) -> Option<&VarlenEntry> {
        match self.access_with_null_check(pos)? {
            Attr::Varlen(entry) => Some(entry),
            Attr::Fixed(_) => None,
        }
    }

    /// Removes the entry at `pos`, leaving the position NULL.
    pub fn take_varlen(&mut self, pos: u16) -> Option<VarlenEntry> {
        let idx = pos as usize;
        if !self.shape.classes.get(idx)?.is_varlen() {
            return None;
        }
        self.null_bitmap[idx / 8] |= 1 << (idx % 8);
        self.varlens[self.shape.offsets[idx]].take()
    }

    fn check_same_class(&self, pos: u16, src: &ProjectedRow, src_pos: u16) -> Result<()> {
        self.check_pos(pos)?;
        src.check_pos(src_pos)?;
        let expected = self.width_class(pos);
        let actual = src.width_class(src_pos);
        if expected != actual {
            return Err(StorageError::WidthMismatch { expected, actual }.into());
        }
        Ok(())
    }

    /// Copies the attribute at `src_pos` of `src` into `pos`.
    ///
    /// NULL stays NULL and fixed-width bytes are copied as they are. Varlen
    /// entries go through `VarlenEntry::deep_copy`, so a reclaimable payload
    /// is never shared with `src`. Returns true when such a payload was
    /// duplicated.
    pub fn copy_attribute(&mut self, pos: u16, src: &ProjectedRow, src_pos: u16) -> Result<bool> {
        self.check_same_class(pos, src, src_pos)?;
        match src.access_with_null_check(src_pos) {
            None => {
                self.set_null(pos);
                Ok(false)
            }
            Some(Attr::Fixed(bytes)) => {
                self.access_force_not_null(pos)?.copy_from_slice(bytes);
                Ok(false)
            }
            Some(Attr::Varlen(entry)) => {
                let reclaimable = entry.needs_reclaim();
                self.set_varlen(pos, entry.deep_copy())?;
                Ok(reclaimable)
            }
        }
    }

    /// Like `copy_attribute` but moves varlen entries out of `src` instead
    /// of duplicating them.
    pub fn move_attribute(&mut self, pos: u16, src: &mut ProjectedRow, src_pos: u16) -> Result<()> {
        self.check_same_class(pos, src, src_pos)?;
        if src.is_null(src_pos) {
            self.set_null(pos);
            return Ok(());
        }
        if src.width_class(src_pos).is_varlen() {
            match src.take_varlen(src_pos) {
                Some(entry) => self.set_varlen(pos, entry)?,
                None => self.set_null(pos),
            }
            return Ok(());
        }
        self.copy_attribute(pos, src, src_pos).map(|_| ())
    }

    fn write_fixed(&mut self, pos: u16, bytes: &[u8]) -> Result<()> {
        let slot = self.access_force_not_null(pos)?;
        if slot.len() != bytes.len() {
            let expected = WidthClass::try_from(slot.len() as u16)?;
            let actual = WidthClass::try_from(bytes.len() as u16)?;
            // restore NULL so a failed write leaves no half-set value behind
            self.set_null(pos);
            return Err(StorageError::WidthMismatch { expected, actual }.into());
        }
        slot.copy_from_slice(bytes);
        Ok(())
    }

    fn read_fixed<const N: usize>(&self, pos: u16) -> Result<Option<[u8; N]>> {
        self.check_pos(pos)?;
        match self.access_with_null_check(pos) {
            None => Ok(None),
            Some(Attr::Fixed(bytes)) => match <[u8; N]>::try_from(bytes) {
                Ok(array) => Ok(Some(array)),
                Err(_) => bail!(
                    "position {} holds {}-byte values, not {}",
                    pos,
                    bytes.len(),
                    N
                ),
            },
            Some(Attr::Varlen(_)) => bail!("position {} holds variable-length values", pos),
        }
    }

    pub fn set_bool(&mut self, pos: u16, value: bool) -> Result<()> {
        self.write_fixed(pos, &[value as u8])
    }

    pub fn set_i8(&mut self, pos: u16, value: i8) -> Result<()> {
        self.write_fixed(pos, &value.to_le_bytes())
    }

    pub fn set_i16(&mut self, pos: u16, value: i16) -> Result<()> {
        self.write_fixed(pos, &value.to_le_bytes())
    }

    pub fn set_i32(&mut self, pos: u16, value: i32) -> Result<()> {
        self.write_fixed(pos, &value.to_le_bytes())
    }

    pub fn set_i64(&mut self, pos: u16, value: i64) -> Result<()> {
        self.write_fixed(pos, &value.to_le_bytes())
    }

    pub fn set_f64(&mut self, pos: u16, value: f64) -> Result<()> {
        self.write_fixed(pos, &value.to_le_bytes())
    }

    pub fn get_bool(&self, pos: u16) -> Result<Option<bool>> {
        Ok(self.read_fixed::<1>(pos)?.map(|b| b[0] != 0))
    }

    pub fn get_i8(&self, pos: u16) -> Result<Option<i8>> {
        Ok(self.read_fixed(pos)?.map(i8::from_le_bytes))
    }

    pub fn get_i16(&self, pos: u16) -> Result<Option<i16>> {
        Ok(self.read_fixed(pos)?.map(i16::from_le_bytes))
    }

    pub fn get_i32(&self, pos: u16) -> Result<Option<i32>> {
        Ok(self.read_fixed(pos)?.map(i32::from_le_bytes))
    }

    pub fn get_i64(&self, pos: u16) -> Result<Option<i64>> {
        Ok(self.read_fixed(pos)?.map(i64::from_le_bytes))
    }

    pub fn get_f64(&self, pos: u16) -> Result<Option<f64>> {
        Ok(self.read_fixed(pos)?.map(f64::from_le_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> BlockLayout {
        // ids: 0 reserved, 1 varlen, 2 eight, 3 four, 4 one
        BlockLayout::new(&[
            WidthClass::Four,
            WidthClass::VarLen,
            WidthClass::One,
            WidthClass::Eight,
        ])
        .unwrap()
    }

    fn ids(raw: &[u16]) -> Vec<ColumnId> {
        raw.iter().copied().map(ColumnId::new).collect()
    }

    #[test]
    fn positions_follow_ascending_column_ids() {
        let init = ProjectedRowInitializer::new(&layout(), ids(&[4, 1, 3])).unwrap();
        assert_eq!(init.column_ids(), ids(&[1, 3, 4]).as_slice());
        let row = init.initialize_row();
        assert_eq!(row.position_of(ColumnId::new(3)), Some(1));
        assert_eq!(row.position_of(ColumnId::new(2)), None);
        assert_eq!(row.width_class(0), WidthClass::VarLen);
    }

    #[test]
    fn fresh_row_is_all_null() {
        let init = ProjectedRowInitializer::new(&layout(), ids(&[1, 2, 3, 4])).unwrap();
        let row = init.initialize_row();
        for pos in 0..row.num_columns() {
            assert!(row.is_null(pos));
            assert_eq!(row.access_with_null_check(pos), None);
        }
    }

    #[test]
    fn rejects_reserved_duplicate_and_missing_ids() {
        let layout = layout();
        let err = ProjectedRowInitializer::new(&layout, ids(&[0])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::ColumnNotInLayout { .. })
        ));
        assert!(ProjectedRowInitializer::new(&layout, ids(&[9])).is_err());
        assert!(ProjectedRowInitializer::new(&layout, ids(&[2, 2])).is_err());
        assert!(ProjectedRowInitializer::new(&layout, vec![]).is_err());
    }

    #[test]
    fn typed_values_round_trip_through_positions() {
        let init = ProjectedRowInitializer::new(&layout(), ids(&[1, 2, 3, 4])).unwrap();
        let mut row = init.initialize_row();
        row.set_varlen(0, VarlenEntry::from("hello")).unwrap();
        row.set_i64(1, -42).unwrap();
        row.set_i32(2, 7).unwrap();
        row.set_bool(3, true).unwrap();

        assert_eq!(row.varlen(0).unwrap().content(), b"hello");
        assert_eq!(row.get_i64(1).unwrap(), Some(-42));
        assert_eq!(row.get_i32(2).unwrap(), Some(7));
        assert_eq!(row.get_bool(3).unwrap(), Some(true));
    }

    #[test]
    fn wrong_width_setter_fails_and_leaves_null() {
        let init = ProjectedRowInitializer::new(&layout(), ids(&[3])).unwrap();
        let mut row = init.initialize_row();
        let err = row.set_i64(0, 1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StorageError>(),
            Some(&StorageError::WidthMismatch {
                expected: WidthClass::Four,
                actual: WidthClass::Eight,
            })
        );
        assert!(row.is_null(0));
        assert!(row.get_i64(0).unwrap().is_none());
        assert!(row.set_varlen(0, VarlenEntry::from("x")).is_err());
    }

    #[test]
    fn set_null_drops_previous_value() {
        let init = ProjectedRowInitializer::new(&layout(), ids(&[1, 3])).unwrap();
        let mut row = init.initialize_row();
        row.set_varlen(0, VarlenEntry::from("abc")).unwrap();
        row.set_i32(1, 5).unwrap();
        row.set_null(0);
        row.set_null(1);
        assert_eq!(row, init.initialize_row());
    }

    #[test]
    fn clear_resets_to_fresh_state() {
        let init = ProjectedRowInitializer::new(&layout(), ids(&[1, 2])).unwrap();
        let mut row = init.initialize_row();
        row.set_varlen(0, VarlenEntry::owned(vec![7u8; 64])).unwrap();
        row.set_i64(1, 99).unwrap();
        row.clear();
        assert_eq!(row, init.initialize_row());
    }

    #[test]
    fn copy_attribute_duplicates_owned_payloads() {
        let init = ProjectedRowInitializer::new(&layout(), ids(&[1, 2])).unwrap();
        let mut src = init.initialize_row();
        src.set_varlen(0, VarlenEntry::owned(vec![1u8; 40])).unwrap();
        src.set_i64(1, 3).unwrap();

        let mut dst = init.initialize_row();
        assert!(dst.copy_attribute(0, &src, 0).unwrap());
        assert!(!dst.copy_attribute(1, &src, 1).unwrap());
        assert_eq!(dst, src);
        assert_ne!(
            dst.varlen(0).unwrap().content().as_ptr(),
            src.varlen(0).unwrap().content().as_ptr()
        );
    }

    #[test]
    fn move_attribute_takes_the_entry() {
        let init = ProjectedRowInitializer::new(&layout(), ids(&[1])).unwrap();
        let mut src = init.initialize_row();
        src.set_varlen(0, VarlenEntry::owned(vec![2u8; 40])).unwrap();
        let ptr = src.varlen(0).unwrap().content().as_ptr();

        let mut dst = init.initialize_row();
        dst.move_attribute(0, &mut src, 0).unwrap();
        assert!(src.is_null(0));
        assert_eq!(dst.varlen(0).unwrap().content().as_ptr(), ptr);
    }

    #[test]
    fn copy_between_classes_is_rejected() {
        let layout = layout();
        let wide = ProjectedRowInitializer::new(&layout, ids(&[2])).unwrap();
        let narrow = ProjectedRowInitializer::new(&layout, ids(&[3])).unwrap();
        let mut src = wide.initialize_row();
        src.set_i64(0, 1).unwrap();
        let mut dst = narrow.initialize_row();
        assert!(dst.copy_attribute(0, &src, 0).is_err());
    }

    #[test]
    fn positions_past_the_row_are_errors() {
        let init = ProjectedRowInitializer::new(&layout(), ids(&[2])).unwrap();
        let mut row = init.initialize_row();
        row.set_i64(0, 7).unwrap();

        assert!(row.get_i64(3).is_err());
        assert!(row.get_bool(1).is_err());
        assert!(row.set_i64(1, 1).is_err());
        assert!(row.set_varlen(5, VarlenEntry::from("x")).is_err());

        let other = init.initialize_row();
        assert!(row.copy_attribute(0, &other, 4).is_err());
        assert!(row.copy_attribute(2, &other, 0).is_err());
        assert_eq!(row.get_i64(0).unwrap(), Some(7));
    }

    #[test]
    fn serialized_size_counts_entries() {
        let init = ProjectedRowInitializer::new(&layout(), ids(&[1, 2, 3, 4])).unwrap();
        // bitmap 1 + 8 + 4 + 1 + one varlen entry
        assert_eq!(init.projected_row_size(), 1 + 8 + 4 + 1 + 16);
    }
}
