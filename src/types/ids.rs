//! # Identifiers
//!
//! Opaque identifier newtypes shared by the catalog, storage and table layers.
//!
//! | Type | Width | Assigned by | Meaning |
//! |------|-------|-------------|---------|
//! | `ColumnOid` | u32 | catalog | logical column, stable for the schema's life |
//! | `ColumnId` | u16 | layout builder | physical slot, dense, per layout |
//! | `TableOid` | u32 | catalog | table identity used when staging writes |
//! | `DbOid` | u32 | catalog | database identity used when staging writes |
//! | `LayoutVersion` | u32 | table | version of the physical layout |
//! | `BlockId` | u32 | block store | storage block |
//!
//! A `TupleSlot` names one physical row location: a block plus an offset in it.

use std::fmt;

strong_id! {
    /// Catalog-assigned identifier of a logical column.
    ColumnOid(u32)
}

strong_id! {
    /// Identifier of a physical column slot within a block layout.
    ColumnId(u16)
}

strong_id! {
    /// Catalog-assigned table identifier.
    TableOid(u32)
}

strong_id! {
    /// Catalog-assigned database identifier.
    DbOid(u32)
}

strong_id! {
    /// Version of a table's physical layout. Tables never migrate in place, so
    /// every table built by this crate carries version 0.
    LayoutVersion(u32)
}

strong_id! {
    /// Identifier of a block handed out by a block store.
    BlockId(u32)
}

impl ColumnOid {
    /// Never assigned by the catalog; marks a column that has no oid yet.
    pub const INVALID: Self = Self(0);

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl ColumnId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Physical location of a tuple: block plus offset inside the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleSlot {
    block: BlockId,
    offset: u32,
}

impl TupleSlot {
    pub const fn new(block: BlockId, offset: u32) -> Self {
        Self { block, offset }
    }

    pub const fn block(&self) -> BlockId {
        self.block
    }

    pub const fn offset(&self) -> u32 {
        self.offset
    }
}

impl fmt::Display for TupleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_oid_is_zero() {
        assert_eq!(ColumnOid::INVALID.as_raw(), 0);
        assert!(!ColumnOid::INVALID.is_valid());
        assert!(ColumnOid::new(7).is_valid());
    }

    #[test]
    fn ids_order_by_raw_value() {
        assert!(ColumnId::new(1) < ColumnId::new(2));
        assert_eq!(ColumnId::from(3u16).index(), 3);
    }

    #[test]
    fn tuple_slot_displays_block_and_offset() {
        let slot = TupleSlot::new(BlockId::new(4), 17);
        assert_eq!(slot.to_string(), "4:17");
        assert_eq!(slot.block(), BlockId::new(4));
        assert_eq!(slot.offset(), 17);
    }
}
