//! # Width Classes
//!
//! Every attribute is stored in one of five width classes. The class decides
//! which bucket of physical slots the attribute draws from.
//!
//! | Class | Raw catalog width | Stored bytes |
//! |-------|-------------------|--------------|
//! | `VarLen` | `VARLEN_COLUMN` (0x8010) | 16 (entry) |
//! | `Eight` | 8 | 8 |
//! | `Four` | 4 | 4 |
//! | `Two` | 2 | 2 |
//! | `One` | 1 | 1 |
//!
//! The declaration order of the variants is the bucket order of the physical
//! layout, so the derived `Ord` sorts attributes exactly the way slots are
//! assigned: variable-length first, then 8, 4, 2 and 1 byte attributes.
//!
//! Raw widths come from catalog data and are untrusted; the only way to obtain
//! a `WidthClass` from one is the fallible `TryFrom<u16>`.

use std::fmt;

use crate::config::{VARLEN_COLUMN, VARLEN_ENTRY_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WidthClass {
    VarLen,
    Eight,
    Four,
    Two,
    One,
}

impl WidthClass {
    /// All classes in bucket order.
    pub const ALL: [WidthClass; 5] = [
        WidthClass::VarLen,
        WidthClass::Eight,
        WidthClass::Four,
        WidthClass::Two,
        WidthClass::One,
    ];

    /// Position of this class's bucket in the physical layout.
    pub const fn bucket(self) -> usize {
        match self {
            WidthClass::VarLen => 0,
            WidthClass::Eight => 1,
            WidthClass::Four => 2,
            WidthClass::Two => 3,
            WidthClass::One => 4,
        }
    }

    /// Width as reported by the catalog.
    pub const fn attr_size(self) -> u16 {
        match self {
            WidthClass::VarLen => VARLEN_COLUMN,
            other => other.stored_size(),
        }
    }

    /// Bytes the attribute occupies inside a tuple.
    pub const fn stored_size(self) -> u16 {
        match self {
            WidthClass::VarLen => VARLEN_ENTRY_SIZE,
            WidthClass::Eight => 8,
            WidthClass::Four => 4,
            WidthClass::Two => 2,
            WidthClass::One => 1,
        }
    }

    pub const fn is_varlen(self) -> bool {
        matches!(self, WidthClass::VarLen)
    }
}

impl TryFrom<u16> for WidthClass {
    type Error = WidthError;

    fn try_from(width: u16) -> Result<Self, Self::Error> {
        match width {
            VARLEN_COLUMN => Ok(WidthClass::VarLen),
            8 => Ok(WidthClass::Eight),
            4 => Ok(WidthClass::Four),
            2 => Ok(WidthClass::Two),
            1 => Ok(WidthClass::One),
            width => Err(WidthError { width }),
        }
    }
}

impl fmt::Display for WidthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidthClass::VarLen => write!(f, "varlen"),
            other => write!(f, "{}-byte", other.stored_size()),
        }
    }
}

/// A raw attribute width outside the five supported classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthError {
    pub width: u16,
}

impl fmt::Display for WidthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported attribute width {:#06x} (expected 1, 2, 4, 8 or variable-length)",
            self.width
        )
    }
}

impl std::error::Error for WidthError {}
