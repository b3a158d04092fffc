//! # Core Types
//!
//! Identifiers, width classes and variable-length entries shared by every other
//! module.
//!
//! ## Module Structure
//!
//! - `ids`: Opaque identifier newtypes and `TupleSlot`
//! - `width`: `WidthClass` closed enumeration and `WidthError`
//! - `varlen`: `VarlenEntry`, the ownership-tagged variable-length payload
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | `ColumnOid` | Logical column identifier (catalog) |
//! | `ColumnId` | Physical slot identifier (layout) |
//! | `WidthClass` | Storage bucket of an attribute |
//! | `VarlenEntry` | Variable-length payload with explicit ownership |

mod ids;
mod varlen;
mod width;

pub use ids::{BlockId, ColumnId, ColumnOid, DbOid, LayoutVersion, TableOid, TupleSlot};
pub use varlen::VarlenEntry;
pub use width::{WidthClass, WidthError};
