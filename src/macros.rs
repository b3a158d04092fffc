//! # Internal Macros
//!
//! This module provides internal macros for reducing boilerplate.
//!
//! ## strong_id!
//!
//! Generates an opaque identifier newtype over an integer with the accessors
//! and trait impls every identifier in the crate needs.
//!
//! ### Usage
//!
//! ```ignore
//! strong_id! {
//!     /// Catalog-assigned column identifier.
//!     ColumnOid(u32)
//! }
//!
//! // Generates:
//! // pub struct ColumnOid(u32);
//! // pub const fn new(raw: u32) -> Self
//! // pub const fn as_raw(self) -> u32
//! // impl Display, From<u32>
//! ```

/// Generates a `Copy` identifier newtype with `new`/`as_raw`, `Display` and `From`.
macro_rules! strong_id {
    ($(#[$meta:meta])* $name:ident($raw:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name($raw);

        impl $name {
            #[inline]
            pub const fn new(raw: $raw) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn as_raw(self) -> $raw {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$raw> for $name {
            #[inline]
            fn from(raw: $raw) -> Self {
                Self(raw)
            }
        }
    };
}
