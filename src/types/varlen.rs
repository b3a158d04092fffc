//! # Variable-Length Entries
//!
//! A `VarlenEntry` is the value stored in a variable-length slot. Which variant
//! an entry uses decides who may reclaim its bytes:
//!
//! | Variant | Backing bytes | Reclaimed by | Copy across tables |
//! |---------|---------------|--------------|--------------------|
//! | `Inline` | embedded in the entry (<= 12 bytes) | nobody | verbatim |
//! | `Owned` | private heap allocation | the holder | fresh allocation |
//! | `Shared` | immutable `Arc<[u8]>` outliving either table | last `Arc` | verbatim |
//!
//! There is no way to build an entry whose bytes are freed by someone other
//! than its holder while the holder still points at them: `Owned` is the only
//! reclaiming variant and duplicating it always allocates. Sharing a payload
//! between tables requires the caller to hand over an `Arc`, which keeps the
//! bytes alive for every holder.
//!
//! ## Equality
//!
//! Entries compare by content, so an inlined `"ab"` equals an owned `"ab"`.

use std::fmt;
use std::sync::Arc;

use crate::config::VARLEN_INLINE_THRESHOLD;

pub enum VarlenEntry {
    Inline {
        len: u8,
        bytes: [u8; VARLEN_INLINE_THRESHOLD],
    },
    Owned(Box<[u8]>),
    Shared(Arc<[u8]>),
}

impl VarlenEntry {
    /// Builds an entry holding a copy of `content`, inlined when it fits.
    pub fn create(content: &[u8]) -> Self {
        Self::inline(content).unwrap_or_else(|| VarlenEntry::Owned(content.into()))
    }

    /// Embeds `content` directly, or returns `None` if it is too long.
    pub fn inline(content: &[u8]) -> Option<Self> {
        if content.len() > VARLEN_INLINE_THRESHOLD {
            return None;
        }
        let mut bytes = [0u8; VARLEN_INLINE_THRESHOLD];
        bytes[..content.len()].copy_from_slice(content);
        Some(VarlenEntry::Inline {
            len: content.len() as u8,
            bytes,
        })
    }

    /// Takes ownership of an allocation regardless of its length.
    pub fn owned(content: impl Into<Box<[u8]>>) -> Self {
        VarlenEntry::Owned(content.into())
    }

    /// Refers to immutable storage whose lifetime is managed by the `Arc`.
    pub fn shared(content: Arc<[u8]>) -> Self {
        VarlenEntry::Shared(content)
    }

    pub fn size(&self) -> usize {
        match self {
            VarlenEntry::Inline { len, .. } => *len as usize,
            VarlenEntry::Owned(bytes) => bytes.len(),
            VarlenEntry::Shared(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn content(&self) -> &[u8] {
        match self {
            VarlenEntry::Inline { len, bytes } => &bytes[..*len as usize],
            VarlenEntry::Owned(bytes) => bytes,
            VarlenEntry::Shared(bytes) => bytes,
        }
    }

    /// True when the holder is responsible for freeing the backing bytes.
    pub fn needs_reclaim(&self) -> bool {
        matches!(self, VarlenEntry::Owned(_))
    }

    pub fn is_inlined(&self) -> bool {
        matches!(self, VarlenEntry::Inline { .. })
    }

    /// Duplicates the entry for a holder that may outlive this one.
    ///
    /// `Owned` content is copied into a new allocation; the other variants have
    /// no reclaim race and are copied verbatim.
    pub fn deep_copy(&self) -> Self {
        match self {
            VarlenEntry::Inline { len, bytes } => VarlenEntry::Inline {
                len: *len,
                bytes: *bytes,
            },
            VarlenEntry::Owned(bytes) => VarlenEntry::Owned(bytes.to_vec().into_boxed_slice()),
            VarlenEntry::Shared(bytes) => VarlenEntry::Shared(Arc::clone(bytes)),
        }
    }
}

impl Clone for VarlenEntry {
    fn clone(&self) -> Self {
        self.deep_copy()
    }
}

impl PartialEq for VarlenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.content() == other.content()
    }
}

impl Eq for VarlenEntry {}

impl fmt::Debug for VarlenEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            VarlenEntry::Inline { .. } => "Inline",
            VarlenEntry::Owned(_) => "Owned",
            VarlenEntry::Shared(_) => "Shared",
        };
        f.debug_struct("VarlenEntry")
            .field("kind", &kind)
            .field("content", &String::from_utf8_lossy(self.content()))
            .finish()
    }
}

impl From<&str> for VarlenEntry {
    fn from(text: &str) -> Self {
        VarlenEntry::create(text.as_bytes())
    }
}

impl From<&[u8]> for VarlenEntry {
    fn from(bytes: &[u8]) -> Self {
        VarlenEntry::create(bytes)
    }
}
