//! # Tuple Versions
//!
//! Every stored tuple carries a `VersionHeader` naming the transaction that
//! wrote it and, once deleted, the transaction that deleted it. Updates are
//! out of place: the old tuple gets a deleter and the new image is appended,
//! so a header never changes its writer.
//!
//! ## Visibility Check (Snapshot Isolation)
//!
//! A tuple is visible to T if:
//! 1. T sees its writer (T itself, or committed before T started)
//! 2. it has no deleter, or T does not see its deleter
//!
//! ## Write Check
//!
//! T may delete a tuple when it is visible to T and any existing deleter
//! aborted. A running deleter is a lock held by another transaction; a
//! committed one is a concurrent modification.

use super::{Transaction, TxnId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityResult {
    Visible,
    Invisible,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCheckResult {
    CanWrite,
    NotVisible,
    LockedByOther,
    ConcurrentModification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionHeader {
    pub writer: TxnId,
    pub deleter: Option<TxnId>,
}

impl VersionHeader {
    pub fn new(writer: TxnId) -> Self {
        Self {
            writer,
            deleter: None,
        }
    }

    pub fn visibility(&self, txn: &Transaction<'_>) -> VisibilityResult {
        if !txn.sees_writes_of(self.writer) {
            return VisibilityResult::Invisible;
        }
        match self.deleter {
            Some(deleter) if txn.sees_writes_of(deleter) => VisibilityResult::Deleted,
            _ => VisibilityResult::Visible,
        }
    }

    pub fn is_visible_to(&self, txn: &Transaction<'_>) -> bool {
        self.visibility(txn) == VisibilityResult::Visible
    }

    pub fn can_delete(&self, txn: &Transaction<'_>) -> WriteCheckResult {
        if !self.is_visible_to(txn) {
            return WriteCheckResult::NotVisible;
        }
        let Some(deleter) = self.deleter else {
            return WriteCheckResult::CanWrite;
        };
        let manager = txn.manager();
        if manager.is_aborted(deleter) {
            WriteCheckResult::CanWrite
        } else if manager.commit_ts(deleter).is_some() {
            WriteCheckResult::ConcurrentModification
        } else {
            WriteCheckResult::LockedByOther
        }
    }
}
