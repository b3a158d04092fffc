//! # Transaction Management
//!
//! Transaction primitives used by the table layer. Every read and write goes
//! through a `Transaction`, which carries the snapshot the read sees and the
//! writes it has applied.
//!
//! ## Transaction Identifiers
//!
//! `TxnId`s are 64-bit values drawn from one global atomic counter. A
//! transaction's id is its start timestamp; commit timestamps come from the
//! same counter, so "committed before T started" is a plain comparison.
//!
//! - `TxnId = 0`: never handed out; the counter starts at 1
//!
//! ## Transaction States
//!
//! ```text
//! +---------+     commit()     +-----------+
//! | Active  | ---------------> | Committed |
//! +---------+                  +-----------+
//!      |
//!      | abort() / drop
//!      v
//! +---------+
//! | Aborted |
//! +---------+
//! ```
//!
//! ## Commit Log
//!
//! The manager records the outcome of every finished transaction. Tuples
//! only carry the id of the transaction that wrote or deleted them, and
//! visibility resolves that id through the log:
//!
//! | Outcome | Seen by T |
//! |---------|-----------|
//! | writer is T | always |
//! | `Committed(ts)` with `ts < T.id` | yes |
//! | still running, `Aborted`, or committed later | no |
//!
//! `begin_txn` draws its timestamp under the log's read lock and `commit_txn`
//! draws the commit timestamp and records it under the write lock, so a
//! commit timestamp below a start timestamp is always already in the log.
//!
//! ## Slot Array
//!
//! Active transactions occupy one of `MAX_CONCURRENT_TXNS` slots holding
//! their start timestamp (0 = free).
//!
//! ## Write Entries
//!
//! Each transaction keeps a `SmallVec<[WriteEntry; 16]>` of the slots it
//! inserted or deleted, so small transactions never touch the heap.
//!
//! ## Safety Invariants
//!
//! 1. A transaction id is never reused
//! 2. Slots are released on commit/abort (enforced via Drop)
//! 3. An outcome, once logged, never changes

use std::sync::atomic::{AtomicU64, Ordering};

use eyre::{bail, Result};
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;

use crate::config::MAX_CONCURRENT_TXNS;
use crate::mvcc::{RedoRecord, WriteEntry};
use crate::storage::ProjectedRowInitializer;
use crate::types::{DbOid, TableOid};

pub type TxnId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnOutcome {
    Committed(TxnId),
    Aborted,
}

pub struct TransactionManager {
    global_ts: AtomicU64,
    active_slots: [AtomicU64; MAX_CONCURRENT_TXNS],
    slot_lock: Mutex<()>,
    // TODO: once tuple headers can be stamped with commit timestamps, prune
    // outcomes older than the oldest active start timestamp instead of
    // keeping every one.
    outcomes: RwLock<HashMap<TxnId, TxnOutcome>>,
}

impl TransactionManager {
    #[allow(clippy::declare_interior_mutable_const)]
    pub fn new() -> Self {
        const INIT: AtomicU64 = AtomicU64::new(0);
        Self {
            global_ts: AtomicU64::new(1),
            #[allow(clippy::borrow_interior_mutable_const)]
            active_slots: [INIT; MAX_CONCURRENT_TXNS],
            slot_lock: Mutex::new(()),
            outcomes: RwLock::new(HashMap::new()),
        }
    }

    pub fn begin_txn(&self) -> Result<Transaction<'_>> {
        let _guard = self.slot_lock.lock();
        let Some(idx) = self
            .active_slots
            .iter()
            .position(|slot| slot.load(Ordering::Relaxed) == 0)
        else {
            bail!(
                "too many concurrent transactions (max {})",
                MAX_CONCURRENT_TXNS
            );
        };

        let start_ts = {
            let _outcomes = self.outcomes.read();
            self.global_ts.fetch_add(1, Ordering::SeqCst)
        };
        self.active_slots[idx].store(start_ts, Ordering::SeqCst);
        tracing::trace!(txn = start_ts, slot = idx, "began transaction");
        Ok(Transaction::new(self, start_ts, idx))
    }

    fn commit_txn(&self, txn_id: TxnId, slot_idx: usize) -> TxnId {
        let commit_ts = {
            let mut outcomes = self.outcomes.write();
            let commit_ts = self.global_ts.fetch_add(1, Ordering::SeqCst);
            outcomes.insert(txn_id, TxnOutcome::Committed(commit_ts));
            commit_ts
        };
        self.active_slots[slot_idx].store(0, Ordering::SeqCst);
        commit_ts
    }

    fn abort_txn(&self, txn_id: TxnId, slot_idx: usize) {
        self.outcomes.write().insert(txn_id, TxnOutcome::Aborted);
        self.active_slots[slot_idx].store(0, Ordering::SeqCst);
    }

    /// `None` while the transaction is still running.
    pub fn outcome(&self, txn_id: TxnId) -> Option<TxnOutcome> {
        self.outcomes.read().get(&txn_id).copied()
    }

    pub fn commit_ts(&self, txn_id: TxnId) -> Option<TxnId> {
        match self.outcome(txn_id)? {
            TxnOutcome::Committed(ts) => Some(ts),
            TxnOutcome::Aborted => None,
        }
    }

    pub fn is_aborted(&self, txn_id: TxnId) -> bool {
        self.outcome(txn_id) == Some(TxnOutcome::Aborted)
    }

    pub fn active_count(&self) -> usize {
        self.active_slots
            .iter()
            .filter(|slot| slot.load(Ordering::Relaxed) != 0)
            .count()
    }

}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Transaction<'a> {
    id: TxnId,
    slot_idx: usize,
    write_entries: SmallVec<[WriteEntry; 16]>,
    manager: &'a TransactionManager,
    finished: bool,
}

impl<'a> Transaction<'a> {
    fn new(manager: &'a TransactionManager, id: TxnId, slot_idx: usize) -> Self {
        Self {
            id,
            slot_idx,
            write_entries: SmallVec::new(),
            manager,
            finished: false,
        }
    }

    /// Start timestamp, which doubles as the transaction's identity.
    pub fn id(&self) -> TxnId {
        self.id
    }

    pub fn manager(&self) -> &'a TransactionManager {
        self.manager
    }

    pub fn write_entries(&self) -> &[WriteEntry] {
        &self.write_entries
    }

    /// Opens a pending write against `table_oid`. The returned record owns an
    /// empty delta row shaped by `initializer`; fill it and hand it to the
    /// table's `insert`.
    pub fn stage_write(
        &self,
        db_oid: DbOid,
        table_oid: TableOid,
        initializer: &ProjectedRowInitializer,
    ) -> RedoRecord {
        RedoRecord::new(db_oid, table_oid, initializer.initialize_row())
    }

    pub(crate) fn add_write_entry(&mut self, entry: WriteEntry) {
        self.write_entries.push(entry);
    }

    /// Whether effects of `writer` belong to this transaction's snapshot.
    pub fn sees_writes_of(&self, writer: TxnId) -> bool {
        if writer == self.id {
            return true;
        }
        matches!(self.manager.commit_ts(writer), Some(ts) if ts < self.id)
    }

    pub fn commit(mut self) -> TxnId {
        self.finished = true;
        let commit_ts = self.manager.commit_txn(self.id, self.slot_idx);
        tracing::debug!(
            txn = self.id,
            commit_ts,
            writes = self.write_entries.len(),
            "committed transaction"
        );
        commit_ts
    }

    pub fn abort(mut self) {
        self.finished = true;
        self.manager.abort_txn(self.id, self.slot_idx);
        tracing::debug!(
            txn = self.id,
            writes = self.write_entries.len(),
            "aborted transaction"
        );
    }
}

impl<'a> Drop for Transaction<'a> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                txn = self.id,
                writes = self.write_entries.len(),
                "transaction dropped while active, aborting"
            );
            self.manager.abort_txn(self.id, self.slot_idx);
        }
    }
}
