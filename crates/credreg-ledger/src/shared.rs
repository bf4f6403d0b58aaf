//! # Shared Ledger Handle
//!
//! Cloneable handle that linearizes submissions from many threads. One
//! submission holds the lock for the whole evaluate-and-commit step, which is
//! what keeps per-instance requests serialized.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use credreg_core::TxId;

use crate::confirm::TransactionSource;
use crate::error::LedgerError;
use crate::ledger::{Ledger, TxRecord};
use crate::transaction::Transaction;

/// How long `status_after_round` waits for a new round.
pub const ROUND_WAIT: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct Inner {
    ledger: Mutex<Ledger>,
    advanced: Condvar,
}

#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Inner>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Inner {
                ledger: Mutex::new(ledger),
                advanced: Condvar::new(),
            }),
        }
    }

    pub fn submit(&self, txn: &Transaction) -> Result<TxId, LedgerError> {
        let txid = self.inner.ledger.lock().submit(txn)?;
        self.inner.advanced.notify_all();
        Ok(txid)
    }

    /// Run `f` against a consistent view of the ledger.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&*self.inner.ledger.lock())
    }

    /// Copy of the current ledger, e.g. for persisting.
    pub fn snapshot(&self) -> Ledger {
        self.read(Ledger::clone)
    }
}

impl TransactionSource for SharedLedger {
    fn status(&self) -> u64 {
        self.read(Ledger::status)
    }

    fn pending_transaction_info(&self, txid: &TxId) -> Option<TxRecord> {
        self.read(|ledger| ledger.pending_transaction_info(txid).cloned())
    }

    fn status_after_round(&self, round: u64) -> u64 {
        let mut ledger = self.inner.ledger.lock();
        if ledger.status() <= round {
            let _ = self.inner.advanced.wait_for(&mut ledger, ROUND_WAIT);
        }
        ledger.status()
    }
}
