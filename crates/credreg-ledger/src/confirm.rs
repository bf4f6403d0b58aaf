//! Read side used by confirmation polling.

use credreg_core::TxId;

use crate::ledger::{Ledger, TxRecord};

/// Something a submitter can poll for confirmation.
pub trait TransactionSource {
    /// Last confirmed round.
    fn status(&self) -> u64;

    fn pending_transaction_info(&self, txid: &TxId) -> Option<TxRecord>;

    /// Block until a round after `round` is confirmed or the source gives up
    /// waiting, and return the last confirmed round. A return value equal to
    /// `round` means no progress was made.
    fn status_after_round(&self, round: u64) -> u64;
}

impl TransactionSource for Ledger {
    fn status(&self) -> u64 {
        Ledger::status(self)
    }

    fn pending_transaction_info(&self, txid: &TxId) -> Option<TxRecord> {
        Ledger::pending_transaction_info(self, txid).cloned()
    }

    // Nothing else can advance an exclusively borrowed ledger.
    fn status_after_round(&self, _round: u64) -> u64 {
        self.status()
    }
}
