//! Ledger errors.

use std::path::PathBuf;

use thiserror::Error;

use credreg_core::{Address, CanonicalizationError, InstanceId, TxId};
use credreg_state::{RejectClass, RejectReason, StoreError};

#[derive(Error, Debug)]
pub enum LedgerError {
    /// The evaluator, or mutation application, rejected the request.
    #[error("transaction {txid} rejected by approval logic: {reason}")]
    Rejected { txid: TxId, reason: RejectReason },

    /// Platform-level state check failed before evaluation.
    #[error(transparent)]
    State(#[from] StoreError),

    #[error("account {account} has already opted in to instance {instance}")]
    AlreadyOptedIn {
        instance: InstanceId,
        account: Address,
    },

    /// Create and update transactions must carry both programs.
    #[error("{0} transaction is missing its approval or clear program")]
    MissingProgram(&'static str),

    /// Structurally invalid transaction.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(&'static str),

    #[error("instance identifiers exhausted")]
    InstanceIdsExhausted,

    #[error("transaction {txid} not confirmed within {rounds} rounds")]
    ConfirmationTimeout { txid: TxId, rounds: u64 },

    #[error("cannot derive transaction id: {0}")]
    TxIdDerivation(#[from] CanonicalizationError),

    #[error("ledger snapshot {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger snapshot {} is in use by another process", .path.display())]
    Locked { path: PathBuf },

    #[error("ledger snapshot {} is malformed: {source}", .path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LedgerError {
    /// Rejection class, for errors that reject a single request.
    pub fn class(&self) -> Option<RejectClass> {
        match self {
            Self::Rejected { reason, .. } => Some(reason.class()),
            Self::State(_) | Self::AlreadyOptedIn { .. } => Some(RejectClass::StateConsistency),
            Self::MissingProgram(_) | Self::InvalidTransaction(_) => {
                Some(RejectClass::MalformedRequest)
            }
            _ => None,
        }
    }
}
