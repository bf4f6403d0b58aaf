//! # Transactions
//!
//! What a submitter sends. One constructor per lifecycle path, so callers
//! never hand-assemble an `OnCompletion` with the wrong attachments.

use serde::{Deserialize, Serialize};

use credreg_core::{sha256_digest, Address, ByteString, CanonicalBytes, InstanceId, TxId};
use credreg_state::{ExecutionContext, OnCompletion};

use crate::error::LedgerError;

/// An application transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    /// `None` creates a new instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<InstanceId>,
    pub on_completion: OnCompletion,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub app_args: Vec<ByteString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_program: Option<ByteString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_program: Option<ByteString>,
}

impl Transaction {
    fn bare(sender: Address, application: Option<InstanceId>, on_completion: OnCompletion) -> Self {
        Self {
            sender,
            application,
            on_completion,
            app_args: Vec::new(),
            accounts: Vec::new(),
            approval_program: None,
            clear_program: None,
        }
    }

    /// Deploy a new instance.
    pub fn create(sender: Address, approval: impl Into<ByteString>, clear: impl Into<ByteString>) -> Self {
        Self {
            approval_program: Some(approval.into()),
            clear_program: Some(clear.into()),
            ..Self::bare(sender, None, OnCompletion::NoOp)
        }
    }

    pub fn update(
        sender: Address,
        app: InstanceId,
        approval: impl Into<ByteString>,
        clear: impl Into<ByteString>,
    ) -> Self {
        Self {
            approval_program: Some(approval.into()),
            clear_program: Some(clear.into()),
            ..Self::bare(sender, Some(app), OnCompletion::Update)
        }
    }

    pub fn delete(sender: Address, app: InstanceId) -> Self {
        Self::bare(sender, Some(app), OnCompletion::Delete)
    }

    pub fn opt_in(sender: Address, app: InstanceId) -> Self {
        Self::bare(sender, Some(app), OnCompletion::OptIn)
    }

    pub fn close_out(sender: Address, app: InstanceId) -> Self {
        Self::bare(sender, Some(app), OnCompletion::CloseOut)
    }

    pub fn clear_state(sender: Address, app: InstanceId) -> Self {
        Self::bare(sender, Some(app), OnCompletion::ClearState)
    }

    /// Application (NoOp) call.
    pub fn call(sender: Address, app: InstanceId, args: Vec<ByteString>, accounts: Vec<Address>) -> Self {
        Self {
            app_args: args,
            accounts,
            ..Self::bare(sender, Some(app), OnCompletion::NoOp)
        }
    }

    /// The evaluator's view of this transaction.
    pub fn context(&self) -> ExecutionContext {
        ExecutionContext {
            caller: self.sender.clone(),
            instance: self.application,
            on_completion: self.on_completion,
            arguments: self.app_args.clone(),
            accounts: self.accounts.clone(),
        }
    }

    /// Transaction id when confirmed in `round`.
    pub fn id_at(&self, round: u64) -> Result<TxId, LedgerError> {
        #[derive(Serialize)]
        struct Envelope<'a> {
            round: u64,
            txn: &'a Transaction,
        }
        let bytes = CanonicalBytes::new(&Envelope { round, txn: self })?;
        Ok(TxId::from(&sha256_digest(&bytes)))
    }

    pub(crate) fn programs(&self) -> Option<(&ByteString, &ByteString)> {
        self.approval_program.as_ref().zip(self.clear_program.as_ref())
    }

    pub(crate) fn carries_programs(&self) -> bool {
        self.approval_program.is_some() || self.clear_program.is_some()
    }
}
