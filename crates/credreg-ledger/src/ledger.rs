//! # Hosting Ledger
//!
//! Accepts transactions one at a time, runs the platform checks, hands the
//! request to the evaluator and commits accepted effects in a new round.
//!
//! ## Submission pipeline
//!
//! 1. Platform checks: instance existence, opt-in status, program
//!    attachments. These fail before the evaluator runs.
//! 2. Evaluation: ClearState goes to the clear-state evaluator, everything
//!    else to the approval evaluator.
//! 3. Commit: lifecycle effects and the mutation set are applied to a staged
//!    copy of the store. The copy replaces the live store only if every
//!    step succeeds, so a rejection never leaves partial state behind.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use credreg_core::{Address, InstanceId, Timestamp, TxId};
use credreg_state::{
    apply, evaluate, evaluate_clear_state, Decision, GlobalRecord, LocalRecord, OnCompletion,
    RejectReason, StateStore, StoreError,
};

use crate::delta::{global_delta, local_delta, StateDelta};
use crate::error::LedgerError;
use crate::store::{InstanceState, MemoryStore, Programs};
use crate::transaction::Transaction;

/// What a confirmed transaction did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    pub txid: TxId,
    pub sender: Address,
    pub on_completion: OnCompletion,
    /// Instance the transaction acted on. For a create, the new instance.
    pub application: InstanceId,
    /// Set only when the transaction created `application`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_index: Option<InstanceId>,
    pub confirmed_round: u64,
    pub confirmed_at: Timestamp,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub global_delta: StateDelta,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub local_deltas: BTreeMap<Address, StateDelta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    round: u64,
    next_instance: u64,
    #[serde(default)]
    instances: MemoryStore,
    #[serde(default)]
    transactions: BTreeMap<TxId, TxRecord>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            round: 0,
            next_instance: 1,
            instances: MemoryStore::new(),
            transactions: BTreeMap::new(),
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last confirmed round.
    pub fn status(&self) -> u64 {
        self.round
    }

    pub fn pending_transaction_info(&self, txid: &TxId) -> Option<&TxRecord> {
        self.transactions.get(txid)
    }

    pub fn global_state(&self, instance: InstanceId) -> Result<Option<GlobalRecord>, StoreError> {
        self.instances.read_global(instance)
    }

    pub fn local_state(
        &self,
        instance: InstanceId,
        account: &Address,
    ) -> Result<Option<LocalRecord>, StoreError> {
        self.instances.read_local(instance, account)
    }

    /// Creator, global record and program digests of an instance.
    pub fn instance(&self, instance: InstanceId) -> Option<&InstanceState> {
        self.instances.instance(instance)
    }

    pub fn store(&self) -> &MemoryStore {
        &self.instances
    }

    /// Submit a transaction. On success it is confirmed in the returned
    /// transaction's round, which is always `status()` afterwards.
    pub fn submit(&mut self, txn: &Transaction) -> Result<TxId, LedgerError> {
        let round = self.round + 1;
        let txid = txn.id_at(round)?;
        tracing::debug!(
            txid = %txid,
            sender = %txn.sender,
            on_completion = %txn.on_completion,
            "submitting transaction"
        );

        match self.execute(txn, &txid, round) {
            Ok(record) => {
                tracing::info!(
                    txid = %txid,
                    round,
                    application = %record.application,
                    "transaction confirmed"
                );
                self.round = round;
                self.transactions.insert(txid.clone(), record);
                Ok(txid)
            }
            Err(e) => {
                tracing::warn!(txid = %txid, error = %e, "transaction rejected");
                Err(e)
            }
        }
    }

    fn execute(
        &mut self,
        txn: &Transaction,
        txid: &TxId,
        round: u64,
    ) -> Result<TxRecord, LedgerError> {
        self.precheck(txn)?;

        let ctx = txn.context();
        let decision = match txn.on_completion {
            OnCompletion::ClearState => evaluate_clear_state(&ctx),
            _ => evaluate(&ctx, &self.instances),
        };
        let mutations = match decision {
            Decision::Accept(mutations) => mutations,
            Decision::Reject(reason) => {
                return Err(LedgerError::Rejected {
                    txid: txid.clone(),
                    reason,
                })
            }
        };

        let mut staged = self.instances.clone();
        let (application, created) = match txn.application {
            Some(app) => (app, false),
            None => (self.allocate_instance()?, true),
        };
        let rejected = |e: StoreError| LedgerError::Rejected {
            txid: txid.clone(),
            reason: RejectReason::from(e),
        };

        if created {
            let (approval, clear) = txn
                .programs()
                .ok_or(LedgerError::MissingProgram("create"))?;
            staged.create_instance(
                application,
                txn.sender.clone(),
                Programs::digest(approval.as_slice(), clear.as_slice()),
            );
        }
        match txn.on_completion {
            OnCompletion::OptIn => {
                staged
                    .insert_local(application, txn.sender.clone())
                    .map_err(rejected)?;
            }
            OnCompletion::Update => {
                let (approval, clear) = txn
                    .programs()
                    .ok_or(LedgerError::MissingProgram("update"))?;
                staged
                    .set_programs(
                        application,
                        Programs::digest(approval.as_slice(), clear.as_slice()),
                    )
                    .map_err(rejected)?;
            }
            _ => {}
        }
        apply(&mut staged, application, &mutations).map_err(rejected)?;
        if txn.on_completion == OnCompletion::Delete {
            staged.remove_instance(application);
        }

        let record = TxRecord {
            txid: txid.clone(),
            sender: txn.sender.clone(),
            on_completion: txn.on_completion,
            application,
            application_index: created.then_some(application),
            confirmed_round: round,
            confirmed_at: Timestamp::now(),
            global_delta: global_delta(
                global_of(&self.instances, application),
                global_of(&staged, application),
            ),
            local_deltas: self.local_deltas(&staged, application, txn),
        };

        if created {
            self.next_instance = application.get() + 1;
        }
        self.instances = staged;
        Ok(record)
    }

    fn precheck(&self, txn: &Transaction) -> Result<(), LedgerError> {
        let Some(app) = txn.application else {
            if txn.on_completion != OnCompletion::NoOp {
                return Err(LedgerError::InvalidTransaction(
                    "instance creation must use no_op",
                ));
            }
            if txn.programs().is_none() {
                return Err(LedgerError::MissingProgram("create"));
            }
            return Ok(());
        };

        let opted_in = self.instances.is_opted_in(app, &txn.sender)?;
        match txn.on_completion {
            OnCompletion::Update => {
                if txn.programs().is_none() {
                    return Err(LedgerError::MissingProgram("update"));
                }
            }
            _ if txn.carries_programs() => {
                return Err(LedgerError::InvalidTransaction(
                    "programs may only accompany create or update",
                ));
            }
            OnCompletion::OptIn if opted_in => {
                return Err(LedgerError::AlreadyOptedIn {
                    instance: app,
                    account: txn.sender.clone(),
                });
            }
            OnCompletion::CloseOut | OnCompletion::ClearState if !opted_in => {
                return Err(StoreError::NotOptedIn {
                    instance: app,
                    account: txn.sender.clone(),
                }
                .into());
            }
            _ => {}
        }
        Ok(())
    }

    fn allocate_instance(&self) -> Result<InstanceId, LedgerError> {
        let id = InstanceId::new(self.next_instance).ok_or(LedgerError::InstanceIdsExhausted)?;
        id.next().ok_or(LedgerError::InstanceIdsExhausted)?;
        Ok(id)
    }

    fn local_deltas(
        &self,
        staged: &MemoryStore,
        application: InstanceId,
        txn: &Transaction,
    ) -> BTreeMap<Address, StateDelta> {
        let touched: BTreeSet<&Address> = std::iter::once(&txn.sender)
            .chain(txn.accounts.iter())
            .collect();
        touched
            .into_iter()
            .filter_map(|account| {
                let delta = local_delta(
                    local_of(&self.instances, application, account),
                    local_of(staged, application, account),
                );
                (!delta.is_empty()).then(|| (account.clone(), delta))
            })
            .collect()
    }
}

fn global_of(store: &MemoryStore, instance: InstanceId) -> Option<&GlobalRecord> {
    store.instance(instance).and_then(|s| s.global.as_ref())
}

fn local_of<'a>(
    store: &'a MemoryStore,
    instance: InstanceId,
    account: &Address,
) -> Option<&'a LocalRecord> {
    store.instance(instance).and_then(|s| s.locals.get(account))
}
