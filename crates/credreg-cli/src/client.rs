//! # Ledger Client
//!
//! One [`Session`] per command invocation: open the ledger snapshot, submit,
//! wait for confirmation, report, and persist.

use anyhow::{bail, Context, Result};
use clap::Args;

use credreg_core::{Address, InstanceId, TxId};
use credreg_ledger::{FileLedger, Ledger, LedgerError, Transaction, TransactionSource, TxRecord};
use credreg_state::RejectClass;

use crate::artifacts::Artifacts;
use crate::config::OrchestratorConfig;

/// Instance selection shared by every instance-scoped command.
#[derive(Args, Debug, Clone, Default)]
pub struct InstanceArgs {
    /// Instance id. Defaults to the one recorded by `deploy`.
    #[arg(long)]
    pub app_id: Option<u64>,
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Confirmed(TxRecord),
    Rejected(RejectClass),
}

impl Outcome {
    /// Process exit code.
    pub fn code(&self) -> u8 {
        match self {
            Self::Confirmed(_) => 0,
            Self::Rejected(_) => 1,
        }
    }
}

/// Poll `source` until `txid` is confirmed, for at most `max_rounds` rounds.
pub fn wait_for_confirmation<S: TransactionSource + ?Sized>(
    source: &S,
    txid: &TxId,
    max_rounds: u64,
) -> Result<TxRecord, LedgerError> {
    let start = source.status();
    let deadline = start.saturating_add(max_rounds);
    let mut current = start;
    loop {
        if let Some(record) = source.pending_transaction_info(txid) {
            return Ok(record);
        }
        if current >= deadline {
            return Err(LedgerError::ConfirmationTimeout {
                txid: txid.clone(),
                rounds: max_rounds,
            });
        }
        tracing::trace!(txid = %txid, round = current, "waiting for confirmation");
        // A wait that saw no new round still spends one round of budget.
        current = source.status_after_round(current).max(current + 1);
    }
}

pub struct Session {
    config: OrchestratorConfig,
    ledger: FileLedger,
}

impl Session {
    pub fn open(config: &OrchestratorConfig) -> Result<Self> {
        let ledger = FileLedger::open(&config.ledger_path)
            .with_context(|| format!("failed to open ledger: {}", config.ledger_path.display()))?;
        Ok(Self {
            config: config.clone(),
            ledger,
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        self.ledger.ledger()
    }

    pub fn account(&self, name: &str) -> Result<Address> {
        self.config.resolve_account(name)
    }

    /// `--app-id` if given, else the deployed instance.
    pub fn app_id(&self, target: &InstanceArgs) -> Result<InstanceId> {
        if let Some(raw) = target.app_id {
            return InstanceId::new(raw).context("--app-id must be non-zero");
        }
        match Artifacts::load(&self.config.artifacts_path)? {
            Some(artifacts) => Ok(artifacts.app_id),
            None => bail!(
                "no deployed instance recorded in {}; run `credreg deploy` or pass --app-id",
                self.config.artifacts_path.display()
            ),
        }
    }

    /// Submit, confirm, persist and report. Rejections are reported and
    /// returned as [`Outcome::Rejected`]; other failures are errors.
    pub fn send(&mut self, txn: &Transaction) -> Result<Outcome> {
        let txid = match self.ledger.ledger_mut().submit(txn) {
            Ok(txid) => txid,
            Err(e) => match e.class() {
                Some(class) => {
                    println!("rejected ({class}): {e}");
                    return Ok(Outcome::Rejected(class));
                }
                None => return Err(e).context("failed to submit transaction"),
            },
        };
        let record = wait_for_confirmation(
            self.ledger.ledger(),
            &txid,
            self.config.confirmation_rounds,
        )?;
        self.ledger.commit()?;
        report(&record);
        Ok(Outcome::Confirmed(record))
    }
}

fn report(record: &TxRecord) {
    println!(
        "transaction {} confirmed in round {}",
        record.txid, record.confirmed_round
    );
    for (key, delta) in &record.global_delta {
        println!("  global {key} {delta}");
    }
    for (account, delta) in &record.local_deltas {
        for (key, change) in delta {
            println!("  local {account} {key} {change}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// A source that never confirms anything but advances `step` rounds
    /// per wait.
    struct Stalled {
        round: Cell<u64>,
        polls: Cell<u64>,
        step: u64,
    }

    impl Stalled {
        fn new(round: u64, step: u64) -> Self {
            Self {
                round: Cell::new(round),
                polls: Cell::new(0),
                step,
            }
        }
    }

    impl TransactionSource for Stalled {
        fn status(&self) -> u64 {
            self.round.get()
        }

        fn pending_transaction_info(&self, _txid: &TxId) -> Option<TxRecord> {
            None
        }

        fn status_after_round(&self, round: u64) -> u64 {
            self.polls.set(self.polls.get() + 1);
            self.round.set(round + self.step);
            round + self.step
        }
    }

    fn txid() -> TxId {
        Transaction::opt_in(Address::new("S").unwrap(), InstanceId::new(1).unwrap())
            .id_at(1)
            .unwrap()
    }

    #[test]
    fn times_out_after_round_budget() {
        let source = Stalled::new(5, 1);
        let err = wait_for_confirmation(&source, &txid(), 3).unwrap_err();
        assert!(matches!(err, LedgerError::ConfirmationTimeout { rounds: 3, .. }));
        assert_eq!(source.polls.get(), 3);
    }

    #[test]
    fn budget_counts_rounds_not_polls() {
        let source = Stalled::new(0, 5);
        assert!(wait_for_confirmation(&source, &txid(), 10).is_err());
        assert_eq!(source.polls.get(), 2);
        assert_eq!(source.status(), 10);
    }

    #[test]
    fn idle_source_spends_one_round_per_wait() {
        let source = Stalled::new(3, 0);
        assert!(wait_for_confirmation(&source, &txid(), 4).is_err());
        assert_eq!(source.polls.get(), 4);
    }

    #[test]
    fn confirmed_transaction_returns_immediately() {
        let mut ledger = Ledger::new();
        let txid = ledger
            .submit(&Transaction::create(
                Address::new("REG").unwrap(),
                "approval",
                "clear",
            ))
            .unwrap();
        let record = wait_for_confirmation(&ledger, &txid, 1).unwrap();
        assert_eq!(record.confirmed_round, 1);
    }

    #[test]
    fn unknown_transaction_times_out_on_idle_ledger() {
        let ledger = Ledger::new();
        let err = wait_for_confirmation(&ledger, &txid(), 2).unwrap_err();
        assert!(matches!(err, LedgerError::ConfirmationTimeout { .. }));
    }

    #[test]
    fn app_id_override_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let config = OrchestratorConfig {
            ledger_path: dir.path().join("ledger.json"),
            artifacts_path: dir.path().join("artifacts.json"),
            ..OrchestratorConfig::default()
        };
        let session = Session::open(&config).unwrap();
        assert!(session.app_id(&InstanceArgs::default()).is_err());
        assert!(session.app_id(&InstanceArgs { app_id: Some(0) }).is_err());

        Artifacts {
            app_id: InstanceId::new(4).unwrap(),
        }
        .save(&config.artifacts_path)
        .unwrap();
        assert_eq!(session.app_id(&InstanceArgs::default()).unwrap().get(), 4);
        assert_eq!(
            session.app_id(&InstanceArgs { app_id: Some(9) }).unwrap().get(),
            9
        );
    }

    #[test]
    fn rejected_submission_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let config = OrchestratorConfig {
            ledger_path: dir.path().join("ledger.json"),
            ..OrchestratorConfig::default()
        };
        let mut session = Session::open(&config).unwrap();
        let outcome = session
            .send(&Transaction::opt_in(
                Address::new("S").unwrap(),
                InstanceId::new(1).unwrap(),
            ))
            .unwrap();
        assert_eq!(outcome, Outcome::Rejected(RejectClass::StateConsistency));
        assert_eq!(outcome.code(), 1);
        assert!(!config.ledger_path.exists());
    }
}
