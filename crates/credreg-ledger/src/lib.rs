//! # credreg-ledger: Hosting Ledger for Credential Registry Instances
//!
//! The platform side of a registry instance: it authenticates nothing but
//! does everything else the evaluator assumes. It allocates instance ids,
//! keeps opt-in bookkeeping, runs the evaluator, commits accepted mutation
//! sets and confirms each accepted transaction in its own round.
//!
//! ## Surfaces
//!
//! - [`Ledger`]: single-owner ledger, the unit of persistence.
//! - [`SharedLedger`]: `Arc<Mutex<Ledger>>` handle for concurrent submitters.
//! - [`FileLedger`]: a [`Ledger`] bound to a JSON snapshot on disk.
//! - [`TransactionSource`]: the polling surface confirmation waits on.

pub mod confirm;
pub mod delta;
pub mod error;
pub mod ledger;
pub mod persist;
pub mod shared;
pub mod store;
pub mod transaction;

pub use confirm::TransactionSource;
pub use delta::{global_delta, local_delta, StateDelta, StateValue, ValueDelta};
pub use error::LedgerError;
pub use ledger::{Ledger, TxRecord};
pub use persist::FileLedger;
pub use shared::SharedLedger;
pub use store::{InstanceState, MemoryStore, Programs};
pub use transaction::Transaction;
