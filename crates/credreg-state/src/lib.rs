//! # credreg-state: Credential Registry Authorization State Machine
//!
//! Decides, for every request against a credential registry instance,
//! whether it is allowed and which state it changes.
//!
//! ## Components
//!
//! - **Evaluator** (`evaluator.rs`): ordered dispatch on lifecycle event,
//!   then on the operation selector. Registrar-gated paths are Delete,
//!   Update, `issue_diploma`, `revoke_diploma` and `reassign_registrar`.
//!
//! - **Clear-state evaluator** (`clear.rs`): always accepts and removes the
//!   caller's local record. Independent of the registrar and of arguments.
//!
//! - **State store contract** (`store.rs`): the five store calls the
//!   evaluator consumes, plus all-or-nothing application of a mutation set.
//!
//! ## Design
//!
//! Evaluation is a pure, synchronous function of the context and a read-only
//! view of the store. It holds nothing between calls and performs no locking;
//! the host serializes requests against an instance.
//!
//! Exactly one contract revision is implemented: `issue_diploma` takes three
//! arguments (selector, metadata, degree duration). A two-argument issuance is
//! a malformed request, not an older dialect.

pub mod clear;
pub mod context;
pub mod decision;
pub mod evaluator;
pub mod operation;
pub mod store;

#[cfg(test)]
mod testing;

pub use clear::evaluate_clear_state;
pub use context::{ExecutionContext, LifecycleEvent, OnCompletion};
pub use decision::{Decision, Mutation, RejectClass, RejectReason};
pub use evaluator::evaluate;
pub use operation::Operation;
pub use store::{apply, GlobalRecord, LocalRecord, StateStore, StoreError};
