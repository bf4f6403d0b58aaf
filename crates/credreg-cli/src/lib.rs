//! # credreg-cli: Credential Registry Orchestrator
//!
//! Provides the `credreg` command-line interface. Each subcommand submits
//! exactly one transaction (or none, for the read-only ones) against the
//! ledger snapshot named in the configuration.
//!
//! ## Subcommands
//!
//! - `credreg deploy | update | delete`: instance lifecycle.
//! - `credreg opt-in | close-out | clear`: local record bookkeeping.
//! - `credreg issue | revoke | reassign`: registrar operations.
//! - `credreg inspect | global`: read local and global state.
//!
//! ```bash
//! credreg deploy --sender registrar
//! credreg opt-in --account student
//! credreg issue --sender registrar --recipient student \
//!     --metadata Alice::BSc::2020 --duration 4
//! credreg inspect --account student
//! ```
//!
//! Exit code 0 means confirmed, 1 means rejected or failed.

pub mod artifacts;
pub mod client;
pub mod config;
pub mod diploma;
pub mod inspect;
pub mod lifecycle;
pub mod membership;
