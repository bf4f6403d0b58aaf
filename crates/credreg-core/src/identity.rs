//! # Identifier Newtypes
//!
//! Accounts, instances and transactions each get their own type so an
//! instance number can never be passed where an account is expected.
//!
//! - [`Address`]: an account identifier. Opaque to the evaluator; the
//!   submission layer has already authenticated whoever holds it.
//! - [`InstanceId`]: the platform-assigned identifier of a deployed
//!   registry. Never zero: "no instance yet" is `Option::<InstanceId>::None`.
//! - [`TxId`]: hex digest naming one submitted transaction.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::error::CoreError;

/// Longest accepted account identifier.
pub const MAX_ADDRESS_LEN: usize = 64;

/// An account identifier.
///
/// Accepted characters are ASCII alphanumerics, `-` and `_`; this keeps
/// addresses safe to use as JSON keys and in file names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Validate and wrap an account identifier.
    pub fn new(address: impl Into<String>) -> Result<Self, CoreError> {
        let address = address.into();
        let reason = if address.is_empty() {
            Some("must not be empty")
        } else if address.len() > MAX_ADDRESS_LEN {
            Some("longer than 64 characters")
        } else if !address
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            Some("only ASCII letters, digits, '-' and '_' are allowed")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CoreError::InvalidAddress { address, reason }),
            None => Ok(Self(address)),
        }
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform-assigned identifier of a deployed registry instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(NonZeroU64);

impl InstanceId {
    /// Wrap a raw identifier. Zero is the "unset" sentinel and yields `None`.
    pub fn new(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(Self)
    }

    /// The raw identifier.
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    /// The identifier that follows this one.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl FromStr for InstanceId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| CoreError::InvalidInstanceId(s.to_string()))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a submitted transaction: the hex digest of its canonical form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    /// The hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ContentDigest> for TxId {
    fn from(digest: &ContentDigest) -> Self {
        Self(digest.to_hex())
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
