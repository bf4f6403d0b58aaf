//! Application-level operations carried inside NoOp calls.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An operation selected by `arguments[0]` of an application call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `issue_diploma <metadata> <degree_duration>` to account 1.
    IssueDiploma,
    /// `revoke_diploma` from account 1.
    RevokeDiploma,
    /// `reassign_registrar` to account 1.
    ReassignRegistrar,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Self::IssueDiploma,
        Self::RevokeDiploma,
        Self::ReassignRegistrar,
    ];

    /// The selector bytes, as text.
    pub fn selector(&self) -> &'static str {
        match self {
            Self::IssueDiploma => "issue_diploma",
            Self::RevokeDiploma => "revoke_diploma",
            Self::ReassignRegistrar => "reassign_registrar",
        }
    }

    /// Exact byte match against the known selectors.
    pub fn from_selector(bytes: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.selector().as_bytes() == bytes)
    }

    /// Required argument count, selector included.
    pub fn expected_arguments(&self) -> usize {
        match self {
            Self::IssueDiploma => 3,
            Self::RevokeDiploma | Self::ReassignRegistrar => 1,
        }
    }

    /// Required count of explicitly referenced accounts.
    pub fn expected_accounts(&self) -> usize {
        1
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}
