//! # Decisions
//!
//! The evaluator's only output. `Accept` carries the complete mutation set
//! for the request; `Reject` carries a reason and implies zero mutations.

use std::fmt;

use thiserror::Error;

use credreg_core::{Address, ByteString, CodecError};

use crate::operation::Operation;
use crate::store::StoreError;

/// A single state change the store must apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Replace the instance's registrar.
    SetRegistrar(Address),
    /// Overwrite the credential fields of `account`'s local record.
    WriteCredential {
        account: Address,
        diploma: ByteString,
        degree_duration: u64,
    },
    /// Delete both credential fields; the record stays, empty.
    RevokeCredential { account: Address },
    /// Remove `account`'s local record altogether.
    RemoveLocal { account: Address },
}

impl Mutation {
    /// The account whose local record this touches, if any.
    pub fn target_account(&self) -> Option<&Address> {
        match self {
            Self::SetRegistrar(_) => None,
            Self::WriteCredential { account, .. }
            | Self::RevokeCredential { account }
            | Self::RemoveLocal { account } => Some(account),
        }
    }
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept(Vec<Mutation>),
    Reject(RejectReason),
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept(_))
    }

    /// Mutations of an accepted request; empty for a rejection.
    pub fn mutations(&self) -> &[Mutation] {
        match self {
            Self::Accept(mutations) => mutations,
            Self::Reject(_) => &[],
        }
    }

    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            Self::Accept(_) => None,
            Self::Reject(reason) => Some(reason),
        }
    }
}

impl From<Result<Vec<Mutation>, RejectReason>> for Decision {
    fn from(result: Result<Vec<Mutation>, RejectReason>) -> Self {
        match result {
            Ok(mutations) => Self::Accept(mutations),
            Err(reason) => Self::Reject(reason),
        }
    }
}

/// Why a request was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// A registrar-gated path was invoked by someone else.
    #[error("caller {caller} is not the registrar")]
    NotAuthorized { caller: Address },

    #[error("{operation} takes {expected} arguments, got {actual}")]
    BadArgumentCount {
        operation: Operation,
        expected: usize,
        actual: usize,
    },

    #[error("{operation} takes {expected} referenced account(s), got {actual}")]
    BadAccountCount {
        operation: Operation,
        expected: usize,
        actual: usize,
    },

    #[error("unknown operation {0:?}")]
    UnknownOperation(String),

    /// An application call with no arguments at all.
    #[error("application call carries no operation selector")]
    MissingSelector,

    #[error("argument {index} of {operation}: {source}")]
    BadArgumentEncoding {
        operation: Operation,
        index: usize,
        #[source]
        source: CodecError,
    },

    #[error(transparent)]
    StateConsistency(#[from] StoreError),
}

/// Rejection taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectClass {
    /// `AuthorizationError`: caller is not the current registrar.
    Authorization,
    /// `MalformedRequest`: wrong argument or account shape.
    MalformedRequest,
    /// `UnknownOperation`: selector not recognized.
    UnknownOperation,
    /// `StateConsistencyError`: target has no local record, or the instance is gone.
    StateConsistency,
}

impl RejectReason {
    pub fn class(&self) -> RejectClass {
        match self {
            Self::NotAuthorized { .. } => RejectClass::Authorization,
            Self::BadArgumentCount { .. }
            | Self::BadAccountCount { .. }
            | Self::MissingSelector
            | Self::BadArgumentEncoding { .. } => RejectClass::MalformedRequest,
            Self::UnknownOperation(_) => RejectClass::UnknownOperation,
            Self::StateConsistency(_) => RejectClass::StateConsistency,
        }
    }
}

impl fmt::Display for RejectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Authorization => "AuthorizationError",
            Self::MalformedRequest => "MalformedRequest",
            Self::UnknownOperation => "UnknownOperation",
            Self::StateConsistency => "StateConsistencyError",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    #[test]
    fn classes() {
        let cases = [
            (
                RejectReason::NotAuthorized { caller: addr("X") },
                RejectClass::Authorization,
            ),
            (
                RejectReason::BadArgumentCount {
                    operation: Operation::IssueDiploma,
                    expected: 3,
                    actual: 1,
                },
                RejectClass::MalformedRequest,
            ),
            (
                RejectReason::BadAccountCount {
                    operation: Operation::RevokeDiploma,
                    expected: 1,
                    actual: 0,
                },
                RejectClass::MalformedRequest,
            ),
            (RejectReason::MissingSelector, RejectClass::MalformedRequest),
            (
                RejectReason::UnknownOperation("mint".into()),
                RejectClass::UnknownOperation,
            ),
        ];
        for (reason, class) in cases {
            assert_eq!(reason.class(), class, "{reason}");
        }
    }

    #[test]
    fn reject_has_no_mutations() {
        let d = Decision::Reject(RejectReason::MissingSelector);
        assert!(!d.is_accept());
        assert!(d.mutations().is_empty());
        assert_eq!(d.reason(), Some(&RejectReason::MissingSelector));
    }

    #[test]
    fn messages_name_the_operation() {
        let reason = RejectReason::BadArgumentCount {
            operation: Operation::IssueDiploma,
            expected: 3,
            actual: 2,
        };
        assert_eq!(reason.to_string(), "issue_diploma takes 3 arguments, got 2");
        assert_eq!(reason.class().to_string(), "MalformedRequest");
    }

    #[test]
    fn target_account() {
        assert!(Mutation::SetRegistrar(addr("R")).target_account().is_none());
        let m = Mutation::RevokeCredential { account: addr("S") };
        assert_eq!(m.target_account().unwrap().as_str(), "S");
    }
}
