//! # Execution Context
//!
//! The decoded request the evaluator runs against. The submission layer has
//! already authenticated `caller`; nothing here re-verifies it.
//!
//! ## Referenced accounts
//!
//! `accounts` holds only the explicitly supplied accounts. Index 0 is
//! reserved for the caller, so [`ExecutionContext::account`] maps `0` to
//! `caller` and `i` to `accounts[i - 1]`. "Exactly one referenced account"
//! means `accounts.len() == 1`, and that account is index 1.

use std::fmt;

use serde::{Deserialize, Serialize};

use credreg_core::{Address, ByteString, InstanceId};

/// The completion action a request asks the platform to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnCompletion {
    /// Plain application call (also used by the creating request).
    NoOp,
    /// Allocate a local record for the caller.
    OptIn,
    /// Remove the caller's local record through the main evaluator.
    CloseOut,
    /// Remove the caller's local record unconditionally.
    ClearState,
    /// Replace the instance's programs.
    Update,
    /// Destroy the instance.
    Delete,
}

impl fmt::Display for OnCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoOp => "noop",
            Self::OptIn => "opt_in",
            Self::CloseOut => "close_out",
            Self::ClearState => "clear_state",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Lifecycle event as the evaluator sees it.
///
/// Differs from [`OnCompletion`] only in `Init`, which is any request
/// made before the platform has assigned an instance identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Init,
    OptIn,
    CloseOut,
    ClearState,
    Update,
    Delete,
    NoOp,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "INIT",
            Self::OptIn => "OPT_IN",
            Self::CloseOut => "CLOSE_OUT",
            Self::ClearState => "CLEAR_STATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::NoOp => "NOOP",
        })
    }
}

/// One request, decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// The authenticated sender.
    pub caller: Address,
    /// `None` until the platform assigns an identifier.
    pub instance: Option<InstanceId>,
    pub on_completion: OnCompletion,
    /// Ordered application arguments; `arguments[0]` is the operation selector.
    pub arguments: Vec<ByteString>,
    /// Explicitly supplied accounts (index 1 onwards).
    pub accounts: Vec<Address>,
}

impl ExecutionContext {
    pub fn new(caller: Address, instance: Option<InstanceId>, on_completion: OnCompletion) -> Self {
        Self {
            caller,
            instance,
            on_completion,
            arguments: Vec::new(),
            accounts: Vec::new(),
        }
    }

    /// Append an application argument.
    pub fn with_arg(mut self, arg: impl Into<ByteString>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    /// Append a referenced account.
    pub fn with_account(mut self, account: Address) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn lifecycle_event(&self) -> LifecycleEvent {
        if self.instance.is_none() {
            return LifecycleEvent::Init;
        }
        match self.on_completion {
            OnCompletion::NoOp => LifecycleEvent::NoOp,
            OnCompletion::OptIn => LifecycleEvent::OptIn,
            OnCompletion::CloseOut => LifecycleEvent::CloseOut,
            OnCompletion::ClearState => LifecycleEvent::ClearState,
            OnCompletion::Update => LifecycleEvent::Update,
            OnCompletion::Delete => LifecycleEvent::Delete,
        }
    }

    /// The operation selector of an application call.
    pub fn selector(&self) -> Option<&ByteString> {
        self.arguments.first()
    }

    pub fn argument(&self, index: usize) -> Option<&ByteString> {
        self.arguments.get(index)
    }

    /// Resolve a referenced-account index (0 is the caller).
    pub fn account(&self, index: usize) -> Option<&Address> {
        match index {
            0 => Some(&self.caller),
            i => self.accounts.get(i - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    #[test]
    fn unset_instance_is_init_whatever_the_completion() {
        for oc in [
            OnCompletion::NoOp,
            OnCompletion::OptIn,
            OnCompletion::Delete,
            OnCompletion::ClearState,
        ] {
            let ctx = ExecutionContext::new(addr("A"), None, oc);
            assert_eq!(ctx.lifecycle_event(), LifecycleEvent::Init);
        }
    }

    #[test]
    fn completion_maps_to_event() {
        let id = InstanceId::new(1);
        let cases = [
            (OnCompletion::NoOp, LifecycleEvent::NoOp),
            (OnCompletion::OptIn, LifecycleEvent::OptIn),
            (OnCompletion::CloseOut, LifecycleEvent::CloseOut),
            (OnCompletion::ClearState, LifecycleEvent::ClearState),
            (OnCompletion::Update, LifecycleEvent::Update),
            (OnCompletion::Delete, LifecycleEvent::Delete),
        ];
        for (oc, event) in cases {
            assert_eq!(ExecutionContext::new(addr("A"), id, oc).lifecycle_event(), event);
        }
    }

    #[test]
    fn account_index_zero_is_caller() {
        let ctx = ExecutionContext::new(addr("REG"), InstanceId::new(1), OnCompletion::NoOp)
            .with_account(addr("STUDENT"));
        assert_eq!(ctx.account(0).unwrap().as_str(), "REG");
        assert_eq!(ctx.account(1).unwrap().as_str(), "STUDENT");
        assert!(ctx.account(2).is_none());
    }

    #[test]
    fn selector_is_first_argument() {
        let ctx = ExecutionContext::new(addr("REG"), InstanceId::new(1), OnCompletion::NoOp)
            .with_arg("revoke_diploma");
        assert_eq!(ctx.selector().unwrap().as_utf8(), Some("revoke_diploma"));
        assert!(ctx.argument(1).is_none());
    }

    #[test]
    fn on_completion_serde_names() {
        assert_eq!(
            serde_json::to_string(&OnCompletion::ClearState).unwrap(),
            r#""clear_state""#
        );
        assert_eq!(OnCompletion::OptIn.to_string(), "opt_in");
    }
}
