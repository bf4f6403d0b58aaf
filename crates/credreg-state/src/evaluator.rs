//! # Authorization Evaluator
//!
//! A pure function of `(context, current state)` producing a [`Decision`].
//!
//! ## Dispatch (first match wins)
//!
//! ```text
//! instance unset ─────────────▶ Init        accept, registrar := caller
//! on_completion = Delete ─────▶ Delete      accept iff caller == registrar
//! on_completion = Update ─────▶ Update      accept iff caller == registrar
//! on_completion = OptIn ──────▶ OptIn       accept
//! on_completion = CloseOut ───▶ CloseOut    accept, remove caller's record
//! on_completion = ClearState ─▶ ClearState  accept, remove caller's record
//! on_completion = NoOp ───────▶ arguments[0]
//!     issue_diploma       registrar, 3 args, 1 account ─▶ write credential
//!     revoke_diploma      registrar, 1 arg,  1 account ─▶ empty record
//!     reassign_registrar  registrar, 1 arg,  1 account ─▶ registrar := account 1
//!     anything else ─────────────────────────────────────▶ UnknownOperation
//! ```
//!
//! Inside an application call the checks run in a fixed order: caller,
//! argument count, account count, argument decoding. The first failure
//! rejects.

use credreg_core::{decode_uint, InstanceId};

use crate::clear::clear_state_mutations;
use crate::context::{ExecutionContext, LifecycleEvent};
use crate::decision::{Decision, Mutation, RejectReason};
use crate::operation::Operation;
use crate::store::StateStore;

/// Evaluate one request against the current state.
pub fn evaluate<S: StateStore + ?Sized>(ctx: &ExecutionContext, store: &S) -> Decision {
    dispatch(ctx, store).into()
}

fn dispatch<S: StateStore + ?Sized>(
    ctx: &ExecutionContext,
    store: &S,
) -> Result<Vec<Mutation>, RejectReason> {
    // `lifecycle_event` reports Init exactly when no instance is assigned.
    match (ctx.lifecycle_event(), ctx.instance) {
        (LifecycleEvent::Init, _) | (_, None) => {
            Ok(vec![Mutation::SetRegistrar(ctx.caller.clone())])
        }
        (LifecycleEvent::Delete | LifecycleEvent::Update, Some(instance)) => {
            require_registrar(ctx, instance, store)?;
            Ok(Vec::new())
        }
        (LifecycleEvent::OptIn, Some(_)) => Ok(Vec::new()),
        (LifecycleEvent::CloseOut, Some(_)) => Ok(vec![Mutation::RemoveLocal {
            account: ctx.caller.clone(),
        }]),
        (LifecycleEvent::ClearState, Some(_)) => Ok(clear_state_mutations(ctx)),
        (LifecycleEvent::NoOp, Some(instance)) => application_call(ctx, instance, store),
    }
}

fn application_call<S: StateStore + ?Sized>(
    ctx: &ExecutionContext,
    instance: InstanceId,
    store: &S,
) -> Result<Vec<Mutation>, RejectReason> {
    let selector = ctx.selector().ok_or(RejectReason::MissingSelector)?;
    let operation = Operation::from_selector(selector.as_slice())
        .ok_or_else(|| RejectReason::UnknownOperation(selector.to_string()))?;

    require_registrar(ctx, instance, store)?;
    require_shape(ctx, operation)?;

    // Shape check guarantees exactly one referenced account.
    let target = ctx
        .account(1)
        .cloned()
        .ok_or(RejectReason::BadAccountCount {
            operation,
            expected: 1,
            actual: 0,
        })?;

    let mutation = match operation {
        Operation::IssueDiploma => {
            let (diploma, duration) = match (ctx.argument(1), ctx.argument(2)) {
                (Some(d), Some(n)) => (d.clone(), n),
                _ => {
                    return Err(RejectReason::BadArgumentCount {
                        operation,
                        expected: operation.expected_arguments(),
                        actual: ctx.arguments.len(),
                    })
                }
            };
            let degree_duration = decode_uint(duration.as_slice()).map_err(|source| {
                RejectReason::BadArgumentEncoding {
                    operation,
                    index: 2,
                    source,
                }
            })?;
            Mutation::WriteCredential {
                account: target,
                diploma,
                degree_duration,
            }
        }
        Operation::RevokeDiploma => Mutation::RevokeCredential { account: target },
        Operation::ReassignRegistrar => Mutation::SetRegistrar(target),
    };
    Ok(vec![mutation])
}

fn require_registrar<S: StateStore + ?Sized>(
    ctx: &ExecutionContext,
    instance: InstanceId,
    store: &S,
) -> Result<(), RejectReason> {
    let global = store.read_global(instance)?;
    match global {
        Some(record) if record.registrar == ctx.caller => Ok(()),
        _ => Err(RejectReason::NotAuthorized {
            caller: ctx.caller.clone(),
        }),
    }
}

fn require_shape(ctx: &ExecutionContext, operation: Operation) -> Result<(), RejectReason> {
    let expected = operation.expected_arguments();
    if ctx.arguments.len() != expected {
        return Err(RejectReason::BadArgumentCount {
            operation,
            expected,
            actual: ctx.arguments.len(),
        });
    }
    let expected = operation.expected_accounts();
    if ctx.accounts.len() != expected {
        return Err(RejectReason::BadAccountCount {
            operation,
            expected,
            actual: ctx.accounts.len(),
        });
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::context::OnCompletion;
    use crate::decision::RejectClass;
    use crate::testing::MapStore;
    use credreg_core::{Address, ByteString};
    use proptest::prelude::*;

    fn outsider() -> impl Strategy<Value = Address> {
        "[A-Z]{1,12}"
            .prop_filter("not the registrar", |s| s != "REGISTRAR")
            .prop_map(|s| Address::new(s).unwrap())
    }

    proptest! {
        #[test]
        fn gated_operations_reject_every_outsider(
            caller in outsider(),
            op in prop::sample::select(Operation::ALL.to_vec()),
            extra_args in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..12), 0..4),
            accounts in prop::collection::vec(outsider(), 0..3),
        ) {
            let instance = InstanceId::new(1).unwrap();
            let store = MapStore::with_instance(instance, Address::new("REGISTRAR").unwrap());
            let mut ctx = ExecutionContext::new(caller, Some(instance), OnCompletion::NoOp)
                .with_arg(op.selector());
            ctx.arguments.extend(extra_args.into_iter().map(ByteString::new));
            ctx.accounts = accounts;

            let decision = evaluate(&ctx, &store);
            prop_assert_eq!(decision.reason().map(RejectReason::class), Some(RejectClass::Authorization));
            prop_assert!(decision.mutations().is_empty());
        }
    }
}
