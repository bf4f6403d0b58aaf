//! # Clear-State Evaluator
//!
//! The exit path every account can always take. It is a separate evaluator
//! from [`crate::evaluator::evaluate`] and shares none of its checks: it never
//! reads the registrar, never looks at arguments or referenced accounts, and
//! never rejects.

use crate::context::ExecutionContext;
use crate::decision::{Decision, Mutation};

/// Accept, removing the caller's local record.
pub fn evaluate_clear_state(ctx: &ExecutionContext) -> Decision {
    Decision::Accept(clear_state_mutations(ctx))
}

pub(crate) fn clear_state_mutations(ctx: &ExecutionContext) -> Vec<Mutation> {
    vec![Mutation::RemoveLocal {
        account: ctx.caller.clone(),
    }]
}
