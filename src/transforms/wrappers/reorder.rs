// src/transforms/wrappers/reorder.rs
//! Reorder stage: permute the call's actuals into formal order.
//!
//! Mutates the call node in place; no wrapper is created. The CallInfo
//! mirror (actuals, actual names) is permuted identically.

use crate::ir::{FnId, Program, SymId};
use crate::sema::CallInfo;

pub(super) fn reorder_actuals(
    prog: &mut Program,
    fn_: FnId,
    info: &mut CallInfo,
    actual_formals: &[SymId],
) {
    let num_args = actual_formals.len();
    let mut formals_to_actuals = vec![0usize; num_args];
    let mut need_to_reorder = false;

    for (i, &formal) in prog.func(fn_).formals.iter().enumerate() {
        for (j, &af) in actual_formals.iter().enumerate() {
            if af == formal {
                if i != j {
                    need_to_reorder = true;
                }
                formals_to_actuals[i] = j;
            }
        }
    }

    if !need_to_reorder {
        return;
    }

    let call = prog.call_mut(info.call);
    debug_assert_eq!(call.actuals.len(), num_args);
    debug_assert_eq!(info.actuals.len(), num_args);

    let saved = std::mem::take(&mut call.actuals);
    let saved_syms = info.actuals.clone();
    let saved_names = info.actual_names.clone();

    let mut reordered = Vec::with_capacity(num_args);
    for i in 0..num_args {
        reordered.push(saved[formals_to_actuals[i]].clone());
        info.actuals[i] = saved_syms[formals_to_actuals[i]];
        info.actual_names[i] = saved_names[formals_to_actuals[i]];
    }
    call.actuals = reordered;
}
