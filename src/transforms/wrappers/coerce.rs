// src/transforms/wrappers/coerce.rs
//! Coercion stage: add explicit casts on the actuals.
//!
//! Each actual is rewritten until its type equals the formal's, through up
//! to six steps: sync/single reads, dereferences, and explicit casts each
//! strip one layer and may expose another.

use crate::errors::ResolveError;
use crate::ir::{Callee, Expr, Flag, FnId, InternedType, Prim, Stmt, SymId};
use crate::sema::{concrete_intent_for_arg, CalleeStatus, CallInfo};
use crate::transforms::wrappers::WrapEnv;

/// Cap on rewrite steps per actual. Nested sync/ref layerings converge well
/// under this; exceeding it means the rewrite is cycling.
const MAX_COERCION_STEPS: u32 = 6;

pub(super) fn coerce_actuals(
    env: &mut WrapEnv,
    fn_: FnId,
    info: &mut CallInfo,
) -> Result<(), ResolveError> {
    if env.program.func(fn_).ret_kind == crate::ir::RetKind::Param {
        // This call will be folded away after resolution. A read of a sync
        // actual inserted here would stick around as an observable side
        // effect even after the call is removed, so do nothing.
        return Ok(());
    }

    let formals = env.program.func(fn_).formals.clone();

    for (j, &formal) in formals.iter().enumerate() {
        let mut checks_left = MAX_COERCION_STEPS;
        loop {
            let actual_sym = info.actuals[j];
            let actual_ty = env.program.sym(actual_sym).ty;
            let mut check_again = false;

            if need_to_add_coercion(env, actual_ty, actual_sym, formal, fn_) {
                let formal_ty = env.program.sym(formal).ty;
                let is_str_literal = env.program.types.is_str(actual_ty)
                    && env.program.sym(actual_sym).is_immediate();

                if env.program.types.is_c_str(formal_ty) && is_str_literal {
                    // The literal is known valid, and there is no cast from
                    // string to c_string (callers are meant to use an
                    // explicit conversion), so swap the literal in place.
                    rewrite_string_literal(env, info, j, actual_sym);
                } else {
                    add_arg_coercion(env, fn_, info, j, formal, &mut check_again)?;
                }
            }

            if !check_again {
                break;
            }
            checks_left -= 1;
            if checks_left == 0 {
                tracing::warn!(
                    actual = j,
                    "coercion chain did not converge; giving up"
                );
                return Err(ResolveError::CoercionLimit {
                    actual_index: j,
                    limit: MAX_COERCION_STEPS,
                    span: info.loc.into(),
                });
            }
        }
    }

    Ok(())
}

// do we need to add some coercion from the actual to the formal?
fn need_to_add_coercion(
    env: &WrapEnv,
    actual_ty: crate::ir::TypeId,
    actual_sym: SymId,
    formal: SymId,
    fn_: FnId,
) -> bool {
    let prog = &*env.program;
    let formal_ty = prog.sym(formal).ty;

    if actual_ty == formal_ty {
        return false;
    }

    // An actual of ref(formal type) against a ref intent needs nothing.
    if prog.types.is_ref(actual_ty)
        && prog.types.val_type(actual_ty) == formal_ty
        && concrete_intent_for_arg(&prog.types, prog.sym(formal)).is_ref()
    {
        return false;
    }

    env.resolution
        .can_coerce(prog, actual_ty, Some(actual_sym), formal_ty, fn_)
        || env.resolution.is_dispatch_parent(prog, actual_ty, formal_ty)
}

fn rewrite_string_literal(env: &mut WrapEnv, info: &mut CallInfo, j: usize, actual_sym: SymId) {
    let prog = &mut *env.program;
    let text = match prog.sym(actual_sym).immediate() {
        Some(crate::ir::Immediate::Str(s)) => s.clone(),
        _ => return,
    };
    let new_sym = prog.cstring_lit(&text);
    prog.call_mut(info.call).actuals[j].expr = Expr::Sym(new_sym);
    info.actuals[j] = new_sym;
}

// Insert one coercion step: replace the actual with a temp computed from it.
fn add_arg_coercion(
    env: &mut WrapEnv,
    fn_: FnId,
    info: &mut CallInfo,
    j: usize,
    formal: SymId,
    check_again: &mut bool,
) -> Result<(), ResolveError> {
    let actual_sym = info.actuals[j];
    let prog = &mut *env.program;

    let ats = prog.sym(actual_sym).ty;
    let fts = prog.sym(formal).ty;
    let loc = prog.call(info.call).loc;

    let prev_actual = prog.call(info.call).actuals[j].expr.clone();

    enum CastKind {
        Call(crate::ir::CallId),
        Deref,
    }

    let (cast_kind, result_ty) = match prog.types.get(prog.types.val_type(ats)).clone() {
        InternedType::Sync(inner) => {
            // stripping sync-ness may expose another layer
            *check_again = true;
            let result = if prog.types.is_ref(ats) {
                prog.types.make_ref(inner)
            } else {
                inner
            };
            let callee = Callee::Unresolved(env.builtins.read_full_empty);
            let token = env.builtins.method_token;
            let call = prog.new_call(
                callee,
                vec![
                    crate::ir::Actual::positional(Expr::Sym(token)),
                    crate::ir::Actual::positional(prev_actual.clone()),
                ],
                false,
                loc,
            );
            (CastKind::Call(call), result)
        }
        InternedType::Single(inner) => {
            *check_again = true;
            let result = if prog.types.is_ref(ats) {
                prog.types.make_ref(inner)
            } else {
                inner
            };
            let callee = Callee::Unresolved(env.builtins.read_full_full);
            let token = env.builtins.method_token;
            let call = prog.new_call(
                callee,
                vec![
                    crate::ir::Actual::positional(Expr::Sym(token)),
                    crate::ir::Actual::positional(prev_actual.clone()),
                ],
                false,
                loc,
            );
            (CastKind::Call(call), result)
        }
        _ if prog.types.is_ref(ats)
            && !(prog.types.is_tuple(prog.types.val_type(ats))
                && prog.types.is_tuple(prog.types.val_type(fts))) =>
        {
            // after dereferencing we may need another coercion, e.g.
            //   ref(int) -> int -> real
            *check_again = true;
            (CastKind::Deref, prog.types.val_type(ats))
        }
        _ => {
            let call = prog.new_call(
                Callee::Unresolved(env.builtins.cast),
                vec![
                    crate::ir::Actual::positional(Expr::Type(fts)),
                    crate::ir::Actual::positional(prev_actual.clone()),
                ],
                false,
                loc,
            );
            (CastKind::Call(call), fts)
        }
    };

    let cast_temp = prog.new_temp("coerce_tmp", result_ty);
    prog.sym_mut(cast_temp).flags.add(Flag::CoerceTemp);

    // preserve this-ness so constructors can still write receiver fields
    if prog.sym(actual_sym).flags.has(Flag::ArgThis)
        && env.resolution.is_dispatch_parent(prog, ats, fts)
    {
        prog.sym_mut(cast_temp).flags.add(Flag::ArgThis);
    }

    let cast_expr = match &cast_kind {
        CastKind::Call(call) => Expr::Call(*call),
        CastKind::Deref => {
            if prog.sym(actual_sym).flags.has(Flag::RefToConst) {
                prog.sym_mut(cast_temp).flags.add(Flag::Const);
                if prog
                    .sym(actual_sym)
                    .flags
                    .has(Flag::RefForConstFieldOfThis)
                {
                    prog.sym_mut(cast_temp)
                        .flags
                        .add(Flag::RefForConstFieldOfThis);
                }
            }
            Expr::Prim(Prim::Deref, vec![prev_actual.clone()])
        }
    };

    if matches!(cast_kind, CastKind::Call(_)) && prog.types.is_str(fts) {
        prog.sym_mut(cast_temp).flags.add(Flag::InsertAutoDestroy);
    }

    // def coerce_tmp; move coerce_tmp <- cast, ahead of the call statement
    prog.call_mut(info.call).actuals[j].expr = Expr::Sym(cast_temp);
    prog.insert_before_call(
        info.caller,
        info.call,
        vec![
            Stmt::Def(cast_temp),
            Stmt::Move {
                dst: cast_temp,
                src: cast_expr,
            },
        ],
    );

    info.actuals[j] = cast_temp;

    if let CastKind::Call(cast_call) = cast_kind {
        let status = env
            .resolution
            .resolve_call_and_callee(env.program, cast_call, true);
        if let CalleeStatus::Failed(target) = status {
            let prog = &*env.program;
            return Err(ResolveError::CastResolutionFailed {
                from: prog.types.describe(ats, &prog.names),
                to: prog.types.describe(fts, &prog.names),
                span: info.loc.into(),
                target: prog.func(target).loc.into(),
            });
        }
        env.resolution.resolve_call(env.program, cast_call);
    }

    Ok(())
}
