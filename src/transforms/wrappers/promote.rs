// src/transforms/wrappers/promote.rs
//! Promotion stage.
//!
//! When a collection actual stands where a scalar formal is expected, the
//! call is rewritten against a promotion wrapper that exposes it as an
//! iterator producing per-element results. A void callee promotes to a
//! parallel loop; a value-returning callee promotes to a serial iterator
//! plus leader and follower variants for parallel execution, with optional
//! fast-follower check functions.

use crate::errors::ResolveError;
use crate::ir::{
    Actual, Block, CallId, Callee, Expr, Flag, FnId, Intent, Program, Span, Stmt, SymId, Symbol,
    TypeId,
};
use crate::sema::CallInfo;
use crate::transforms::wrappers::{factory, fast_follower, WrapEnv};

/// Formal-to-collection substitutions for the promoting actuals, in formal
/// order. Record-wrapped collections are ref-lifted before the dispatch
/// query, so the substituted type is what the wrapper formal will carry.
fn promoted_substitutions(env: &mut WrapEnv, fn_: FnId, info: &CallInfo) -> Vec<(SymId, TypeId)> {
    let mut subs = Vec::new();
    let formals = env.program.func(fn_).formals.clone();

    for (j, &formal) in formals.iter().enumerate() {
        let actual_sym = info.actuals[j];
        let mut actual_ty = env.program.sym(actual_sym).ty;

        if env.program.types.is_record_wrapped(actual_ty) {
            actual_ty = env.program.types.make_ref(actual_ty);
        }

        let formal_ty = env.program.sym(formal).ty;
        let dispatch =
            env.resolution
                .can_dispatch(env.program, actual_ty, Some(actual_sym), formal_ty, fn_);
        if dispatch.ok && dispatch.promotes {
            subs.push((formal, actual_ty));
        }
    }

    subs
}

fn promotion_excluded(env: &WrapEnv, fn_: FnId) -> bool {
    let f = env.program.func(fn_);
    f.name == env.builtins.assign || f.flags.has(Flag::TypeConstructor)
}

pub(super) fn is_promotion_required(env: &mut WrapEnv, fn_: FnId, info: &CallInfo) -> bool {
    if promotion_excluded(env, fn_) {
        return false;
    }
    !promoted_substitutions(env, fn_, info).is_empty()
}

pub(super) fn promotion_wrap(
    env: &mut WrapEnv,
    fn_: FnId,
    info: &mut CallInfo,
    build_fast_follower_checks: bool,
) -> Result<FnId, ResolveError> {
    if promotion_excluded(env, fn_) {
        return Ok(fn_);
    }

    let subs = promoted_substitutions(env, fn_, info);
    if subs.is_empty() {
        return Ok(fn_);
    }

    if env.config.report_promotion {
        let name = env.program.names.resolve(env.program.func(fn_).name);
        tracing::debug!(callee = name, loc = ?info.loc, "promotion at call site");
    }

    let wrapper = match env.caches.promotions_get(fn_, &subs) {
        Some(cached) => cached,
        None => {
            let built = build_promotion_wrapper(env, fn_, info, build_fast_follower_checks, &subs)?;
            env.caches.promotions_add(fn_, &subs, built);
            built
        }
    };

    env.resolution.resolve_formals(env.program, wrapper);

    Ok(wrapper)
}

/// A generated loop index for each promoted position, named after the
/// formal position so the planted references can be re-bound by name.
fn index_vars(prog: &mut Program, names: &[Symbol], iters: &[Expr]) -> Vec<SymId> {
    names
        .iter()
        .zip(iters.iter())
        .map(|(&name, iter)| {
            let ty = match iter {
                Expr::Sym(s) => {
                    let collection = prog.sym(*s).ty;
                    prog.types
                        .element_type(collection)
                        .unwrap_or(prog.types.builtins.any)
                }
                _ => prog.types.builtins.any,
            };
            prog.new_var(name, ty)
        })
        .collect()
}

/// The iterable expression handed to a leader/follower builder: the single
/// collection, or a tuple of them for zippered iteration.
fn iterator_expr(prog: &mut Program, build_tuple: Symbol, iters: &[Expr], loc: Span) -> Expr {
    if iters.len() == 1 {
        iters[0].clone()
    } else {
        prog.call_expr(Callee::Unresolved(build_tuple), iters.to_vec(), loc)
    }
}

fn build_promotion_wrapper(
    env: &mut WrapEnv,
    fn_: FnId,
    info: &CallInfo,
    build_fast_follower_checks: bool,
    subs: &[(SymId, TypeId)],
) -> Result<FnId, ResolveError> {
    let wrapper = factory::build_empty_wrapper(env.program, fn_, info);

    {
        let prog = &mut *env.program;
        prog.func_mut(wrapper).flags.add(Flag::PromotionWrapper);
        // Promoting a default constructor: the wrapper itself is no longer
        // one.
        prog.func_mut(wrapper).flags.remove(Flag::DefaultConstructor);
        let cname = prog.func(fn_).cname;
        let mangled = prog.names.intern_with_prefix("_promotion_wrap_", cname);
        prog.func_mut(wrapper).cname = mangled;
    }

    let mut requires_promotion: Vec<SymId> = Vec::new();
    let mut index_names: Vec<Symbol> = Vec::new();
    let mut iters: Vec<Expr> = Vec::new();

    let inner = env
        .program
        .new_call(Callee::Fn(fn_), Vec::new(), false, info.loc);

    let formals = env.program.func(fn_).formals.clone();
    for (i, &formal) in formals.iter().enumerate() {
        let new_formal = factory::copy_formal_for_wrapper(env.program, formal);

        if let Some(&bound) = env.param_map.get(&formal) {
            env.param_map.insert(new_formal, bound);
        }

        let prog = &mut *env.program;

        if prog.func(fn_).this_ == Some(formal) {
            prog.func_mut(wrapper).this_ = Some(new_formal);
        }

        if let Some(&(_, sub_ty)) = subs.iter().find(|(f, _)| *f == formal) {
            // a promoted formal must carry an iterable collection
            if !prog.types.is_record_wrapped(prog.types.val_type(sub_ty)) {
                let name = prog.names.resolve(prog.sym(formal).name).to_string();
                return Err(ResolveError::MalformedPromotion {
                    name,
                    span: info.loc.into(),
                });
            }
            requires_promotion.push(new_formal);
            prog.sym_mut(new_formal).ty = sub_ty;
            prog.func_mut(wrapper).formals.push(new_formal);
            iters.push(Expr::Sym(new_formal));

            let name = prog.names.intern(&format!("p_i_{}", i + 1));
            index_names.push(name);
            prog.call_mut(inner)
                .actuals
                .push(Actual::positional(Expr::Unresolved(name)));
        } else {
            prog.func_mut(wrapper).formals.push(new_formal);
            prog.call_mut(inner)
                .actuals
                .push(Actual::positional(Expr::Sym(new_formal)));
        }
    }

    let zippered = iters.len() > 1;
    let void = env.program.types.builtins.void;

    if env.program.func(fn_).ret_type == void {
        let prog = &mut *env.program;
        let indices = index_vars(prog, &index_names, &iters);
        prog.func_mut(wrapper).body.push(Stmt::Forall {
            indices,
            iters: iters.clone(),
            body: Block::of(vec![Stmt::Expr(Expr::Call(inner))]),
            zippered,
        });
    } else {
        {
            let prog = &mut *env.program;
            prog.func_mut(wrapper).flags.add(Flag::IteratorFn);
            prog.func_mut(wrapper).flags.remove(Flag::Inline);
        }

        build_leader(env, wrapper, info, &iters, zippered);
        build_follower(env, wrapper, fn_, info, inner, &index_names, &iters, zippered)?;

        if env.config.fast_follower_checks && build_fast_follower_checks {
            // static (param) checks, then dynamic, each with and without a
            // leading iterator argument
            fast_follower::build_check(env, true, false, info, wrapper, &requires_promotion);
            fast_follower::build_check(env, true, true, info, wrapper, &requires_promotion);
            fast_follower::build_check(env, false, false, info, wrapper, &requires_promotion);
            fast_follower::build_check(env, false, true, info, wrapper, &requires_promotion);
        }

        // Finish the serial iterator; construction stopped mid-way so the
        // common shell could be copied for the leader/follower.
        let prog = &mut *env.program;
        let any = prog.types.builtins.any;
        let yield_tmp = prog.new_temp("p_yield", any);
        prog.sym_mut(yield_tmp).flags.add(Flag::ExprTemp);

        let yield_block = Block::of(vec![
            Stmt::Def(yield_tmp),
            Stmt::Move {
                dst: yield_tmp,
                src: Expr::Call(inner),
            },
            Stmt::Yield(yield_tmp),
        ]);

        let indices = index_vars(prog, &index_names, &iters);
        prog.func_mut(wrapper).body.push(Stmt::For {
            indices,
            iters: iters.clone(),
            body: yield_block,
            zippered,
        });
    }

    env.program.insert_decl_before(fn_, wrapper);
    env.resolution.normalize(env.program, wrapper);
    fix_unresolved_index_refs(env.program, wrapper, fn_, info.loc)?;

    Ok(wrapper)
}

fn build_leader(env: &mut WrapEnv, wrapper: FnId, info: &CallInfo, iters: &[Expr], zippered: bool) {
    let (lifn, leader_map) = env.program.copy_fn(wrapper);
    debug_assert!(!env.program.func(lifn).flags.has(Flag::Resolved));

    env.program.iterator_leader.insert(wrapper, lifn);
    env.program.func_mut(lifn).body = Block::new(); // indices are unused in the leader

    for (&old, &new) in leader_map.iter() {
        if let Some(&bound) = env.param_map.get(&old) {
            env.param_map.insert(new, bound);
        }
    }

    let prog = &mut *env.program;
    let iter_kind = prog.types.builtins.iter_kind;
    let tag_formal = prog.new_formal(env.builtins.tag, iter_kind, Intent::Param);

    // leader iterators are always inlined
    prog.func_mut(lifn).flags.add(Flag::InlineIterator);
    prog.func_mut(lifn).formals.push(tag_formal);

    let loc = info.loc;
    let where_clause = prog.call_expr(
        Callee::Unresolved(env.builtins.eq),
        vec![Expr::Sym(tag_formal), Expr::Sym(env.builtins.leader_tag)],
        loc,
    );
    prog.func_mut(lifn).where_clause = Some(where_clause);

    let any = prog.types.builtins.any;
    let leader_index = prog.new_temp("p_leader_index", any);
    let leader_iterator = prog.new_temp("p_leader_iterator", any);
    prog.sym_mut(leader_iterator).flags.add(Flag::ExprTemp);

    prog.func_mut(lifn).body.push(Stmt::Def(leader_iterator));

    let iter_copies: Vec<Expr> = iters
        .iter()
        .map(|e| prog.copy_expr(e, &leader_map))
        .collect();
    let iterand = iterator_expr(prog, env.builtins.build_tuple, &iter_copies, loc);
    let to_leader = if zippered {
        env.builtins.to_leader_zip
    } else {
        env.builtins.to_leader
    };
    let leader_call = prog.call_expr(Callee::Unresolved(to_leader), vec![iterand], loc);
    prog.func_mut(lifn).body.push(Stmt::Move {
        dst: leader_iterator,
        src: leader_call,
    });

    prog.func_mut(lifn).body.push(Stmt::For {
        indices: vec![leader_index],
        iters: vec![Expr::Sym(leader_iterator)],
        body: Block::of(vec![Stmt::Yield(leader_index)]),
        zippered,
    });

    prog.push_decl(lifn);

    env.resolution.normalize(env.program, lifn);

    let prog = &mut *env.program;
    prog.func_mut(lifn).flags.add(Flag::Generic);
    prog.func_mut(lifn).instantiation_point = Some(info.scope);
}

#[allow(clippy::too_many_arguments)]
fn build_follower(
    env: &mut WrapEnv,
    wrapper: FnId,
    origin: FnId,
    info: &CallInfo,
    inner: CallId,
    index_names: &[Symbol],
    iters: &[Expr],
    zippered: bool,
) -> Result<(), ResolveError> {
    let (fifn, follower_map) = env.program.copy_fn(wrapper);
    debug_assert!(!env.program.func(fifn).flags.has(Flag::Resolved));

    env.program.iterator_follower.insert(wrapper, fifn);

    for (&old, &new) in follower_map.iter() {
        if let Some(&bound) = env.param_map.get(&old) {
            env.param_map.insert(new, bound);
        }
    }

    let prog = &mut *env.program;
    let loc = info.loc;
    let iter_kind = prog.types.builtins.iter_kind;
    let any = prog.types.builtins.any;
    let bool_ = prog.types.builtins.bool_;

    let tag_formal = prog.new_formal(env.builtins.tag, iter_kind, Intent::Param);
    prog.func_mut(fifn).formals.push(tag_formal);

    let follow_this = prog.new_formal(env.builtins.follow_this, any, Intent::Blank);
    prog.func_mut(fifn).formals.push(follow_this);

    let fast = prog.new_formal(env.builtins.fast, bool_, Intent::Param);
    prog.set_default_expr(fast, Block::of(vec![Stmt::Expr(Expr::Sym(env.builtins.false_))]));
    prog.func_mut(fifn).formals.push(fast);

    let where_clause = prog.call_expr(
        Callee::Unresolved(env.builtins.eq),
        vec![Expr::Sym(tag_formal), Expr::Sym(env.builtins.follower_tag)],
        loc,
    );
    prog.func_mut(fifn).where_clause = Some(where_clause);

    let follower_iterator = prog.new_temp("p_follower_iterator", any);
    prog.sym_mut(follower_iterator).flags.add(Flag::ExprTemp);
    prog.func_mut(fifn).body.push(Stmt::Def(follower_iterator));

    // fast and regular branches each evaluate their own copy of the iterand
    let (to_fast, to_slow) = if zippered {
        (
            env.builtins.to_fast_follower_zip,
            env.builtins.to_follower_zip,
        )
    } else {
        (env.builtins.to_fast_follower, env.builtins.to_follower)
    };

    let fast_copies: Vec<Expr> = iters
        .iter()
        .map(|e| prog.copy_expr(e, &follower_map))
        .collect();
    let fast_iterand = iterator_expr(prog, env.builtins.build_tuple, &fast_copies, loc);
    let fast_call = prog.call_expr(
        Callee::Unresolved(to_fast),
        vec![fast_iterand, Expr::Sym(follow_this)],
        loc,
    );

    let slow_copies: Vec<Expr> = iters
        .iter()
        .map(|e| prog.copy_expr(e, &follower_map))
        .collect();
    let slow_iterand = iterator_expr(prog, env.builtins.build_tuple, &slow_copies, loc);
    let slow_call = prog.call_expr(
        Callee::Unresolved(to_slow),
        vec![slow_iterand, Expr::Sym(follow_this)],
        loc,
    );

    prog.func_mut(fifn).body.push(Stmt::Cond {
        cond: Expr::Sym(fast),
        then_block: Block::of(vec![Stmt::Move {
            dst: follower_iterator,
            src: fast_call,
        }]),
        else_block: Block::of(vec![Stmt::Move {
            dst: follower_iterator,
            src: slow_call,
        }]),
    });

    let yield_tmp = prog.new_temp("p_yield", any);
    prog.sym_mut(yield_tmp).flags.add(Flag::ExprTemp);

    let inner_copy = prog.copy_expr(&Expr::Call(inner), &follower_map);
    let follower_block = Block::of(vec![
        Stmt::Def(yield_tmp),
        Stmt::Move {
            dst: yield_tmp,
            src: inner_copy,
        },
        Stmt::Yield(yield_tmp),
    ]);

    let indices = index_vars(prog, index_names, &fast_copies);
    prog.func_mut(fifn).body.push(Stmt::For {
        indices,
        iters: vec![Expr::Sym(follower_iterator)],
        body: follower_block,
        zippered,
    });

    prog.push_decl(fifn);

    env.resolution.normalize(env.program, fifn);

    let prog = &mut *env.program;
    prog.func_mut(fifn).flags.add(Flag::Generic);
    prog.func_mut(fifn).instantiation_point = Some(info.scope);

    fix_unresolved_index_refs(env.program, fifn, origin, info.loc)
}

/// Re-bind the planted index names inside calls to `origin` against the
/// index definitions of the enclosing generated loop.
pub(super) fn fix_unresolved_index_refs(
    prog: &mut Program,
    f: FnId,
    origin: FnId,
    loc: Span,
) -> Result<(), ResolveError> {
    let body = prog.func(f).body.clone();
    let mut fixes: Vec<(CallId, usize, SymId)> = Vec::new();
    let mut missing: Option<Symbol> = None;
    let mut scope: Vec<SymId> = Vec::new();

    walk_block(prog, &body, origin, &mut scope, &mut fixes, &mut missing);

    if let Some(name) = missing {
        return Err(ResolveError::PromotionIndexUnresolved {
            name: prog.names.resolve(name).to_string(),
            span: loc.into(),
        });
    }

    for (call, idx, sym) in fixes {
        prog.call_mut(call).actuals[idx].expr = Expr::Sym(sym);
    }
    Ok(())
}

fn walk_block(
    prog: &Program,
    block: &Block,
    origin: FnId,
    scope: &mut Vec<SymId>,
    fixes: &mut Vec<(CallId, usize, SymId)>,
    missing: &mut Option<Symbol>,
) {
    for stmt in &block.stmts {
        match stmt {
            Stmt::Move { src, .. } => walk_expr(prog, src, origin, scope, fixes, missing),
            Stmt::Expr(e) => walk_expr(prog, e, origin, scope, fixes, missing),
            Stmt::For {
                indices,
                iters,
                body,
                ..
            }
            | Stmt::Forall {
                indices,
                iters,
                body,
                ..
            } => {
                for e in iters {
                    walk_expr(prog, e, origin, scope, fixes, missing);
                }
                let depth = scope.len();
                scope.extend(indices.iter().copied());
                walk_block(prog, body, origin, scope, fixes, missing);
                scope.truncate(depth);
            }
            Stmt::Cond {
                cond,
                then_block,
                else_block,
            } => {
                walk_expr(prog, cond, origin, scope, fixes, missing);
                walk_block(prog, then_block, origin, scope, fixes, missing);
                walk_block(prog, else_block, origin, scope, fixes, missing);
            }
            _ => {}
        }
    }
}

fn walk_expr(
    prog: &Program,
    expr: &Expr,
    origin: FnId,
    scope: &mut Vec<SymId>,
    fixes: &mut Vec<(CallId, usize, SymId)>,
    missing: &mut Option<Symbol>,
) {
    match expr {
        Expr::Call(id) => {
            let node = prog.call(*id);
            if node.callee == Callee::Fn(origin) {
                for (k, actual) in node.actuals.iter().enumerate() {
                    if let Expr::Unresolved(name) = actual.expr {
                        match scope.iter().rev().find(|&&s| prog.sym(s).name == name) {
                            Some(&s) => fixes.push((*id, k, s)),
                            None => *missing = Some(name),
                        }
                    }
                }
            }
            for actual in &node.actuals {
                walk_expr(prog, &actual.expr, origin, scope, fixes, missing);
            }
        }
        Expr::Prim(_, args) => {
            for a in args {
                walk_expr(prog, a, origin, scope, fixes, missing);
            }
        }
        _ => {}
    }
}
