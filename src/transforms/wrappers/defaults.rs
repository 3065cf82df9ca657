// src/transforms/wrappers/defaults.rs
//! Defaults stage.
//!
//! A call with fewer actuals than the callee has formals targets a wrapper
//! whose formal list is exactly the supplied formals; the wrapper computes
//! the omitted ones from their defaults and forwards everything to the
//! origin in one call.

use crate::errors::ResolveError;
use crate::ir::{
    Actual, CallId, Callee, Expr, Flag, FnId, Intent, NominalKind, Prim, Program, Stmt, SymId,
    SymKind, SymbolMap,
};
use crate::sema::{blank_intent_for_type, CallInfo};
use crate::transforms::wrappers::{factory, WrapEnv};

pub(super) fn wrap_defaulted_formals(
    env: &mut WrapEnv,
    fn_: FnId,
    info: &mut CallInfo,
    actual_formals: &mut [SymId],
) -> Result<FnId, ResolveError> {
    let formals = env.program.func(fn_).formals.clone();
    let mut omitted = Vec::new();

    for &formal in &formals {
        if !actual_formals.contains(&formal) {
            omitted.push(formal);
        }
    }

    let wrapper = match env.caches.defaults_get(fn_, &omitted) {
        Some(cached) => cached,
        None => {
            let built = build_wrapper_for_defaulted_formals(env, fn_, info, &omitted)?;
            env.resolution.resolve_formals(env.program, built);
            env.caches.defaults_add(fn_, &omitted, built);
            built
        }
    };

    // update actual_formals[] for use in reorderActuals
    let wrapper_formals = env.program.func(wrapper).formals.clone();
    let mut j = 0;
    for &formal in &formals {
        for af in actual_formals.iter_mut() {
            if *af == formal {
                *af = wrapper_formals[j];
                j += 1;
            }
        }
    }

    Ok(wrapper)
}

fn specialize_default_constructor(prog: &Program, fn_: FnId) -> bool {
    let f = prog.func(fn_);
    f.flags.has(Flag::DefaultConstructor)
        && f
            .this_
            .map(|t| !prog.types.is_ref(prog.sym(t).ty))
            .unwrap_or(false)
}

fn build_wrapper_for_defaulted_formals(
    env: &mut WrapEnv,
    fn_: FnId,
    info: &CallInfo,
    omitted: &[SymId],
) -> Result<FnId, ResolveError> {
    let wrapper = factory::build_empty_wrapper(env.program, fn_, info);

    {
        let prog = &mut *env.program;
        // Prevent name-clash in generated code; also a hint where this
        // function came from.
        let cname = prog.func(fn_).cname;
        let mangled = prog.names.intern_with_prefix("_default_wrap_", cname);
        prog.func_mut(wrapper).cname = mangled;

        // Mimic return type.
        if !prog.func(fn_).is_iterator() {
            prog.func_mut(wrapper).ret_type = prog.func(fn_).ret_type;
        }
    }

    let mut copy_map = SymbolMap::default();
    let specialize = specialize_default_constructor(env.program, fn_);

    if specialize {
        let prog = &mut *env.program;
        prog.func_mut(wrapper).flags.remove(Flag::CompilerGenerated);

        let origin_this = prog.func(fn_).this_.expect("default constructor receiver");
        let this_copy = prog.copy_sym(origin_this);
        prog.func_mut(wrapper).this_ = Some(this_copy);
        copy_map.insert(origin_this, this_copy);
        prog.func_mut(wrapper).body.push(Stmt::Def(this_copy));

        let this_ty = prog.sym(this_copy).ty;
        let last_is_meme = omitted
            .last()
            .map(|&f| prog.sym(f).flags.has(Flag::IsMeme))
            .unwrap_or(false);
        let is_class = prog
            .types
            .nominal_def(this_ty)
            .map(|d| prog.types.def(d).kind == NominalKind::Class)
            .unwrap_or(false);

        if last_is_meme && is_class {
            prog.func_mut(wrapper).body.push(Stmt::Move {
                dst: this_copy,
                src: Expr::Prim(Prim::Alloc, vec![Expr::Type(this_ty)]),
            });
            prog.func_mut(wrapper)
                .body
                .push(Stmt::Expr(Expr::Prim(Prim::SetCid, vec![Expr::Sym(this_copy)])));
        }

        prog.func_mut(wrapper).body.push(Stmt::Expr(Expr::Prim(
            Prim::InitFields,
            vec![Expr::Sym(this_copy)],
        )));
    }

    let inner = {
        let prog = &mut *env.program;
        let square = prog.call(info.call).square;
        prog.new_call(Callee::Fn(fn_), Vec::new(), square, info.loc)
    };

    let formals = env.program.func(fn_).formals.clone();
    for formal in formals {
        if !omitted.contains(&formal) {
            formal_is_not_defaulted(env, fn_, formal, inner, wrapper, &mut copy_map);
        } else if let Some(&bound) = env.param_map.get(&formal) {
            // instantiated param formals forward their binding
            env.program
                .call_mut(inner)
                .actuals
                .push(Actual::positional(Expr::Sym(bound)));
        } else if env.program.sym(formal).flags.has(Flag::IsMeme) {
            let prog = &mut *env.program;
            let this = prog.func(wrapper).this_.expect("meme outside constructor");
            prog.sym_mut(formal).ty = prog.sym(this).ty;
            prog.call_mut(inner)
                .actuals
                .push(Actual::positional(Expr::Sym(this)));
        } else {
            formal_is_defaulted(env, fn_, formal, inner, wrapper, &mut copy_map);
        }
    }

    env.program.update_symbols(wrapper, &copy_map);

    insert_wrapped_call(env.program, fn_, wrapper, inner);

    env.resolution.normalize(env.program, wrapper);

    Ok(wrapper)
}

// The call provides an actual for this formal. The wrapper accepts it and
// passes it along to the origin.
fn formal_is_not_defaulted(
    env: &mut WrapEnv,
    fn_: FnId,
    formal: SymId,
    inner: CallId,
    wrapper: FnId,
    copy_map: &mut SymbolMap,
) {
    let wf = factory::copy_formal_for_wrapper(env.program, formal);
    env.program.func_mut(wrapper).formals.push(wf);

    // a param-valued formal keeps the same binding on the wrapper
    if let Some(&bound) = env.param_map.get(&formal) {
        env.param_map.insert(wf, bound);
    }

    let prog = &mut *env.program;

    if prog.func(fn_).this_ == Some(formal) {
        prog.func_mut(wrapper).this_ = Some(wf);
    }

    if prog.sym(formal).flags.has(Flag::IsMeme) {
        if let Some(this) = prog.func(wrapper).this_ {
            let mv = Stmt::Move {
                dst: this,
                src: Expr::Sym(wf),
            };
            let pos = prog
                .func(wrapper)
                .body
                .stmts
                .iter()
                .position(|s| matches!(s, Stmt::Def(d) if *d == this));
            match pos {
                Some(i) => prog.func_mut(wrapper).body.stmts.insert(i + 1, mv),
                None => prog.func_mut(wrapper).body.push(mv),
            }
        }
    }

    let wf_ty = prog.sym(wf).ty;
    let has_type_expr = matches!(
        &prog.sym(wf).kind,
        SymKind::Formal {
            type_expr: Some(_),
            ..
        }
    );

    if prog.types.is_ref(wf_ty) {
        let temp = prog.new_temp("wrap_ref_arg", wf_ty);
        prog.sym_mut(temp).flags.add(Flag::MaybeParam);
        prog.func_mut(wrapper).body.push(Stmt::Def(temp));
        prog.func_mut(wrapper).body.push(Stmt::Move {
            dst: temp,
            src: Expr::Prim(Prim::AddrOf, vec![Expr::Sym(wf)]),
        });

        update_wrap_call(env, fn_, formal, inner, wrapper, temp, copy_map);
    } else if specialize_default_constructor(prog, fn_)
        && has_type_expr
        && prog.types.is_record_wrapped(wf_ty)
    {
        // Formal has a type expression attached and is record-wrapped:
        // evaluate the type, default-init a typed temp, then run the
        // user-visible assignment so array/domain state is built properly.
        let temp = prog.new_temp("wrap_type_arg", wf_ty);

        let this = prog.func(fn_).this_.expect("default constructor receiver");
        let fname = prog.sym(formal).name;
        if let Some(def) = prog.types.nominal_def(prog.sym(this).ty) {
            if let Some((owner, _)) = prog.types.field_owner(def, fname) {
                if owner == def {
                    prog.sym_mut(temp).flags.add(Flag::InsertAutoDestroy);
                }
            }
        }

        prog.func_mut(wrapper).body.push(Stmt::Def(temp));

        let texpr = match &prog.sym(wf).kind {
            SymKind::Formal {
                type_expr: Some(b), ..
            } => b.clone(),
            _ => unreachable!("checked above"),
        };
        let mut tmap = SymbolMap::default();
        let block = prog.copy_block(&texpr, &mut tmap);
        splice_init(prog, wrapper, temp, block, wf_ty);

        let assign = env.builtins.assign;
        let loc = prog.func(wrapper).loc;
        let assign_call = prog.call_expr(
            Callee::Unresolved(assign),
            vec![Expr::Sym(temp), Expr::Sym(wf)],
            loc,
        );
        prog.func_mut(wrapper).body.push(Stmt::Expr(assign_call));

        update_wrap_call(env, fn_, formal, inner, wrapper, temp, copy_map);
    } else {
        update_wrap_call(env, fn_, formal, inner, wrapper, wf, copy_map);
    }
}

/// Append `block`'s statements, turning its value-producing tail into a
/// default-initialization of `temp`.
fn splice_init(prog: &mut Program, wrapper: FnId, temp: SymId, block: crate::ir::Block, ty: crate::ir::TypeId) {
    let mut stmts = block.stmts;
    let last = stmts.pop();
    for s in stmts {
        prog.func_mut(wrapper).body.push(s);
    }
    match last {
        Some(Stmt::Expr(e)) => prog.func_mut(wrapper).body.push(Stmt::Move {
            dst: temp,
            src: Expr::Prim(Prim::Init, vec![e]),
        }),
        // The tail may already move into its own temp; init from that temp
        // instead of re-evaluating.
        Some(Stmt::Move { dst, src }) => {
            prog.func_mut(wrapper).body.push(Stmt::Move { dst, src });
            prog.func_mut(wrapper).body.push(Stmt::Move {
                dst: temp,
                src: Expr::Prim(Prim::Init, vec![Expr::Sym(dst)]),
            });
        }
        Some(other) => {
            prog.func_mut(wrapper).body.push(other);
            prog.func_mut(wrapper).body.push(Stmt::Move {
                dst: temp,
                src: Expr::Prim(Prim::Init, vec![Expr::Type(ty)]),
            });
        }
        None => prog.func_mut(wrapper).body.push(Stmt::Move {
            dst: temp,
            src: Expr::Prim(Prim::Init, vec![Expr::Type(ty)]),
        }),
    }
}

fn update_wrap_call(
    env: &mut WrapEnv,
    fn_: FnId,
    formal: SymId,
    inner: CallId,
    wrapper: FnId,
    temp: SymId,
    copy_map: &mut SymbolMap,
) {
    copy_map.insert(formal, temp);

    env.program
        .call_mut(inner)
        .actuals
        .push(Actual::positional(Expr::Sym(temp)));

    let prog = &mut *env.program;

    if !specialize_default_constructor(prog, fn_)
        || prog.func(fn_).name == env.builtins.tuple_construct
        || prog.sym(formal).flags.has(Flag::TypeVariable)
        || env.param_map.get(&formal).is_some()
        || prog.sym(formal).ty == prog.types.builtins.method_token
    {
        return;
    }

    let this = match prog.func(wrapper).this_ {
        Some(t) => t,
        None => return,
    };
    let def = match prog.types.nominal_def(prog.sym(this).ty) {
        Some(d) => d,
        None => return,
    };
    let fname = prog.sym(formal).name;
    let owns = matches!(prog.types.field_owner(def, fname), Some((owner, _)) if owner == def);
    if !owns {
        return;
    }

    let tmp = prog.new_temp("wrap_arg", prog.sym(temp).ty);
    prog.func_mut(wrapper).body.push(Stmt::Def(tmp));

    let auto_copy = env.builtins.auto_copy;
    let loc = prog.func(wrapper).loc;
    let copy_call = prog.call_expr(Callee::Unresolved(auto_copy), vec![Expr::Sym(temp)], loc);
    prog.func_mut(wrapper).body.push(Stmt::Move {
        dst: tmp,
        src: copy_call,
    });

    let name_text = prog.names.resolve(fname).to_string();
    let name_lit = prog.cstring_lit(&name_text);
    prog.func_mut(wrapper).body.push(Stmt::Expr(Expr::Prim(
        Prim::SetMember,
        vec![Expr::Sym(this), Expr::Sym(name_lit), Expr::Sym(tmp)],
    )));

    copy_map.insert(formal, tmp);

    // the field and the inner-call argument share the same value
    if let Some(last) = prog.call_mut(inner).actuals.last_mut() {
        last.expr = Expr::Sym(tmp);
    }
}

fn formal_is_defaulted(
    env: &mut WrapEnv,
    fn_: FnId,
    formal: SymId,
    inner: CallId,
    wrapper: FnId,
    copy_map: &mut SymbolMap,
) {
    let specialize = specialize_default_constructor(env.program, fn_);
    let prog = &mut *env.program;

    let fname = prog.sym(formal).name;
    let fty = prog.sym(formal).ty;
    let temp_name = format!("default_arg_{}", prog.names.resolve(fname));
    let temp = prog.new_temp(&temp_name, fty);

    let mut intent = prog.sym(formal).intent();
    let builtins = prog.types.builtins;
    if fty != builtins.type_default_token && fty != builtins.method_token && intent == Intent::Blank
    {
        intent = blank_intent_for_type(&prog.types, fty);
    }

    if !matches!(intent, Intent::Inout | Intent::Out) {
        prog.sym_mut(temp).flags.add(Flag::MaybeParam);
        prog.sym_mut(temp).flags.add(Flag::ExprTemp);
    }

    if prog.sym(formal).flags.has(Flag::TypeVariable) {
        prog.sym_mut(temp).flags.add(Flag::TypeVariable);
    }

    copy_map.insert(formal, temp);
    prog.func_mut(wrapper).body.push(Stmt::Def(temp));

    let default_block = match &prog.sym(formal).kind {
        SymKind::Formal { default_expr, .. } => default_expr.clone(),
        SymKind::Var { .. } => None,
    };
    let is_sentinel = default_block
        .as_ref()
        .map(|b| {
            b.stmts.len() == 1
                && matches!(&b.stmts[0], Stmt::Expr(Expr::Sym(s)) if *s == env.builtins.type_default_token)
        })
        .unwrap_or(false);

    if intent == Intent::Out || default_block.is_none() || is_sentinel {
        apply_default_for_type(prog, formal, wrapper, temp);
    } else {
        // use the argument default for the formal
        let mut dmap = SymbolMap::default();
        let block = prog.copy_block(&default_block.expect("checked above"), &mut dmap);
        let mut stmts = block.stmts;
        let last = stmts.pop();
        for s in stmts {
            prog.func_mut(wrapper).body.push(s);
        }

        let value = match last {
            Some(Stmt::Expr(e)) => Some(e),
            Some(Stmt::Move { dst, src }) => {
                prog.func_mut(wrapper).body.push(Stmt::Move { dst, src });
                Some(Expr::Sym(dst))
            }
            Some(other) => {
                prog.func_mut(wrapper).body.push(other);
                None
            }
            None => None,
        };

        if let Some(value) = value {
            if specialize {
                // Copy-construct from the default value here; the called
                // constructor does not copy field initializers itself, as
                // that would break the array-domain field link.
                let already_copied = matches!(&value, Expr::Call(c) if {
                    match prog.call(*c).callee {
                        Callee::Unresolved(n) => {
                            n == env.builtins.init_copy || n == env.builtins.create_field_default
                        }
                        Callee::Fn(f2) => prog.func(f2).flags.has(Flag::InitCopyFn),
                    }
                });
                let from = if already_copied {
                    value
                } else {
                    let init_copy = env.builtins.init_copy;
                    let loc = prog.func(wrapper).loc;
                    prog.call_expr(Callee::Unresolved(init_copy), vec![value], loc)
                };
                prog.func_mut(wrapper).body.push(Stmt::Move {
                    dst: temp,
                    src: from,
                });
            } else if intent.is_ref() {
                // for a ref intent argument, pass in the address
                prog.func_mut(wrapper).body.push(Stmt::Move {
                    dst: temp,
                    src: Expr::Prim(Prim::AddrOf, vec![value]),
                });
            } else {
                prog.func_mut(wrapper).body.push(Stmt::Move {
                    dst: temp,
                    src: value,
                });
            }
        }

        if prog.sym(formal).intent() == Intent::Inout {
            debug_assert!(!prog.sym(temp).flags.has(Flag::ExprTemp));
            prog.sym_mut(temp).flags.remove(Flag::MaybeParam);
        }
    }

    prog.call_mut(inner)
        .actuals
        .push(Actual::positional(Expr::Sym(temp)));

    // Assigns a field the inner constructor will also set; an initializer
    // iterating over a domain field can observe it before the constructor
    // runs.
    if specialize
        && prog.func(fn_).name != env.builtins.tuple_construct
        && !prog.sym(formal).flags.has(Flag::TypeVariable)
    {
        if let Some(this) = prog.func(wrapper).this_ {
            if let Some(def) = prog.types.nominal_def(prog.sym(this).ty) {
                let owns =
                    matches!(prog.types.field_owner(def, fname), Some((owner, _)) if owner == def);
                if owns {
                    let name_text = prog.names.resolve(fname).to_string();
                    let name_lit = prog.cstring_lit(&name_text);
                    prog.func_mut(wrapper).body.push(Stmt::Expr(Expr::Prim(
                        Prim::SetMember,
                        vec![Expr::Sym(this), Expr::Sym(name_lit), Expr::Sym(temp)],
                    )));
                }
            }
        }
    }
}

// use the default value for the type as the value of the formal
fn apply_default_for_type(prog: &mut Program, formal: SymId, wrapper: FnId, temp: SymId) {
    let fty = prog.sym(formal).ty;
    let is_type_var = prog.sym(formal).flags.has(Flag::TypeVariable);

    let type_expr = match &prog.sym(formal).kind {
        SymKind::Formal { type_expr, .. } => type_expr.clone(),
        SymKind::Var { .. } => None,
    };

    if let Some(texpr) = type_expr {
        let mut tmap = SymbolMap::default();
        let block = prog.copy_block(&texpr, &mut tmap);

        if is_type_var {
            let mut stmts = block.stmts;
            let last = stmts.pop();
            for s in stmts {
                prog.func_mut(wrapper).body.push(s);
            }
            match last {
                Some(Stmt::Expr(e)) => {
                    prog.func_mut(wrapper).body.push(Stmt::Move { dst: temp, src: e })
                }
                Some(Stmt::Move { dst, src }) => {
                    prog.func_mut(wrapper).body.push(Stmt::Move { dst, src });
                    prog.func_mut(wrapper).body.push(Stmt::Move {
                        dst: temp,
                        src: Expr::Sym(dst),
                    });
                }
                Some(other) => prog.func_mut(wrapper).body.push(other),
                None => {}
            }
        } else {
            splice_init(prog, wrapper, temp, block, fty);
        }
    } else if is_type_var {
        prog.func_mut(wrapper).body.push(Stmt::Move {
            dst: temp,
            src: Expr::Type(fty),
        });
    } else {
        prog.func_mut(wrapper).body.push(Stmt::Move {
            dst: temp,
            src: Expr::Prim(Prim::Init, vec![Expr::Type(fty)]),
        });
    }
}

fn insert_wrapped_call(prog: &mut Program, fn_: FnId, wrapper: FnId, inner: CallId) {
    if prog.func(fn_).ret_type == prog.types.builtins.void {
        prog.func_mut(wrapper).body.push(Stmt::Expr(Expr::Call(inner)));
    } else {
        let ret_ty = prog.func(fn_).ret_type;
        let tmp = prog.new_temp("wrap_call_tmp", ret_ty);
        prog.sym_mut(tmp).flags.add(Flag::ExprTemp);
        prog.sym_mut(tmp).flags.add(Flag::MaybeParam);
        prog.sym_mut(tmp).flags.add(Flag::MaybeType);

        prog.func_mut(wrapper).body.push(Stmt::Def(tmp));
        prog.func_mut(wrapper).body.push(Stmt::Move {
            dst: tmp,
            src: Expr::Call(inner),
        });
        prog.func_mut(wrapper).body.push(Stmt::Return(Some(tmp)));
    }

    prog.insert_decl_after(fn_, wrapper);
}
