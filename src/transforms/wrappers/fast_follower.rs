// src/transforms/wrappers/fast_follower.rs
//! Fast-follower check synthesis.
//!
//! A promoted loop can use the fast follower only when the iterands share
//! alignment. The invoking loop needs a compile-time (static) and a runtime
//! (dynamic) check, each in a with-leader and without-leader form. Each
//! check extracts the promoting fields of the call's iterator record into a
//! tuple and forwards to the corresponding zip check; its where clause pins
//! it to the iterator-record type this call site produces.

use crate::ir::{Callee, Expr, Flag, FnDef, FnId, Intent, Prim, RetKind, Stmt, SymId};
use crate::sema::CallInfo;
use crate::transforms::wrappers::WrapEnv;

pub(super) fn build_check(
    env: &mut WrapEnv,
    is_static: bool,
    add_lead: bool,
    info: &CallInfo,
    wrapper: FnId,
    requires_promotion: &[SymId],
) -> FnId {
    let prog = &mut *env.program;
    let loc = info.loc;

    let (fn_name, forward_name) = if is_static {
        (
            env.builtins.static_fast_follow_check,
            env.builtins.static_fast_follow_check_zip,
        )
    } else {
        (
            env.builtins.dynamic_fast_follow_check,
            env.builtins.dynamic_fast_follow_check_zip,
        )
    };

    let ret_kind = if is_static {
        RetKind::Param
    } else {
        RetKind::Value
    };

    let iterator_record = prog.types.builtins.iterator_record;
    let any = prog.types.builtins.any;
    let bool_ = prog.types.builtins.bool_;

    let x_name = prog.names.intern("x");
    let x = prog.new_formal(x_name, iterator_record, Intent::Blank);

    let lead_name = prog.names.intern("lead");
    let lead = prog.new_formal(lead_name, any, Intent::Blank);

    let mut formals = vec![x];
    if add_lead {
        formals.push(lead);
    }

    let check = prog.add_fn(FnDef {
        name: fn_name,
        cname: fn_name,
        formals,
        ret_type: bool_,
        ret_kind,
        body: crate::ir::Block::new(),
        where_clause: None,
        flags: crate::ir::FlagSet::new().with(Flag::CompilerGenerated),
        throws: false,
        instantiation_point: None,
        this_: None,
        loc,
    });

    // pull out only the components that require promotion
    let mut tuple_args = Vec::new();
    let wrapper_formals = prog.func(wrapper).formals.clone();
    for formal in wrapper_formals {
        if !requires_promotion.contains(&formal) {
            continue;
        }
        let fname = prog.sym(formal).name;
        let fty = prog.sym(formal).ty;
        let field = prog.new_var(fname, fty);
        prog.func_mut(check).body.push(Stmt::Def(field));
        prog.func_mut(check).body.push(Stmt::Move {
            dst: field,
            src: Expr::Prim(
                Prim::IterRecFieldValue,
                vec![Expr::Sym(x), Expr::Sym(formal)],
            ),
        });
        tuple_args.push(Expr::Sym(field));
    }

    let build_tuple = prog.call_expr(
        Callee::Unresolved(env.builtins.build_tuple_always_allow_ref),
        tuple_args,
        loc,
    );

    let site_call = prog.copy_expr(&Expr::Call(info.call), &Default::default());
    let where_clause = prog.call_expr(
        Callee::Unresolved(env.builtins.eq),
        vec![
            Expr::Prim(Prim::Typeof, vec![Expr::Sym(x)]),
            Expr::Prim(Prim::Typeof, vec![site_call]),
        ],
        loc,
    );
    prog.func_mut(check).where_clause = Some(where_clause);

    let p_tup = prog.new_temp("p_tup", any);
    prog.func_mut(check).body.push(Stmt::Def(p_tup));
    prog.func_mut(check).body.push(Stmt::Move {
        dst: p_tup,
        src: build_tuple,
    });

    let p_ret = prog.new_temp("p_ret", bool_);
    prog.sym_mut(p_ret).flags.add(Flag::ExprTemp);
    prog.sym_mut(p_ret).flags.add(Flag::MaybeParam);
    prog.func_mut(check).body.push(Stmt::Def(p_ret));

    let mut forward_args = vec![Expr::Sym(p_tup)];
    if add_lead {
        forward_args.push(Expr::Sym(lead));
    }
    let forward = prog.call_expr(Callee::Unresolved(forward_name), forward_args, loc);
    prog.func_mut(check).body.push(Stmt::Move {
        dst: p_ret,
        src: forward,
    });
    prog.func_mut(check).body.push(Stmt::Return(Some(p_ret)));

    prog.push_decl(check);

    env.resolution.normalize(env.program, check);

    let prog = &mut *env.program;
    prog.func_mut(check).flags.add(Flag::Generic);
    prog.func_mut(check).instantiation_point = Some(info.scope);

    check
}
