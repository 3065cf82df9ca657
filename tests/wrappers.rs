// tests/wrappers.rs
//
// End-to-end scenarios for the call-site wrapper pipeline: defaults,
// reorder, coercion, and promotion composed over a single call site.

use stoat::errors::ResolveError;
use stoat::ir::{
    Actual, Block, Callee, Expr, FieldDef, Flag, FlagSet, FnDef, FnId, Immediate, Intent,
    NominalKind, Prim, Program, RetKind, Span, Stmt, SymId, Symbol, TypeId,
};
use stoat::sema::{Builtins, CallInfo, RuleResolution};
use stoat::transforms::wrappers::{
    wrap_and_cleanup_actuals, ParamMap, WrapConfig, WrapEnv, WrapperCaches,
};

struct Harness {
    prog: Program,
    builtins: Builtins,
    caches: WrapperCaches,
    param_map: ParamMap,
    rules: RuleResolution,
}

impl Harness {
    fn new() -> Self {
        let mut prog = Program::new();
        let builtins = Builtins::install(&mut prog);
        Self {
            prog,
            builtins,
            caches: WrapperCaches::new(),
            param_map: ParamMap::default(),
            rules: RuleResolution::new(),
        }
    }

    fn env(&mut self) -> WrapEnv<'_> {
        WrapEnv {
            program: &mut self.prog,
            resolution: &mut self.rules,
            caches: &mut self.caches,
            param_map: &mut self.param_map,
            builtins: &self.builtins,
            config: WrapConfig::default(),
        }
    }

    fn formal(&mut self, name: &str, ty: TypeId) -> SymId {
        let name = self.prog.names.intern(name);
        self.prog.new_formal(name, ty, Intent::Blank)
    }

    fn formal_with_default(&mut self, name: &str, ty: TypeId, value: i64) -> SymId {
        let formal = self.formal(name, ty);
        let lit = self.prog.int_lit(value);
        self.prog
            .set_default_expr(formal, Block::of(vec![Stmt::Expr(Expr::Sym(lit))]));
        formal
    }

    fn function(&mut self, name: &str, formals: Vec<SymId>, ret_type: TypeId) -> FnId {
        let name = self.prog.names.intern(name);
        let f = self.prog.add_fn(FnDef {
            name,
            cname: name,
            formals,
            ret_type,
            ret_kind: RetKind::Value,
            body: Block::new(),
            where_clause: None,
            flags: FlagSet::new(),
            throws: false,
            instantiation_point: None,
            this_: None,
            loc: Span::new(1, 1),
        });
        self.prog.push_decl(f);
        f
    }

    fn var(&mut self, name: &str, ty: TypeId) -> SymId {
        let name = self.prog.names.intern(name);
        self.prog.new_var(name, ty)
    }

    fn call_site(&mut self, callee: FnId, actuals: Vec<(SymId, Option<Symbol>)>) -> CallInfo {
        let call_actuals = actuals
            .iter()
            .map(|&(sym, name)| Actual {
                name,
                expr: Expr::Sym(sym),
            })
            .collect();
        let call = self
            .prog
            .new_call(Callee::Fn(callee), call_actuals, false, Span::new(50, 4));

        let caller_name = self.prog.names.intern("caller");
        let void = self.prog.types.builtins.void;
        let caller = self.prog.add_fn(FnDef {
            name: caller_name,
            cname: caller_name,
            formals: vec![],
            ret_type: void,
            ret_kind: RetKind::Value,
            body: Block::of(vec![Stmt::Expr(Expr::Call(call))]),
            where_clause: None,
            flags: FlagSet::new(),
            throws: false,
            instantiation_point: None,
            this_: None,
            loc: Span::default(),
        });
        self.prog.push_decl(caller);

        let scope = self.prog.new_scope();
        CallInfo::gather(&self.prog, call, caller, scope).expect("symbol actuals")
    }

    fn run(
        &mut self,
        fn_: FnId,
        info: &mut CallInfo,
        actual_formals: &mut Vec<SymId>,
    ) -> Result<FnId, ResolveError> {
        let mut env = self.env();
        wrap_and_cleanup_actuals(&mut env, fn_, info, actual_formals, true)
    }

    fn calls_to(&self, f: FnId, target: FnId) -> Vec<stoat::ir::CallId> {
        self.prog
            .collect_calls(f)
            .into_iter()
            .filter(|&c| self.prog.call(c).callee == Callee::Fn(target))
            .collect()
    }
}

fn assert_positional_and_typed(h: &Harness, info: &CallInfo, callee: FnId) {
    let call = h.prog.call(info.call);
    let formals = &h.prog.func(callee).formals;
    assert_eq!(call.actuals.len(), formals.len(), "arity mismatch");
    for (i, actual) in call.actuals.iter().enumerate() {
        assert!(actual.name.is_none(), "actual {} still labeled", i);
        let sym = match actual.expr {
            Expr::Sym(s) => s,
            _ => panic!("actual {} is not a symbol", i),
        };
        let at = h.prog.sym(sym).ty;
        let ft = h.prog.sym(formals[i]).ty;
        let matches_modulo_ref =
            at == ft || (h.prog.types.is_ref(at) && h.prog.types.val_type(at) == ft)
                || (h.prog.types.is_ref(ft) && h.prog.types.val_type(ft) == at);
        assert!(
            matches_modulo_ref,
            "actual {} type {} does not match formal type {}",
            i,
            h.prog.types.describe(at, &h.prog.names),
            h.prog.types.describe(ft, &h.prog.names)
        );
    }
}

// Callee f(a: int, b: int = 10, c: int = 20); call site f(c = 3, a = 1).
#[test]
fn defaults_and_reorder() {
    let mut h = Harness::new();
    let int = h.prog.types.builtins.int;

    let a = h.formal("a", int);
    let b = h.formal_with_default("b", int, 10);
    let c = h.formal_with_default("c", int, 20);
    let f = h.function("f", vec![a, b, c], int);

    let three = h.prog.int_lit(3);
    let one = h.prog.int_lit(1);
    let c_label = Some(h.prog.sym(c).name);
    let a_label = Some(h.prog.sym(a).name);
    let mut info = h.call_site(f, vec![(three, c_label), (one, a_label)]);
    let mut actual_formals = vec![c, a];

    let wrapper = h.run(f, &mut info, &mut actual_formals).unwrap();

    assert_ne!(wrapper, f);
    assert!(h.prog.func(wrapper).flags.has(Flag::Wrapper));
    assert_eq!(h.prog.func(wrapper).formals.len(), 2);

    // the call site became W(1, 3), positional and typed
    assert_positional_and_typed(&h, &info, wrapper);
    assert_eq!(info.actuals, vec![one, three]);

    // the wrapper forwards to f exactly once, with all three formals bound
    let inner = h.calls_to(wrapper, f);
    assert_eq!(inner.len(), 1);
    assert_eq!(h.prog.call(inner[0]).actuals.len(), 3);

    // b is computed inside the wrapper from its default
    let wname = h.prog.names.resolve(h.prog.func(wrapper).cname);
    assert!(wname.starts_with("_default_wrap_"));
    let has_default_temp = h
        .prog
        .func(wrapper)
        .body
        .stmts
        .iter()
        .any(|s| matches!(s, Stmt::Def(d) if h.prog.names.resolve(h.prog.sym(*d).name).starts_with("default_arg_")));
    assert!(has_default_temp);
}

// Repeated requests with the same omitted set reuse the cached wrapper.
#[test]
fn defaults_cache_is_idempotent_across_call_sites() {
    let mut h = Harness::new();
    let int = h.prog.types.builtins.int;

    let a = h.formal("a", int);
    let b = h.formal_with_default("b", int, 10);
    let c = h.formal_with_default("c", int, 20);
    let f = h.function("f", vec![a, b, c], int);

    let one = h.prog.int_lit(1);
    let three = h.prog.int_lit(3);
    let mut info1 = h.call_site(f, vec![(three, None), (one, None)]);
    let mut formals1 = vec![c, a];
    let w1 = h.run(f, &mut info1, &mut formals1).unwrap();

    let five = h.prog.int_lit(5);
    let six = h.prog.int_lit(6);
    let mut info2 = h.call_site(f, vec![(five, None), (six, None)]);
    let mut formals2 = vec![a, c];
    let w2 = h.run(f, &mut info2, &mut formals2).unwrap();

    assert_eq!(w1, w2);

    // a different omitted set builds a different wrapper
    let seven = h.prog.int_lit(7);
    let mut info3 = h.call_site(f, vec![(seven, None)]);
    let mut formals3 = vec![a];
    let w3 = h.run(f, &mut info3, &mut formals3).unwrap();
    assert_ne!(w1, w3);
}

// Callee g(x: real); the actual is ref(sync(int)). Expected rewrite chain:
// read-full-empty, dereference, int-to-real cast.
#[test]
fn coercion_chain_through_ref_sync() {
    let mut h = Harness::new();
    let int = h.prog.types.builtins.int;
    let real = h.prog.types.builtins.real;

    let x = h.formal("x", real);
    let g = h.function("g", vec![x], real);

    let sync_int = h.prog.types.sync(int);
    let ref_sync_int = h.prog.types.make_ref(sync_int);
    let v = h.var("v", ref_sync_int);
    let mut info = h.call_site(g, vec![(v, None)]);
    let mut actual_formals = vec![x];

    let result = h.run(g, &mut info, &mut actual_formals).unwrap();
    assert_eq!(result, g);

    // final actual is a real-typed temp
    assert_positional_and_typed(&h, &info, g);
    let final_sym = info.actuals[0];
    assert_eq!(h.prog.sym(final_sym).ty, real);
    assert!(h.prog.sym(final_sym).flags.has(Flag::CoerceTemp));

    // three def+move pairs inserted ahead of the call
    let body = &h.prog.func(info.caller).body;
    assert_eq!(body.stmts.len(), 7);

    let mut moves = Vec::new();
    for s in &body.stmts {
        if let Stmt::Move { src, .. } = s {
            moves.push(src.clone());
        }
    }
    assert_eq!(moves.len(), 3);

    // step 1: a read of the sync slot
    match &moves[0] {
        Expr::Call(c) => match h.prog.call(*c).callee {
            Callee::Unresolved(n) => {
                assert_eq!(h.prog.names.resolve(n), "_read_full_empty")
            }
            other => panic!("unexpected callee {:?}", other),
        },
        other => panic!("expected read call, got {:?}", other),
    }
    // step 2: a dereference
    assert!(matches!(&moves[1], Expr::Prim(Prim::Deref, _)));
    // step 3: the explicit cast
    match &moves[2] {
        Expr::Call(c) => match h.prog.call(*c).callee {
            Callee::Unresolved(n) => assert_eq!(h.prog.names.resolve(n), "_cast"),
            other => panic!("unexpected callee {:?}", other),
        },
        other => panic!("expected cast call, got {:?}", other),
    }
}

// A cast whose target function exists but failed to resolve is a
// user-visible error pointing at both locations.
#[test]
fn failed_cast_target_is_reported() {
    let mut h = Harness::new();
    let int = h.prog.types.builtins.int;
    let real = h.prog.types.builtins.real;

    let x = h.formal("x", real);
    let g = h.function("g", vec![x], real);
    let cast_fn = h.function("real_from_int", vec![], real);
    h.rules.register_cast(int, real, cast_fn);
    h.rules.mark_unresolved(cast_fn);

    let v = h.var("v", int);
    let mut info = h.call_site(g, vec![(v, None)]);
    let mut actual_formals = vec![x];

    let err = h.run(g, &mut info, &mut actual_formals).unwrap_err();
    match err {
        ResolveError::CastResolutionFailed { from, to, .. } => {
            assert_eq!(from, "int");
            assert_eq!(to, "real");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

// Callee h(x: int): int; call site h(A) with A an int array. The wrapper is
// an iterator yielding per-element results, with leader/follower variants
// and four fast-follower checks.
#[test]
fn promotion_over_an_array() {
    let mut h = Harness::new();
    let int = h.prog.types.builtins.int;
    let arr = h.prog.types.array(int);

    let x = h.formal("x", int);
    let f = h.function("h", vec![x], int);

    let a = h.var("A", arr);
    let mut info = h.call_site(f, vec![(a, None)]);
    let mut actual_formals = vec![x];

    let decls_before = h.prog.decls().len();
    let wrapper = h.run(f, &mut info, &mut actual_formals).unwrap();

    assert_ne!(wrapper, f);
    let wf = h.prog.func(wrapper);
    assert!(wf.flags.has(Flag::PromotionWrapper));
    assert!(wf.flags.has(Flag::IteratorFn));
    assert!(!wf.flags.has(Flag::Inline));
    let wname = h.prog.names.resolve(wf.cname);
    assert!(wname.starts_with("_promotion_wrap_"));

    // the wrapper formal carries the (ref-lifted) collection type
    let wrapper_formal = h.prog.func(wrapper).formals[0];
    let ref_arr = {
        let ty = h.prog.sym(wrapper_formal).ty;
        assert!(h.prog.types.is_ref(ty));
        h.prog.types.val_type(ty)
    };
    assert_eq!(ref_arr, arr);

    // serial body: one loop yielding the inner call per index
    let body = &h.prog.func(wrapper).body;
    assert_eq!(body.stmts.len(), 1);
    let (indices, zippered) = match &body.stmts[0] {
        Stmt::For {
            indices, zippered, ..
        } => (indices.clone(), *zippered),
        other => panic!("expected serial loop, got {:?}", other),
    };
    assert_eq!(indices.len(), 1);
    assert!(!zippered);

    // the loop body invokes the origin exactly once, on the index symbol
    let inner = h.calls_to(wrapper, f);
    assert_eq!(inner.len(), 1);
    match h.prog.call(inner[0]).actuals[0].expr {
        Expr::Sym(s) => assert_eq!(s, indices[0]),
        ref other => panic!("inner actual not fixed up: {:?}", other),
    }

    // leader and follower variants are registered and shaped
    let leader = h.prog.iterator_leader[&wrapper];
    let follower = h.prog.iterator_follower[&wrapper];
    assert!(h.prog.func(leader).flags.has(Flag::InlineIterator));
    assert!(h.prog.func(leader).flags.has(Flag::Generic));
    assert!(h.prog.func(leader).where_clause.is_some());
    assert_eq!(h.prog.func(leader).formals.len(), 2); // x + tag
    assert_eq!(h.prog.func(follower).formals.len(), 4); // x + tag + follow_this + fast
    assert!(h.prog.func(follower).where_clause.is_some());

    // the fast formal defaults to false
    let fast = h.prog.func(follower).formals[3];
    assert_eq!(h.prog.sym(fast).intent(), Intent::Param);

    // four fast-follower checks land at global scope
    let new_decls = &h.prog.decls()[decls_before..];
    let checks = new_decls
        .iter()
        .filter(|&&d| {
            let n = h.prog.names.resolve(h.prog.func(d).name);
            n == "_static_fast_follow_check" || n == "_dynamic_fast_follow_check"
        })
        .count();
    assert_eq!(checks, 4);

    // a second call site over the same collection type reuses the wrapper
    let b = h.var("B", arr);
    let mut info2 = h.call_site(f, vec![(b, None)]);
    let mut formals2 = vec![x];
    let w2 = h.run(f, &mut info2, &mut formals2).unwrap();
    assert_eq!(wrapper, w2);
}

// A void callee promotes to a parallel loop instead of an iterator.
#[test]
fn void_promotion_builds_a_parallel_loop() {
    let mut h = Harness::new();
    let int = h.prog.types.builtins.int;
    let void = h.prog.types.builtins.void;
    let arr = h.prog.types.array(int);

    let x = h.formal("x", int);
    let f = h.function("consume", vec![x], void);

    let a = h.var("A", arr);
    let mut info = h.call_site(f, vec![(a, None)]);
    let mut actual_formals = vec![x];

    let wrapper = h.run(f, &mut info, &mut actual_formals).unwrap();

    let body = &h.prog.func(wrapper).body;
    assert_eq!(body.stmts.len(), 1);
    assert!(matches!(body.stmts[0], Stmt::Forall { .. }));
    assert!(!h.prog.func(wrapper).flags.has(Flag::IteratorFn));
    assert!(!h.prog.iterator_leader.contains_key(&wrapper));
}

// Two collections promote in lockstep.
#[test]
fn zippered_promotion() {
    let mut h = Harness::new();
    let int = h.prog.types.builtins.int;
    let arr = h.prog.types.array(int);

    let x = h.formal("x", int);
    let y = h.formal("y", int);
    let f = h.function("add2", vec![x, y], int);

    let a = h.var("A", arr);
    let b = h.var("B", arr);
    let mut info = h.call_site(f, vec![(a, None), (b, None)]);
    let mut actual_formals = vec![x, y];

    let wrapper = h.run(f, &mut info, &mut actual_formals).unwrap();

    match &h.prog.func(wrapper).body.stmts[0] {
        Stmt::For {
            indices,
            iters,
            zippered,
            ..
        } => {
            assert_eq!(indices.len(), 2);
            assert_eq!(iters.len(), 2);
            assert!(*zippered);
        }
        other => panic!("expected zippered loop, got {:?}", other),
    }

    let inner = h.calls_to(wrapper, f);
    assert_eq!(inner.len(), 1);
    for actual in &h.prog.call(inner[0]).actuals {
        assert!(matches!(actual.expr, Expr::Sym(_)));
    }
}

// Record R { x: int = 5; y: int; }; call site constructs R(y = 7). The
// wrapper wires the defaulted field through an init-copy and sets the
// receiver's field even though the inner constructor sets it again.
#[test]
fn default_ctor_field_wiring_double_write() {
    let mut h = Harness::new();
    let int = h.prog.types.builtins.int;

    let x_name = h.prog.names.intern("x");
    let y_name = h.prog.names.intern("y");
    let r_name = h.prog.names.intern("R");
    let (_r_def, r_ty) = h.prog.types.declare(
        r_name,
        NominalKind::Record,
        vec![
            FieldDef { name: x_name, ty: int },
            FieldDef { name: y_name, ty: int },
        ],
        None,
        false,
    );

    let x = h.prog.new_formal(x_name, int, Intent::Blank);
    let five = h.prog.int_lit(5);
    h.prog
        .set_default_expr(x, Block::of(vec![Stmt::Expr(Expr::Sym(five))]));
    let y = h.prog.new_formal(y_name, int, Intent::Blank);

    let ctor = h.function("_construct_R", vec![x, y], r_ty);
    h.prog.func_mut(ctor).flags.add(Flag::Constructor);
    h.prog.func_mut(ctor).flags.add(Flag::DefaultConstructor);
    let this_name = h.prog.names.intern("this");
    let this = h.prog.new_var(this_name, r_ty);
    h.prog.func_mut(ctor).this_ = Some(this);

    let seven = h.prog.int_lit(7);
    let mut info = h.call_site(ctor, vec![(seven, Some(y_name))]);
    let mut actual_formals = vec![y];

    let wrapper = h.run(ctor, &mut info, &mut actual_formals).unwrap();
    assert_ne!(wrapper, ctor);

    // wrapper initializes the receiver's fields before the inner call
    let body = &h.prog.func(wrapper).body;
    assert!(body
        .stmts
        .iter()
        .any(|s| matches!(s, Stmt::Expr(Expr::Prim(Prim::InitFields, _)))));

    // both fields are set on the receiver ahead of the constructor call
    let mut set_fields = Vec::new();
    let mut set_values = Vec::new();
    for s in &body.stmts {
        if let Stmt::Expr(Expr::Prim(Prim::SetMember, args)) = s {
            let name_sym = match args[1] {
                Expr::Sym(s) => s,
                _ => panic!("member name is not a symbol"),
            };
            match h.prog.sym(name_sym).immediate() {
                Some(Immediate::CStr(text)) => set_fields.push(text.clone()),
                other => panic!("member name is not a c-string: {:?}", other),
            }
            match args[2] {
                Expr::Sym(v) => set_values.push(v),
                _ => panic!("member value is not a symbol"),
            }
        }
    }
    assert_eq!(set_fields, vec!["x".to_string(), "y".to_string()]);

    // the inner constructor receives the very symbols written to the
    // fields: the double-write shares one value per field
    let inner = h.calls_to(wrapper, ctor);
    assert_eq!(inner.len(), 1);
    let inner_actuals: Vec<SymId> = h
        .prog
        .call(inner[0])
        .actuals
        .iter()
        .map(|a| match a.expr {
            Expr::Sym(s) => s,
            _ => panic!("inner actual is not a symbol"),
        })
        .collect();
    assert_eq!(inner_actuals, set_values);

    // the defaulted field goes through an init-copy
    let has_init_copy = h.prog.collect_calls(wrapper).iter().any(|&c| {
        matches!(
            h.prog.call(c).callee,
            Callee::Unresolved(n) if h.prog.names.resolve(n) == "_init_copy"
        )
    });
    assert!(has_init_copy);
}

// Record S { a: [..] int; d: domain; }; the constructor's array formal
// carries a type expression. When the call supplies `a`, the wrapper
// evaluates the type expression into a typed temp, default-initializes it,
// and runs the user-visible assignment from the incoming formal so
// array/domain state is built properly. The omitted domain formal has no
// default, so its temp is default-initialized from its own type expression.
#[test]
fn default_ctor_type_expr_formals() {
    let mut h = Harness::new();
    let int = h.prog.types.builtins.int;
    let domain = h.prog.types.builtins.domain;
    let arr = h.prog.types.array(int);

    let a_name = h.prog.names.intern("a");
    let d_name = h.prog.names.intern("d");
    let s_name = h.prog.names.intern("S");
    let (_s_def, s_ty) = h.prog.types.declare(
        s_name,
        NominalKind::Record,
        vec![
            FieldDef { name: a_name, ty: arr },
            FieldDef { name: d_name, ty: domain },
        ],
        None,
        false,
    );

    let a = h.prog.new_formal(a_name, arr, Intent::Blank);
    h.prog
        .set_type_expr(a, Block::of(vec![Stmt::Expr(Expr::Type(arr))]));
    let d = h.prog.new_formal(d_name, domain, Intent::Blank);
    h.prog
        .set_type_expr(d, Block::of(vec![Stmt::Expr(Expr::Type(domain))]));

    let ctor = h.function("_construct_S", vec![a, d], s_ty);
    h.prog.func_mut(ctor).flags.add(Flag::Constructor);
    h.prog.func_mut(ctor).flags.add(Flag::DefaultConstructor);
    let this_name = h.prog.names.intern("this");
    let this = h.prog.new_var(this_name, s_ty);
    h.prog.func_mut(ctor).this_ = Some(this);

    let incoming = h.var("A", arr);
    let mut info = h.call_site(ctor, vec![(incoming, None)]);
    let mut actual_formals = vec![a];

    let wrapper = h.run(ctor, &mut info, &mut actual_formals).unwrap();
    assert_ne!(wrapper, ctor);

    let body = &h.prog.func(wrapper).body;

    // the supplied array formal gets a typed temp, destroyed with the
    // wrapper since `a` is an own field of S
    let type_temp = body
        .stmts
        .iter()
        .find_map(|s| match s {
            Stmt::Def(t) if h.prog.names.resolve(h.prog.sym(*t).name) == "wrap_type_arg" => {
                Some(*t)
            }
            _ => None,
        })
        .expect("wrap_type_arg temp");
    assert_eq!(h.prog.sym(type_temp).ty, arr);
    assert!(h.prog.sym(type_temp).flags.has(Flag::InsertAutoDestroy));

    // the temp is default-initialized from the evaluated type expression
    assert!(body.stmts.iter().any(|s| matches!(
        s,
        Stmt::Move { dst, src: Expr::Prim(Prim::Init, _) } if *dst == type_temp
    )));

    // then assigned from the incoming formal through the user-visible `=`
    let wf = h.prog.func(wrapper).formals[0];
    let assigned = h.prog.collect_calls(wrapper).iter().any(|&c| {
        let node = h.prog.call(c);
        matches!(node.callee, Callee::Unresolved(n) if h.prog.names.resolve(n) == "=")
            && matches!(node.actuals[0].expr, Expr::Sym(s) if s == type_temp)
            && matches!(node.actuals[1].expr, Expr::Sym(s) if s == wf)
    });
    assert!(assigned);

    // the omitted domain formal is computed from its own type expression
    let d_temp = body
        .stmts
        .iter()
        .find_map(|s| match s {
            Stmt::Def(t) if h.prog.names.resolve(h.prog.sym(*t).name) == "default_arg_d" => {
                Some(*t)
            }
            _ => None,
        })
        .expect("default_arg_d temp");
    assert_eq!(h.prog.sym(d_temp).ty, domain);
    assert!(body.stmts.iter().any(|s| matches!(
        s,
        Stmt::Move { dst, src: Expr::Prim(Prim::Init, _) } if *dst == d_temp
    )));

    // both formals still reach the inner constructor exactly once
    let inner = h.calls_to(wrapper, ctor);
    assert_eq!(inner.len(), 1);
    assert_eq!(h.prog.call(inner[0]).actuals.len(), 2);
}

// Callee c(s: c_string); the actual is a string literal. The literal is
// replaced in place; no cast is synthesized.
#[test]
fn string_literal_to_c_string_shortcut() {
    let mut h = Harness::new();
    let c_str = h.prog.types.builtins.c_str;

    let s = h.formal("s", c_str);
    let f = h.function("c", vec![s], c_str);

    let lit = h.prog.string_lit("hi");
    let mut info = h.call_site(f, vec![(lit, None)]);
    let mut actual_formals = vec![s];

    h.run(f, &mut info, &mut actual_formals).unwrap();

    let new_sym = info.actuals[0];
    assert_ne!(new_sym, lit);
    assert_eq!(h.prog.sym(new_sym).ty, c_str);
    assert!(matches!(
        h.prog.sym(new_sym).immediate(),
        Some(Immediate::CStr(text)) if text == "hi"
    ));

    // no cast temp, no extra statements in the caller
    assert_eq!(h.prog.func(info.caller).body.stmts.len(), 1);
}

// Callee p(x: int) with a param return kind: coercion stays out entirely.
#[test]
fn param_return_skips_rewrites() {
    let mut h = Harness::new();
    let int = h.prog.types.builtins.int;
    let uint = h.prog.types.builtins.uint;

    let x = h.formal("x", int);
    let p = h.function("p", vec![x], int);
    h.prog.func_mut(p).ret_kind = RetKind::Param;

    let v = h.var("v", uint);
    let mut info = h.call_site(p, vec![(v, None)]);
    let mut actual_formals = vec![x];

    let result = h.run(p, &mut info, &mut actual_formals).unwrap();
    assert_eq!(result, p);
    assert_eq!(info.actuals[0], v);
    assert_eq!(h.prog.func(info.caller).body.stmts.len(), 1);
}

// Running the pipeline over an already-wrapped call changes nothing.
#[test]
fn pipeline_is_a_no_op_on_a_wrapped_call() {
    let mut h = Harness::new();
    let int = h.prog.types.builtins.int;

    let a = h.formal("a", int);
    let b = h.formal_with_default("b", int, 10);
    let f = h.function("f", vec![a, b], int);

    let one = h.prog.int_lit(1);
    let mut info = h.call_site(f, vec![(one, None)]);
    let mut actual_formals = vec![a];
    let wrapper = h.run(f, &mut info, &mut actual_formals).unwrap();
    assert_ne!(wrapper, f);

    let decls = h.prog.decls().len();
    let caller_stmts = h.prog.func(info.caller).body.stmts.len();

    // second pass: the call is already positional, typed, and complete
    let result = h.run(wrapper, &mut info, &mut actual_formals).unwrap();
    assert_eq!(result, wrapper);
    assert_eq!(h.prog.decls().len(), decls);
    assert_eq!(h.prog.func(info.caller).body.stmts.len(), caller_stmts);
}
