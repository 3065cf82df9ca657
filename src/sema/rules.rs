// src/sema/rules.rs
//
// Structural reference implementation of the Resolution seam: coercion by
// widening and wrapper-type stripping, dispatch by class parent chains,
// promotion by array element dispatch. A production driver supplies its own
// implementation; this one keeps the pass testable without a front end.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ir::{CallId, Callee, Expr, FnId, InternedType, Program, SymId, Symbol, TypeId};
use crate::sema::oracle::{CalleeStatus, Dispatch, Resolution};

#[derive(Default)]
pub struct RuleResolution {
    /// Cast functions by (source value type, target type).
    casts: FxHashMap<(TypeId, TypeId), FnId>,
    /// Named runtime routines resolvable during this phase.
    routines: FxHashMap<Symbol, FnId>,
    /// Functions that exist but failed to resolve; resolving a call to one
    /// of these reports failure.
    unresolved: FxHashSet<FnId>,
}

impl RuleResolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_cast(&mut self, src: TypeId, dst: TypeId, f: FnId) {
        self.casts.insert((src, dst), f);
    }

    pub fn register_routine(&mut self, name: Symbol, f: FnId) {
        self.routines.insert(name, f);
    }

    pub fn mark_unresolved(&mut self, f: FnId) {
        self.unresolved.insert(f);
    }

    fn widens(prog: &Program, src: TypeId, dst: TypeId) -> bool {
        let b = &prog.types.builtins;
        (src == b.int && dst == b.real)
            || (src == b.uint && dst == b.real)
            || (src == b.uint && dst == b.int)
            || (src == b.str_ && dst == b.c_str)
    }

    fn status_for(&self, f: FnId) -> CalleeStatus {
        if self.unresolved.contains(&f) {
            CalleeStatus::Failed(f)
        } else {
            CalleeStatus::Resolved(f)
        }
    }
}

impl Resolution for RuleResolution {
    fn can_coerce(
        &self,
        prog: &Program,
        src: TypeId,
        _src_sym: Option<SymId>,
        dst: TypeId,
        ctx: FnId,
    ) -> bool {
        if src == dst {
            return false;
        }
        if Self::widens(prog, src, dst) {
            return true;
        }
        // wrapper types coerce whenever their payload reaches the target
        match prog.types.get(src) {
            InternedType::Ref(inner) | InternedType::Sync(inner) | InternedType::Single(inner) => {
                let inner = *inner;
                inner == dst || self.can_coerce(prog, inner, None, dst, ctx)
            }
            _ => false,
        }
    }

    fn is_dispatch_parent(&self, prog: &Program, src: TypeId, dst: TypeId) -> bool {
        prog.types.has_dispatch_parent(src, dst)
    }

    fn can_dispatch(
        &self,
        prog: &Program,
        src: TypeId,
        src_sym: Option<SymId>,
        dst: TypeId,
        ctx: FnId,
    ) -> Dispatch {
        if src == dst
            || self.can_coerce(prog, src, src_sym, dst, ctx)
            || self.is_dispatch_parent(prog, src, dst)
        {
            return Dispatch {
                ok: true,
                promotes: false,
            };
        }
        if let Some(elem) = prog.types.element_type(src) {
            if elem == dst
                || self.can_coerce(prog, elem, None, dst, ctx)
                || self.is_dispatch_parent(prog, elem, dst)
            {
                return Dispatch {
                    ok: true,
                    promotes: true,
                };
            }
        }
        Dispatch::default()
    }

    fn resolve_formals(&mut self, _prog: &mut Program, _f: FnId) {}

    fn resolve_call(&mut self, _prog: &mut Program, _call: CallId) {}

    fn resolve_call_and_callee(
        &mut self,
        prog: &mut Program,
        call: CallId,
        _partial: bool,
    ) -> CalleeStatus {
        match prog.call(call).callee {
            Callee::Fn(f) => self.status_for(f),
            Callee::Unresolved(name) => {
                if prog.names.resolve(name) == "_cast" {
                    let node = prog.call(call);
                    let dst = match node.actuals.first().map(|a| &a.expr) {
                        Some(Expr::Type(t)) => *t,
                        _ => return CalleeStatus::NotFound,
                    };
                    let src = match node.actuals.get(1).map(|a| &a.expr) {
                        Some(Expr::Sym(s)) => prog.sym(*s).ty,
                        _ => return CalleeStatus::NotFound,
                    };
                    match self.casts.get(&(src, dst)) {
                        Some(&f) => {
                            prog.call_mut(call).callee = Callee::Fn(f);
                            self.status_for(f)
                        }
                        None => CalleeStatus::NotFound,
                    }
                } else {
                    match self.routines.get(&name) {
                        Some(&f) => {
                            prog.call_mut(call).callee = Callee::Fn(f);
                            self.status_for(f)
                        }
                        None => CalleeStatus::NotFound,
                    }
                }
            }
        }
    }

    fn normalize(&mut self, _prog: &mut Program, _f: FnId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Program;

    fn ctx_fn(prog: &mut Program) -> FnId {
        use crate::ir::{Block, FlagSet, FnDef, RetKind, Span};
        let name = prog.names.intern("ctx");
        prog.add_fn(FnDef {
            name,
            cname: name,
            formals: vec![],
            ret_type: prog.types.builtins.void,
            ret_kind: RetKind::Value,
            body: Block::new(),
            where_clause: None,
            flags: FlagSet::new(),
            throws: false,
            instantiation_point: None,
            this_: None,
            loc: Span::default(),
        })
    }

    #[test]
    fn widening_and_wrapper_stripping() {
        let mut prog = Program::new();
        let ctx = ctx_fn(&mut prog);
        let rules = RuleResolution::new();
        let int = prog.types.builtins.int;
        let real = prog.types.builtins.real;

        assert!(rules.can_coerce(&prog, int, None, real, ctx));
        assert!(!rules.can_coerce(&prog, real, None, int, ctx));

        let sync_int = prog.types.sync(int);
        let ref_sync_int = prog.types.make_ref(sync_int);
        assert!(rules.can_coerce(&prog, sync_int, None, int, ctx));
        assert!(rules.can_coerce(&prog, ref_sync_int, None, real, ctx));
    }

    #[test]
    fn array_elements_promote() {
        let mut prog = Program::new();
        let ctx = ctx_fn(&mut prog);
        let rules = RuleResolution::new();
        let int = prog.types.builtins.int;
        let real = prog.types.builtins.real;
        let arr = prog.types.array(int);

        let d = rules.can_dispatch(&prog, arr, None, int, ctx);
        assert!(d.ok && d.promotes);

        // widening applies per element too
        let d = rules.can_dispatch(&prog, arr, None, real, ctx);
        assert!(d.ok && d.promotes);

        let d = rules.can_dispatch(&prog, int, None, int, ctx);
        assert!(d.ok && !d.promotes);
    }

    #[test]
    fn cast_registry_resolves_and_fails() {
        use crate::ir::{Actual, Span};
        let mut prog = Program::new();
        let int = prog.types.builtins.int;
        let real = prog.types.builtins.real;

        let cast_fn = ctx_fn(&mut prog);
        let mut rules = RuleResolution::new();
        rules.register_cast(int, real, cast_fn);

        let v = prog.int_lit(1);
        let cast_name = prog.names.intern("_cast");
        let call = prog.new_call(
            Callee::Unresolved(cast_name),
            vec![
                Actual::positional(Expr::Type(real)),
                Actual::positional(Expr::Sym(v)),
            ],
            false,
            Span::default(),
        );

        assert_eq!(
            rules.resolve_call_and_callee(&mut prog, call, true),
            CalleeStatus::Resolved(cast_fn)
        );
        assert_eq!(prog.call(call).callee, Callee::Fn(cast_fn));

        rules.mark_unresolved(cast_fn);
        assert_eq!(
            rules.resolve_call_and_callee(&mut prog, call, true),
            CalleeStatus::Failed(cast_fn)
        );
    }
}
