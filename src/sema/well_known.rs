// src/sema/well_known.rs
//
// Cached identifiers for well-known runtime symbols and routines.
// These are installed once per program and cached for fast comparison.

use crate::ir::{Flag, FlagSet, Immediate, Program, SymDef, SymId, SymKind, Symbol};

/// Well-known symbols the wrapper pass plants in generated code: method and
/// iteration tokens, plus the interned names of the runtime routines that
/// synthesized wrappers call.
#[derive(Debug, Clone)]
pub struct Builtins {
    // token symbols
    pub method_token: SymId,
    pub leader_tag: SymId,
    pub follower_tag: SymId,
    pub false_: SymId,
    pub type_default_token: SymId,

    // operator and routine names
    pub assign: Symbol,
    pub eq: Symbol,
    pub cast: Symbol,
    pub init_copy: Symbol,
    pub auto_copy: Symbol,
    pub create_field_default: Symbol,
    pub read_full_empty: Symbol,
    pub read_full_full: Symbol,
    pub to_leader: Symbol,
    pub to_leader_zip: Symbol,
    pub to_follower: Symbol,
    pub to_follower_zip: Symbol,
    pub to_fast_follower: Symbol,
    pub to_fast_follower_zip: Symbol,
    pub build_tuple: Symbol,
    pub build_tuple_always_allow_ref: Symbol,
    pub static_fast_follow_check: Symbol,
    pub static_fast_follow_check_zip: Symbol,
    pub dynamic_fast_follow_check: Symbol,
    pub dynamic_fast_follow_check_zip: Symbol,
    pub tuple_construct: Symbol,

    // formal names on generated iterator variants
    pub tag: Symbol,
    pub follow_this: Symbol,
    pub fast: Symbol,
}

impl Builtins {
    /// Install the token symbols into `prog` and intern the routine names.
    pub fn install(prog: &mut Program) -> Self {
        let method_token_ty = prog.types.builtins.method_token;
        let iter_kind = prog.types.builtins.iter_kind;
        let bool_ = prog.types.builtins.bool_;
        let type_default_ty = prog.types.builtins.type_default_token;

        let mt_name = prog.names.intern("_method_token");
        let method_token = prog.add_sym(SymDef {
            name: mt_name,
            ty: method_token_ty,
            flags: FlagSet::new().with(Flag::Const),
            kind: SymKind::Var { immediate: None },
        });

        let lt_name = prog.names.intern("_leader_tag");
        let leader_tag = prog.add_sym(SymDef {
            name: lt_name,
            ty: iter_kind,
            flags: FlagSet::new().with(Flag::Const),
            kind: SymKind::Var { immediate: None },
        });

        let ft_name = prog.names.intern("_follower_tag");
        let follower_tag = prog.add_sym(SymDef {
            name: ft_name,
            ty: iter_kind,
            flags: FlagSet::new().with(Flag::Const),
            kind: SymKind::Var { immediate: None },
        });

        let false_name = prog.names.intern("false");
        let false_ = prog.add_sym(SymDef {
            name: false_name,
            ty: bool_,
            flags: FlagSet::new().with(Flag::Const),
            kind: SymKind::Var {
                immediate: Some(Immediate::Bool(false)),
            },
        });

        let tdt_name = prog.names.intern("_type_default");
        let type_default_token = prog.add_sym(SymDef {
            name: tdt_name,
            ty: type_default_ty,
            flags: FlagSet::new().with(Flag::Const),
            kind: SymKind::Var { immediate: None },
        });

        Self {
            method_token,
            leader_tag,
            follower_tag,
            false_,
            type_default_token,
            assign: prog.names.intern("="),
            eq: prog.names.intern("=="),
            cast: prog.names.intern("_cast"),
            init_copy: prog.names.intern("_init_copy"),
            auto_copy: prog.names.intern("_auto_copy"),
            create_field_default: prog.names.intern("_create_field_default"),
            read_full_empty: prog.names.intern("_read_full_empty"),
            read_full_full: prog.names.intern("_read_full_full"),
            to_leader: prog.names.intern("_to_leader"),
            to_leader_zip: prog.names.intern("_to_leader_zip"),
            to_follower: prog.names.intern("_to_follower"),
            to_follower_zip: prog.names.intern("_to_follower_zip"),
            to_fast_follower: prog.names.intern("_to_fast_follower"),
            to_fast_follower_zip: prog.names.intern("_to_fast_follower_zip"),
            build_tuple: prog.names.intern("_build_tuple"),
            build_tuple_always_allow_ref: prog.names.intern("_build_tuple_always_allow_ref"),
            static_fast_follow_check: prog.names.intern("_static_fast_follow_check"),
            static_fast_follow_check_zip: prog.names.intern("_static_fast_follow_check_zip"),
            dynamic_fast_follow_check: prog.names.intern("_dynamic_fast_follow_check"),
            dynamic_fast_follow_check_zip: prog.names.intern("_dynamic_fast_follow_check_zip"),
            tuple_construct: prog.names.intern("_construct_tuple"),
            tag: prog.names.intern("tag"),
            follow_this: prog.names.intern("follow_this"),
            fast: prog.names.intern("fast"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_typed() {
        let mut prog = Program::new();
        let builtins = Builtins::install(&mut prog);

        assert_eq!(
            prog.sym(builtins.leader_tag).ty,
            prog.types.builtins.iter_kind
        );
        assert_eq!(
            prog.sym(builtins.method_token).ty,
            prog.types.builtins.method_token
        );
        assert!(matches!(
            prog.sym(builtins.false_).immediate(),
            Some(Immediate::Bool(false))
        ));
    }
}
