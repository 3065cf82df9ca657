// src/sema/intents.rs
//
// Intent folding rules. Blank and const intents are declaration-time
// placeholders; the concrete binding depends on the formal's type.

use crate::ir::{Intent, SymDef, TypeArena, TypeId};

/// The concrete intent a blank-intent formal of type `ty` binds with:
/// aggregates fold to const-ref, scalars to in.
pub fn blank_intent_for_type(types: &TypeArena, ty: TypeId) -> Intent {
    if types.is_aggregate(types.val_type(ty)) {
        Intent::ConstRef
    } else {
        Intent::In
    }
}

/// Fold a declared intent to its concrete form for a formal of type `ty`.
pub fn concrete_intent(types: &TypeArena, intent: Intent, ty: TypeId) -> Intent {
    match intent {
        Intent::Blank => blank_intent_for_type(types, ty),
        Intent::Const => match blank_intent_for_type(types, ty) {
            Intent::ConstRef => Intent::ConstRef,
            _ => Intent::In,
        },
        other => other,
    }
}

/// Concrete intent of a formal. Iterator-record formals keep their declared
/// intent; folding them would force a copy the lowering cannot honor.
pub fn concrete_intent_for_arg(types: &TypeArena, formal: &SymDef) -> Intent {
    let intent = formal.intent();
    if matches!(intent, Intent::Blank | Intent::Const) && !types.is_iterator_record(formal.ty) {
        concrete_intent(types, intent, formal.ty)
    } else {
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FlagSet, Program, SymKind};

    #[test]
    fn blank_intent_folds_by_type() {
        let mut prog = Program::new();
        let int = prog.types.builtins.int;
        let arr = prog.types.array(int);

        assert_eq!(blank_intent_for_type(&prog.types, int), Intent::In);
        assert_eq!(blank_intent_for_type(&prog.types, arr), Intent::ConstRef);
        assert_eq!(
            blank_intent_for_type(&prog.types, prog.types.builtins.str_),
            Intent::ConstRef
        );
    }

    #[test]
    fn iterator_record_formals_keep_declared_intent() {
        let prog = Program::new();
        let name = crate::ir::Symbol(0);
        let formal = SymDef {
            name,
            ty: prog.types.builtins.iterator_record,
            flags: FlagSet::new(),
            kind: SymKind::Formal {
                intent: Intent::Blank,
                default_expr: None,
                type_expr: None,
            },
        };
        assert_eq!(concrete_intent_for_arg(&prog.types, &formal), Intent::Blank);
    }

    #[test]
    fn explicit_intents_pass_through() {
        let prog = Program::new();
        let int = prog.types.builtins.int;
        assert_eq!(concrete_intent(&prog.types, Intent::Inout, int), Intent::Inout);
        assert_eq!(concrete_intent(&prog.types, Intent::Ref, int), Intent::Ref);
    }
}
