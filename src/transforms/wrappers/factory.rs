// src/transforms/wrappers/factory.rs
//! Empty-wrapper construction and formal cloning.

use crate::ir::{Block, Flag, FlagSet, FnDef, FnId, Intent, Program, RetKind, SymId};
use crate::sema::CallInfo;

/// Flags a wrapper inherits verbatim from its origin.
const INHERITED: &[Flag] = &[
    Flag::InitCopyFn,
    Flag::AutoCopyFn,
    Flag::AutoDestroyFn,
    Flag::DonorFn,
    Flag::NoParens,
    Flag::Constructor,
    Flag::FieldAccessor,
    Flag::RefToConst,
    Flag::Method,
    Flag::MethodPrimary,
    Flag::Assignop,
    Flag::DefaultConstructor,
    Flag::LastResort,
];

/// Build an empty wrapper shell for `fn_`. The caller sets the mangled name
/// and fills in formals and body.
pub(super) fn build_empty_wrapper(prog: &mut Program, fn_: FnId, info: &CallInfo) -> FnId {
    let origin = prog.func(fn_);
    let origin_flags = origin.flags;
    let name = origin.name;
    let ret_kind = if origin.is_iterator() {
        RetKind::Value
    } else {
        origin.ret_kind
    };
    let throws = origin.throws;

    let mut flags = FlagSet::new()
        .with(Flag::Wrapper)
        .with(Flag::InvisibleFn)
        .with(Flag::Inline);

    for &flag in INHERITED {
        flags.inherit(origin_flags, flag);
    }

    if origin_flags.has(Flag::CompilerGenerated) {
        flags.add(Flag::WasCompilerGenerated);
    }
    flags.add(Flag::CompilerGenerated);

    let void = prog.types.builtins.void;
    prog.add_fn(FnDef {
        name,
        cname: name,
        formals: Vec::new(),
        ret_type: void,
        ret_kind,
        body: Block::new(),
        where_clause: None,
        flags,
        throws,
        instantiation_point: Some(info.scope),
        this_: None,
        loc: info.loc,
    })
}

/// Copy a formal for placement on a wrapper, flattening intent.
///
/// A written-back formal (out/inout) is flagged so the innermost call keeps
/// the writeback; the wrapper's own caller must not observe it twice.
/// Reference intents survive; everything else becomes blank.
pub(super) fn copy_formal_for_wrapper(prog: &mut Program, formal: SymId) -> SymId {
    let copy = prog.copy_sym(formal);
    let intent = prog.sym(formal).intent();

    if matches!(intent, Intent::Out | Intent::Inout)
        || prog.sym(formal).flags.has(Flag::WrapWrittenFormal)
    {
        prog.sym_mut(copy).flags.add(Flag::WrapWrittenFormal);
    }

    if !matches!(intent, Intent::Ref | Intent::ConstRef) {
        prog.set_intent(copy, Intent::Blank);
    }

    copy
}
