// src/sema/oracle.rs
//! The resolution seam the wrapper pass queries.
//!
//! The pass decides *where* a rewrite is needed; whether a coercion is legal
//! and how calls resolve is delegated through this trait. No dispatch table
//! is hard-coded in the pass.

use crate::ir::{CallId, FnId, Program, SymId, TypeId};

/// Result of a dispatch query. `promotes` reports that the source is a
/// collection whose elements dispatch to the target scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    pub ok: bool,
    pub promotes: bool,
}

/// Outcome of resolving a call and its callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalleeStatus {
    /// No target function is visible; the call is left for later folding.
    NotFound,
    /// The callee resolved successfully.
    Resolved(FnId),
    /// A target function exists but did not itself resolve.
    Failed(FnId),
}

pub trait Resolution {
    /// May a value of `src` (optionally a known symbol) coerce to `dst` in
    /// the context of calling `ctx`?
    fn can_coerce(
        &self,
        prog: &Program,
        src: TypeId,
        src_sym: Option<SymId>,
        dst: TypeId,
        ctx: FnId,
    ) -> bool;

    /// Is `dst` an ancestor of `src` in the dispatch hierarchy?
    fn is_dispatch_parent(&self, prog: &Program, src: TypeId, dst: TypeId) -> bool;

    /// Would an actual of `src` dispatch to a formal of `dst`, possibly by
    /// promoting over a collection?
    fn can_dispatch(
        &self,
        prog: &Program,
        src: TypeId,
        src_sym: Option<SymId>,
        dst: TypeId,
        ctx: FnId,
    ) -> Dispatch;

    /// Resolve the formal types of a freshly built function.
    fn resolve_formals(&mut self, prog: &mut Program, f: FnId);

    /// Resolve a generated call in place.
    fn resolve_call(&mut self, prog: &mut Program, call: CallId);

    /// Resolve a generated call and its callee. `partial` permits leaving
    /// the call unresolved when no target is visible yet.
    fn resolve_call_and_callee(
        &mut self,
        prog: &mut Program,
        call: CallId,
        partial: bool,
    ) -> CalleeStatus;

    /// Run the normalization pass over a freshly built function.
    fn normalize(&mut self, prog: &mut Program, f: FnId);
}
