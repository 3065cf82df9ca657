// src/sema/call_info.rs
//! The resolved call-site bundle handed to the wrapper pass.

use crate::ir::{CallId, Expr, FnId, Program, ScopeId, Span, SymId, Symbol};

/// Information about a call site after overload resolution: the call node,
/// its enclosing function, the visibility scope used as an instantiation
/// point, and the deduced actual symbols with their name labels.
///
/// `actuals` and `actual_names` mirror the call node's actual list; the
/// reorder stage keeps all three in sync.
#[derive(Debug, Clone)]
pub struct CallInfo {
    pub call: CallId,
    pub caller: FnId,
    pub scope: ScopeId,
    pub actuals: Vec<SymId>,
    pub actual_names: Vec<Option<Symbol>>,
    pub loc: Span,
}

impl CallInfo {
    /// Snapshot the actual symbols and labels off the call node. Call-site
    /// actuals are symbol references at this point in compilation.
    pub fn gather(prog: &Program, call: CallId, caller: FnId, scope: ScopeId) -> Option<Self> {
        let node = prog.call(call);
        let mut actuals = Vec::with_capacity(node.actuals.len());
        let mut actual_names = Vec::with_capacity(node.actuals.len());
        for actual in &node.actuals {
            match actual.expr {
                Expr::Sym(s) => {
                    actuals.push(s);
                    actual_names.push(actual.name);
                }
                _ => return None,
            }
        }
        Some(Self {
            call,
            caller,
            scope,
            actuals,
            actual_names,
            loc: node.loc,
        })
    }
}
