// src/ir/program.rs
//
// The shared program arena: symbols, functions, and call nodes addressed by
// integer ids. Wrapper synthesis produces new nodes but never destroys
// existing ones; calls reference their callees by id, so a wrapper calling
// its origin introduces no true cycles.

use rustc_hash::FxHashMap;

use crate::ir::flags::{Flag, FlagSet};
use crate::ir::intern::{Interner, Symbol};
use crate::ir::span::Span;
use crate::ir::types::{TypeArena, TypeId};

/// Identity for a value symbol (variable or formal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymId(u32);

impl SymId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FnId(u32);

impl FnId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for a call node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(u32);

impl CallId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for a lexical scope, used as a generic instantiation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

/// Map from old symbols to their copies, threaded through deep copies.
pub type SymbolMap = FxHashMap<SymId, SymId>;

/// How a formal binds its actual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Blank,
    Const,
    In,
    Out,
    Inout,
    Ref,
    ConstRef,
    Param,
    Type,
}

impl Intent {
    /// Reference intents bind without copying; a `ref(T)` actual needs no
    /// coercion against them.
    pub fn is_ref(self) -> bool {
        matches!(self, Intent::Ref | Intent::ConstRef)
    }
}

/// Compile-time literal payload attached to a symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Immediate {
    Int(i64),
    Real(f64),
    Bool(bool),
    Str(String),
    CStr(String),
}

#[derive(Debug, Clone)]
pub enum SymKind {
    Var {
        immediate: Option<Immediate>,
    },
    Formal {
        intent: Intent,
        default_expr: Option<Block>,
        type_expr: Option<Block>,
    },
}

#[derive(Debug, Clone)]
pub struct SymDef {
    pub name: Symbol,
    pub ty: TypeId,
    pub flags: FlagSet,
    pub kind: SymKind,
}

impl SymDef {
    pub fn intent(&self) -> Intent {
        match &self.kind {
            SymKind::Formal { intent, .. } => *intent,
            SymKind::Var { .. } => Intent::Blank,
        }
    }

    pub fn is_immediate(&self) -> bool {
        matches!(&self.kind, SymKind::Var { immediate: Some(_) })
    }

    pub fn immediate(&self) -> Option<&Immediate> {
        match &self.kind {
            SymKind::Var { immediate } => immediate.as_ref(),
            SymKind::Formal { .. } => None,
        }
    }
}

/// What a return statement/function produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetKind {
    Value,
    Param,
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee {
    Fn(FnId),
    Unresolved(Symbol),
}

#[derive(Debug, Clone)]
pub struct Actual {
    pub name: Option<Symbol>,
    pub expr: Expr,
}

impl Actual {
    pub fn positional(expr: Expr) -> Self {
        Self { name: None, expr }
    }
}

#[derive(Debug, Clone)]
pub struct CallNode {
    pub callee: Callee,
    pub actuals: Vec<Actual>,
    /// Bracketed call syntax at the source site.
    pub square: bool,
    pub loc: Span,
}

/// Primitive operations emitted by the mid-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prim {
    AddrOf,
    Deref,
    /// Default-initialize from a type value
    Init,
    InitFields,
    SetMember,
    Alloc,
    SetCid,
    Typeof,
    /// Extract the field backing a promoted formal from an iterator record
    IterRecFieldValue,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Sym(SymId),
    Type(TypeId),
    /// A name to be bound later; promotion plants index names this way and
    /// resolves them against the generated loop.
    Unresolved(Symbol),
    Call(CallId),
    Prim(Prim, Vec<Expr>),
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Def(SymId),
    Move { dst: SymId, src: Expr },
    Expr(Expr),
    Return(Option<SymId>),
    Yield(SymId),
    For {
        indices: Vec<SymId>,
        iters: Vec<Expr>,
        body: Block,
        zippered: bool,
    },
    Forall {
        indices: Vec<SymId>,
        iters: Vec<Expr>,
        body: Block,
        zippered: bool,
    },
    Cond {
        cond: Expr,
        then_block: Block,
        else_block: Block,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }
}

#[derive(Debug, Clone)]
pub struct FnDef {
    pub name: Symbol,
    /// Mangled backend name; wrappers prefix the origin's.
    pub cname: Symbol,
    pub formals: Vec<SymId>,
    pub ret_type: TypeId,
    pub ret_kind: RetKind,
    pub body: Block,
    pub where_clause: Option<Expr>,
    pub flags: FlagSet,
    pub throws: bool,
    pub instantiation_point: Option<ScopeId>,
    /// Receiver for methods; a local for constructors.
    pub this_: Option<SymId>,
    pub loc: Span,
}

impl FnDef {
    pub fn is_iterator(&self) -> bool {
        self.flags.has(Flag::IteratorFn)
    }
}

/// The program arena. Owns the interner and type arena alongside the node
/// stores so passes take a single `&mut Program`.
pub struct Program {
    pub names: Interner,
    pub types: TypeArena,
    syms: Vec<SymDef>,
    fns: Vec<FnDef>,
    calls: Vec<CallNode>,
    /// Module-scope declaration order; wrappers are placed relative to
    /// their origin, parallel iterator variants at the tail.
    decls: Vec<FnId>,
    next_scope: u32,
    /// Promotion wrapper -> its leader/follower variants.
    pub iterator_leader: FxHashMap<FnId, FnId>,
    pub iterator_follower: FxHashMap<FnId, FnId>,
}

impl Program {
    pub fn new() -> Self {
        Self {
            names: Interner::new(),
            types: TypeArena::new(),
            syms: Vec::new(),
            fns: Vec::new(),
            calls: Vec::new(),
            decls: Vec::new(),
            next_scope: 0,
            iterator_leader: FxHashMap::default(),
            iterator_follower: FxHashMap::default(),
        }
    }

    // ===== Accessors =====

    pub fn sym(&self, id: SymId) -> &SymDef {
        &self.syms[id.0 as usize]
    }

    pub fn sym_mut(&mut self, id: SymId) -> &mut SymDef {
        &mut self.syms[id.0 as usize]
    }

    pub fn func(&self, id: FnId) -> &FnDef {
        &self.fns[id.0 as usize]
    }

    pub fn func_mut(&mut self, id: FnId) -> &mut FnDef {
        &mut self.fns[id.0 as usize]
    }

    pub fn call(&self, id: CallId) -> &CallNode {
        &self.calls[id.0 as usize]
    }

    pub fn call_mut(&mut self, id: CallId) -> &mut CallNode {
        &mut self.calls[id.0 as usize]
    }

    pub fn decls(&self) -> &[FnId] {
        &self.decls
    }

    pub fn new_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.next_scope);
        self.next_scope += 1;
        id
    }

    // ===== Symbol builders =====

    pub fn add_sym(&mut self, def: SymDef) -> SymId {
        let id = SymId(self.syms.len() as u32);
        self.syms.push(def);
        id
    }

    pub fn new_var(&mut self, name: Symbol, ty: TypeId) -> SymId {
        self.add_sym(SymDef {
            name,
            ty,
            flags: FlagSet::new(),
            kind: SymKind::Var { immediate: None },
        })
    }

    /// Compiler temporary; names may repeat, identity is the SymId.
    pub fn new_temp(&mut self, name: &str, ty: TypeId) -> SymId {
        let name = self.names.intern(name);
        self.new_var(name, ty)
    }

    pub fn new_formal(&mut self, name: Symbol, ty: TypeId, intent: Intent) -> SymId {
        self.add_sym(SymDef {
            name,
            ty,
            flags: FlagSet::new(),
            kind: SymKind::Formal {
                intent,
                default_expr: None,
                type_expr: None,
            },
        })
    }

    pub fn set_intent(&mut self, formal: SymId, new_intent: Intent) {
        if let SymKind::Formal { intent, .. } = &mut self.sym_mut(formal).kind {
            *intent = new_intent;
        }
    }

    pub fn set_default_expr(&mut self, formal: SymId, block: Block) {
        if let SymKind::Formal { default_expr, .. } = &mut self.sym_mut(formal).kind {
            *default_expr = Some(block);
        }
    }

    pub fn set_type_expr(&mut self, formal: SymId, block: Block) {
        if let SymKind::Formal { type_expr, .. } = &mut self.sym_mut(formal).kind {
            *type_expr = Some(block);
        }
    }

    /// A const c-string literal symbol, as produced for member names and the
    /// string-literal shortcut.
    pub fn cstring_lit(&mut self, s: &str) -> SymId {
        let name = self.names.intern(s);
        let ty = self.types.builtins.c_str;
        let id = self.add_sym(SymDef {
            name,
            ty,
            flags: FlagSet::new().with(Flag::Const),
            kind: SymKind::Var {
                immediate: Some(Immediate::CStr(s.to_string())),
            },
        });
        id
    }

    pub fn string_lit(&mut self, s: &str) -> SymId {
        let name = self.names.intern(s);
        let ty = self.types.builtins.str_;
        self.add_sym(SymDef {
            name,
            ty,
            flags: FlagSet::new().with(Flag::Const),
            kind: SymKind::Var {
                immediate: Some(Immediate::Str(s.to_string())),
            },
        })
    }

    pub fn int_lit(&mut self, v: i64) -> SymId {
        let name = self.names.intern(&v.to_string());
        let ty = self.types.builtins.int;
        self.add_sym(SymDef {
            name,
            ty,
            flags: FlagSet::new().with(Flag::Const),
            kind: SymKind::Var {
                immediate: Some(Immediate::Int(v)),
            },
        })
    }

    /// Clone a symbol definition into a fresh id.
    pub fn copy_sym(&mut self, id: SymId) -> SymId {
        let def = self.sym(id).clone();
        self.add_sym(def)
    }

    // ===== Function and call builders =====

    pub fn add_fn(&mut self, def: FnDef) -> FnId {
        let id = FnId(self.fns.len() as u32);
        self.fns.push(def);
        id
    }

    pub fn push_decl(&mut self, f: FnId) {
        self.decls.push(f);
    }

    pub fn insert_decl_after(&mut self, anchor: FnId, f: FnId) {
        match self.decls.iter().position(|&d| d == anchor) {
            Some(i) => self.decls.insert(i + 1, f),
            None => self.decls.push(f),
        }
    }

    pub fn insert_decl_before(&mut self, anchor: FnId, f: FnId) {
        match self.decls.iter().position(|&d| d == anchor) {
            Some(i) => self.decls.insert(i, f),
            None => self.decls.push(f),
        }
    }

    pub fn new_call(&mut self, callee: Callee, actuals: Vec<Actual>, square: bool, loc: Span) -> CallId {
        let id = CallId(self.calls.len() as u32);
        self.calls.push(CallNode {
            callee,
            actuals,
            square,
            loc,
        });
        id
    }

    /// Call expression with positional symbol actuals.
    pub fn call_expr(&mut self, callee: Callee, args: Vec<Expr>, loc: Span) -> Expr {
        let actuals = args.into_iter().map(Actual::positional).collect();
        Expr::Call(self.new_call(callee, actuals, false, loc))
    }

    // ===== Deep copy =====

    /// Deep-copy an expression, remapping symbols through `map` and
    /// allocating fresh call nodes.
    pub fn copy_expr(&mut self, expr: &Expr, map: &SymbolMap) -> Expr {
        match expr {
            Expr::Sym(s) => Expr::Sym(*map.get(s).unwrap_or(s)),
            Expr::Type(t) => Expr::Type(*t),
            Expr::Unresolved(n) => Expr::Unresolved(*n),
            Expr::Call(id) => {
                let node = self.call(*id).clone();
                let actuals = node
                    .actuals
                    .iter()
                    .map(|a| Actual {
                        name: a.name,
                        expr: self.copy_expr(&a.expr, map),
                    })
                    .collect();
                Expr::Call(self.new_call(node.callee, actuals, node.square, node.loc))
            }
            Expr::Prim(p, args) => {
                let args = args.iter().map(|a| self.copy_expr(a, map)).collect();
                Expr::Prim(*p, args)
            }
        }
    }

    fn copy_stmt(&mut self, stmt: &Stmt, map: &mut SymbolMap) -> Stmt {
        match stmt {
            Stmt::Def(s) => Stmt::Def(*map.get(s).unwrap_or(s)),
            Stmt::Move { dst, src } => Stmt::Move {
                dst: *map.get(dst).unwrap_or(dst),
                src: self.copy_expr(src, map),
            },
            Stmt::Expr(e) => Stmt::Expr(self.copy_expr(e, map)),
            Stmt::Return(s) => Stmt::Return(s.map(|s| *map.get(&s).unwrap_or(&s))),
            Stmt::Yield(s) => Stmt::Yield(*map.get(s).unwrap_or(s)),
            Stmt::For {
                indices,
                iters,
                body,
                zippered,
            } => {
                let indices = indices.iter().map(|s| *map.get(s).unwrap_or(s)).collect();
                let iters = iters.iter().map(|e| self.copy_expr(e, map)).collect();
                Stmt::For {
                    indices,
                    iters,
                    body: self.copy_block_inner(body, map),
                    zippered: *zippered,
                }
            }
            Stmt::Forall {
                indices,
                iters,
                body,
                zippered,
            } => {
                let indices = indices.iter().map(|s| *map.get(s).unwrap_or(s)).collect();
                let iters = iters.iter().map(|e| self.copy_expr(e, map)).collect();
                Stmt::Forall {
                    indices,
                    iters,
                    body: self.copy_block_inner(body, map),
                    zippered: *zippered,
                }
            }
            Stmt::Cond {
                cond,
                then_block,
                else_block,
            } => Stmt::Cond {
                cond: self.copy_expr(cond, map),
                then_block: self.copy_block_inner(then_block, map),
                else_block: self.copy_block_inner(else_block, map),
            },
        }
    }

    /// Collect symbols the block itself defines (defs and loop indices) so a
    /// copy gets fresh ids for them before any reference is rewritten.
    fn collect_defined(block: &Block, out: &mut Vec<SymId>) {
        for stmt in &block.stmts {
            match stmt {
                Stmt::Def(s) => out.push(*s),
                Stmt::For { indices, body, .. } | Stmt::Forall { indices, body, .. } => {
                    out.extend(indices.iter().copied());
                    Self::collect_defined(body, out);
                }
                Stmt::Cond {
                    then_block,
                    else_block,
                    ..
                } => {
                    Self::collect_defined(then_block, out);
                    Self::collect_defined(else_block, out);
                }
                _ => {}
            }
        }
    }

    fn copy_block_inner(&mut self, block: &Block, map: &mut SymbolMap) -> Block {
        let mut stmts = Vec::with_capacity(block.stmts.len());
        for stmt in &block.stmts {
            stmts.push(self.copy_stmt(stmt, map));
        }
        Block { stmts }
    }

    /// Deep-copy a block. Symbols the block defines are given fresh ids and
    /// recorded in `map`; free references are remapped through `map` when
    /// present and kept otherwise.
    pub fn copy_block(&mut self, block: &Block, map: &mut SymbolMap) -> Block {
        let block = block.clone();
        let mut defined = Vec::new();
        Self::collect_defined(&block, &mut defined);
        for sym in defined {
            if !map.contains_key(&sym) {
                let copy = self.copy_sym(sym);
                map.insert(sym, copy);
            }
        }
        self.copy_block_inner(&block, map)
    }

    /// Deep-copy a function: fresh formals, receiver, body, and where
    /// clause, with the old-to-new symbol map returned for the caller to
    /// propagate param bindings. The copy is not added to declaration order.
    pub fn copy_fn(&mut self, f: FnId) -> (FnId, SymbolMap) {
        let src = self.func(f).clone();
        let mut map = SymbolMap::default();

        let formals = src
            .formals
            .iter()
            .map(|&old| {
                let new = self.copy_sym(old);
                map.insert(old, new);
                new
            })
            .collect::<Vec<_>>();

        let this_ = src.this_.map(|old| match map.get(&old) {
            Some(&new) => new,
            None => {
                let new = self.copy_sym(old);
                map.insert(old, new);
                new
            }
        });

        let body = self.copy_block(&src.body, &mut map);
        let where_clause = src
            .where_clause
            .as_ref()
            .map(|w| self.copy_expr(&w.clone(), &map));

        let def = FnDef {
            name: src.name,
            cname: src.cname,
            formals,
            ret_type: src.ret_type,
            ret_kind: src.ret_kind,
            body,
            where_clause,
            flags: src.flags,
            throws: src.throws,
            instantiation_point: src.instantiation_point,
            this_,
            loc: src.loc,
        };
        (self.add_fn(def), map)
    }

    // ===== Symbol substitution =====

    fn update_expr(expr: &mut Expr, calls: &mut [CallNode], map: &SymbolMap) {
        match expr {
            Expr::Sym(s) => {
                if let Some(&new) = map.get(s) {
                    *s = new;
                }
            }
            Expr::Call(id) => {
                let mut actuals = std::mem::take(&mut calls[id.index() as usize].actuals);
                for a in &mut actuals {
                    Self::update_expr(&mut a.expr, calls, map);
                }
                calls[id.index() as usize].actuals = actuals;
            }
            Expr::Prim(_, args) => {
                for a in args {
                    Self::update_expr(a, calls, map);
                }
            }
            Expr::Type(_) | Expr::Unresolved(_) => {}
        }
    }

    fn update_block(block: &mut Block, calls: &mut [CallNode], map: &SymbolMap) {
        for stmt in &mut block.stmts {
            match stmt {
                Stmt::Def(s) | Stmt::Yield(s) => {
                    if let Some(&new) = map.get(s) {
                        *s = new;
                    }
                }
                Stmt::Move { dst, src } => {
                    if let Some(&new) = map.get(dst) {
                        *dst = new;
                    }
                    Self::update_expr(src, calls, map);
                }
                Stmt::Expr(e) => Self::update_expr(e, calls, map),
                Stmt::Return(s) => {
                    if let Some(sym) = s {
                        if let Some(&new) = map.get(sym) {
                            *sym = new;
                        }
                    }
                }
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
                    for s in indices {
                        if let Some(&new) = map.get(s) {
                            *s = new;
                        }
                    }
                    for e in iters {
                        Self::update_expr(e, calls, map);
                    }
                    Self::update_block(body, calls, map);
                }
                Stmt::Cond {
                    cond,
                    then_block,
                    else_block,
                } => {
                    Self::update_expr(cond, calls, map);
                    Self::update_block(then_block, calls, map);
                    Self::update_block(else_block, calls, map);
                }
            }
        }
    }

    /// Rewrite every symbol reference in `f`'s body through `map`.
    pub fn update_symbols(&mut self, f: FnId, map: &SymbolMap) {
        let mut body = std::mem::take(&mut self.fns[f.0 as usize].body);
        Self::update_block(&mut body, &mut self.calls, map);
        self.fns[f.0 as usize].body = body;
    }

    // ===== Call discovery and statement surgery =====

    fn expr_calls(calls: &[CallNode], expr: &Expr, out: &mut Vec<CallId>) {
        match expr {
            Expr::Call(id) => {
                out.push(*id);
                for a in &calls[id.index() as usize].actuals {
                    Self::expr_calls(calls, &a.expr, out);
                }
            }
            Expr::Prim(_, args) => {
                for a in args {
                    Self::expr_calls(calls, a, out);
                }
            }
            _ => {}
        }
    }

    fn block_calls(calls: &[CallNode], block: &Block, out: &mut Vec<CallId>) {
        for stmt in &block.stmts {
            match stmt {
                Stmt::Move { src, .. } => Self::expr_calls(calls, src, out),
                Stmt::Expr(e) => Self::expr_calls(calls, e, out),
                Stmt::For { iters, body, .. } | Stmt::Forall { iters, body, .. } => {
                    for e in iters {
                        Self::expr_calls(calls, e, out);
                    }
                    Self::block_calls(calls, body, out);
                }
                Stmt::Cond {
                    cond,
                    then_block,
                    else_block,
                } => {
                    Self::expr_calls(calls, cond, out);
                    Self::block_calls(calls, then_block, out);
                    Self::block_calls(calls, else_block, out);
                }
                _ => {}
            }
        }
    }

    /// All call nodes reachable from `f`'s body, outermost first.
    pub fn collect_calls(&self, f: FnId) -> Vec<CallId> {
        let mut out = Vec::new();
        Self::block_calls(&self.calls, &self.func(f).body, &mut out);
        out
    }

    fn expr_contains(calls: &[CallNode], expr: &Expr, target: CallId) -> bool {
        match expr {
            Expr::Call(id) => {
                *id == target
                    || calls[id.index() as usize]
                        .actuals
                        .iter()
                        .any(|a| Self::expr_contains(calls, &a.expr, target))
            }
            Expr::Prim(_, args) => args.iter().any(|a| Self::expr_contains(calls, a, target)),
            _ => false,
        }
    }

    fn stmt_contains(calls: &[CallNode], stmt: &Stmt, target: CallId) -> bool {
        match stmt {
            Stmt::Move { src, .. } => Self::expr_contains(calls, src, target),
            Stmt::Expr(e) => Self::expr_contains(calls, e, target),
            Stmt::For { iters, body, .. } | Stmt::Forall { iters, body, .. } => {
                iters.iter().any(|e| Self::expr_contains(calls, e, target))
                    || body
                        .stmts
                        .iter()
                        .any(|s| Self::stmt_contains(calls, s, target))
            }
            Stmt::Cond {
                cond,
                then_block,
                else_block,
            } => {
                Self::expr_contains(calls, cond, target)
                    || then_block
                        .stmts
                        .iter()
                        .any(|s| Self::stmt_contains(calls, s, target))
                    || else_block
                        .stmts
                        .iter()
                        .any(|s| Self::stmt_contains(calls, s, target))
            }
            _ => false,
        }
    }

    fn insert_in_block(
        calls: &[CallNode],
        block: &mut Block,
        target: CallId,
        stmts: &mut Option<Vec<Stmt>>,
    ) {
        let mut at = None;
        for (i, stmt) in block.stmts.iter().enumerate() {
            if Self::stmt_contains(calls, stmt, target) {
                at = Some(i);
                break;
            }
        }
        if let Some(i) = at {
            // Recurse first: the containing statement may be a loop or cond
            // whose inner block holds the call.
            match &mut block.stmts[i] {
                Stmt::For { body, .. } | Stmt::Forall { body, .. } => {
                    Self::insert_in_block(calls, body, target, stmts);
                }
                Stmt::Cond {
                    then_block,
                    else_block,
                    ..
                } => {
                    Self::insert_in_block(calls, then_block, target, stmts);
                    Self::insert_in_block(calls, else_block, target, stmts);
                }
                _ => {}
            }
            if let Some(new) = stmts.take() {
                block.stmts.splice(i..i, new);
            }
        }
    }

    /// Insert `stmts` immediately before the statement of `caller` that
    /// contains `call`. Returns false when the call is not in the body.
    pub fn insert_before_call(&mut self, caller: FnId, call: CallId, stmts: Vec<Stmt>) -> bool {
        let mut body = std::mem::take(&mut self.fns[caller.0 as usize].body);
        let mut pending = Some(stmts);
        Self::insert_in_block(&self.calls, &mut body, call, &mut pending);
        let inserted = pending.is_none();
        self.fns[caller.0 as usize].body = body;
        inserted
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}
