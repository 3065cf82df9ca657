// src/ir/mod.rs
pub mod flags;
pub mod intern;
pub mod program;
pub mod span;
pub mod types;

pub use flags::{Flag, FlagSet};
pub use intern::{Interner, Symbol};
pub use program::{
    Actual, Block, CallId, CallNode, Callee, Expr, FnDef, FnId, Immediate, Intent, Prim, Program,
    RetKind, ScopeId, Stmt, SymDef, SymId, SymKind, SymbolMap,
};
pub use span::Span;
pub use types::{
    BuiltinTypes, FieldDef, InternedType, NominalKind, PrimitiveType, TypeArena, TypeDef,
    TypeDefId, TypeId, TypeIdVec,
};
