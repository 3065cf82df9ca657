// src/ir/flags.rs
//! Flag tags and per-symbol flag sets.
//!
//! Every symbol and function carries a small bitset of semantic flags. The
//! wrapper pass inherits a defined subset of these from the origin function,
//! so the tags are a closed enumeration rather than ad-hoc booleans.

/// Semantic flag tags for symbols and functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Flag {
    // function identity
    Wrapper,
    InvisibleFn,
    Inline,
    CompilerGenerated,
    WasCompilerGenerated,
    PromotionWrapper,
    Constructor,
    DefaultConstructor,
    TypeConstructor,
    IteratorFn,
    InlineIterator,
    Generic,
    Resolved,
    Extern,

    // function roles inherited onto wrappers
    InitCopyFn,
    AutoCopyFn,
    AutoDestroyFn,
    DonorFn,
    NoParens,
    FieldAccessor,
    RefToConst,
    Method,
    MethodPrimary,
    Assignop,
    LastResort,

    // value symbols
    TypeVariable,
    MaybeParam,
    MaybeType,
    ExprTemp,
    CoerceTemp,
    Const,
    InsertAutoDestroy,
    ArgThis,
    RefForConstFieldOfThis,
    WrapWrittenFormal,
    IsMeme,
}

/// Bitset over `Flag`. Fits in a u64; `Flag` has well under 64 tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagSet(u64);

impl FlagSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn add(&mut self, flag: Flag) {
        self.0 |= 1u64 << flag as u8;
    }

    pub fn remove(&mut self, flag: Flag) {
        self.0 &= !(1u64 << flag as u8);
    }

    pub fn has(&self, flag: Flag) -> bool {
        self.0 & (1u64 << flag as u8) != 0
    }

    pub fn with(mut self, flag: Flag) -> Self {
        self.add(flag);
        self
    }

    /// Copy `flag` from `other` if `other` has it set.
    pub fn inherit(&mut self, other: FlagSet, flag: Flag) {
        if other.has(flag) {
            self.add(flag);
        }
    }
}
