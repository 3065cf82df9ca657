// src/transforms/wrappers/caches.rs
//! Process-wide wrapper caches.
//!
//! A default wrapper is determined by its origin and the set of omitted
//! formals; a promotion wrapper by its origin and the formal-to-collection
//! substitution. Keys are order-insensitive, so they are sorted before
//! hashing. A hit returns a wrapper with identical observable behavior.

use rustc_hash::FxHashMap;

use crate::ir::{FnId, SymId, TypeId};

#[derive(Default)]
pub struct WrapperCaches {
    defaults: FxHashMap<(FnId, Vec<SymId>), FnId>,
    promotions: FxHashMap<(FnId, Vec<(SymId, TypeId)>), FnId>,
}

impl WrapperCaches {
    pub fn new() -> Self {
        Self::default()
    }

    fn defaults_key(fn_: FnId, omitted: &[SymId]) -> (FnId, Vec<SymId>) {
        let mut key = omitted.to_vec();
        key.sort_unstable();
        (fn_, key)
    }

    fn promotions_key(fn_: FnId, subs: &[(SymId, TypeId)]) -> (FnId, Vec<(SymId, TypeId)>) {
        let mut key = subs.to_vec();
        key.sort_unstable();
        (fn_, key)
    }

    pub fn defaults_get(&self, fn_: FnId, omitted: &[SymId]) -> Option<FnId> {
        self.defaults.get(&Self::defaults_key(fn_, omitted)).copied()
    }

    pub fn defaults_add(&mut self, fn_: FnId, omitted: &[SymId], wrapper: FnId) {
        self.defaults.insert(Self::defaults_key(fn_, omitted), wrapper);
    }

    pub fn promotions_get(&self, fn_: FnId, subs: &[(SymId, TypeId)]) -> Option<FnId> {
        self.promotions
            .get(&Self::promotions_key(fn_, subs))
            .copied()
    }

    pub fn promotions_add(&mut self, fn_: FnId, subs: &[(SymId, TypeId)], wrapper: FnId) {
        self.promotions
            .insert(Self::promotions_key(fn_, subs), wrapper);
    }
}
