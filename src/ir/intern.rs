// src/ir/intern.rs

use std::collections::HashMap;

/// Unique identifier for interned names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub u32);

/// Interns strings to unique Symbol IDs
#[derive(Debug, Default, Clone)]
pub struct Interner {
    map: HashMap<String, Symbol>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }

        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), sym);
        sym
    }

    /// Intern `prefix` + the resolved text of `base` as a single name.
    pub fn intern_with_prefix(&mut self, prefix: &str, base: Symbol) -> Symbol {
        let combined = format!("{}{}", prefix, self.resolve(base));
        self.intern(&combined)
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_symbol() {
        let mut interner = Interner::new();
        let s1 = interner.intern("hello");
        let s2 = interner.intern("hello");
        let s3 = interner.intern("world");

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
    }

    #[test]
    fn resolve_returns_original_string() {
        let mut interner = Interner::new();
        let sym = interner.intern("test");
        assert_eq!(interner.resolve(sym), "test");
    }

    #[test]
    fn intern_with_prefix_combines() {
        let mut interner = Interner::new();
        let base = interner.intern("double");
        let wrapped = interner.intern_with_prefix("_default_wrap_", base);
        assert_eq!(interner.resolve(wrapped), "_default_wrap_double");
    }
}
