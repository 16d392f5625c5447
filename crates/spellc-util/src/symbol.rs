//! String interning for identifiers, string literals, and type names.
//!
//! A [`Symbol`] is a 4-byte handle into a process-global string table.
//! Comparing two symbols is an integer comparison rather than a string
//! comparison, which matters because identifiers and type names flow
//! through every stage of the pipeline (lexer → parser → checker →
//! emitter) and are looked up repeatedly in the symbol table and the
//! custom-type registry.
//!
//! The compiler is documented as single-threaded and synchronous, so the table is guarded by a plain [`std::sync::RwLock`]
//! rather than a lock-free structure — there is no concurrent interning
//! to optimize for, only simplicity.

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// An interned string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Intern `s`, returning the symbol for it. Repeated interning of an
    /// equal string returns the same `Symbol`.
    pub fn intern(s: &str) -> Self {
        StringTable::with(|t| t.intern(s))
    }

    /// The original string this symbol was interned from.
    pub fn as_str(&self) -> &'static str {
        StringTable::with(|t| t.get(*self))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct StringTable {
    inner: RwLock<TableInner>,
}

struct TableInner {
    strings: Vec<&'static str>,
    index: FxHashMap<&'static str, u32>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            inner: RwLock::new(TableInner {
                strings: Vec::new(),
                index: FxHashMap::default(),
            }),
        }
    }

    fn with<R>(f: impl FnOnce(&StringTable) -> R) -> R {
        static TABLE: OnceLock<StringTable> = OnceLock::new();
        f(TABLE.get_or_init(StringTable::new))
    }

    fn intern(&self, s: &str) -> Symbol {
        if let Some(&idx) = self.inner.read().unwrap().index.get(s) {
            return Symbol(idx);
        }
        let mut inner = self.inner.write().unwrap();
        // Another writer may have interned the same string while we waited
        // for the write lock.
        if let Some(&idx) = inner.index.get(s) {
            return Symbol(idx);
        }
        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        let idx = inner.strings.len() as u32;
        inner.strings.push(leaked);
        inner.index.insert(leaked, idx);
        Symbol(idx)
    }

    fn get(&self, sym: Symbol) -> &'static str {
        self.inner.read().unwrap().strings[sym.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let a = Symbol::intern("spell");
        let b = Symbol::intern("spell");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_get_distinct_symbols() {
        let a = Symbol::intern("Spell");
        let b = Symbol::intern("spell");
        assert_ne!(a, b);
    }

    #[test]
    fn round_trips_through_as_str() {
        let sym = Symbol::intern("casting");
        assert_eq!(sym.as_str(), "casting");
    }
}
