use rustc_hash::FxHashMap;
use spellc_util::Symbol;

use crate::types::Type;

/// Scope stack for the type checker. Lookup walks from the innermost scope outward; push/pop is
/// bracketed around function, arrow, and for-body traversals.
pub struct SymbolTable {
    scopes: Vec<FxHashMap<Symbol, Type>>,
}

impl SymbolTable {
    /// `seed` becomes the bottom scope — host context types passed to the
    /// façade's `Compiler::new` live here for the lifetime of the checker.
    pub fn new(seed: impl IntoIterator<Item = (Symbol, Type)>) -> Self {
        let bottom: FxHashMap<Symbol, Type> = seed.into_iter().collect();
        Self { scopes: vec![bottom] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty(), "popped the seeded bottom scope");
    }

    pub fn define(&mut self, name: Symbol, ty: Type) {
        self.scopes
            .last_mut()
            .expect("at least one scope")
            .insert(name, ty);
    }

    pub fn lookup(&self, name: Symbol) -> Option<&Type> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name))
    }

    /// Updates `name`'s binding in whichever active scope declared it,
    /// falling back to defining it in the innermost scope.
    pub fn update(&mut self, name: Symbol, ty: Type) {
        for scope in self.scopes.iter_mut().rev() {
            if scope.contains_key(&name) {
                scope.insert(name, ty);
                return;
            }
        }
        self.define(name, ty);
    }

    /// True when `name` is bound in some active scope.
    pub fn is_declared(&self, name: Symbol) -> bool {
        self.scopes.iter().any(|scope| scope.contains_key(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spellc_par::types::PrimitiveKind;

    #[test]
    fn lookup_walks_outward() {
        let mut table = SymbolTable::new(std::iter::empty());
        table.define(Symbol::intern("x"), Type::Primitive(PrimitiveKind::Number));
        table.push_scope();
        table.define(Symbol::intern("y"), Type::Primitive(PrimitiveKind::String));
        assert_eq!(
            table.lookup(Symbol::intern("x")),
            Some(&Type::Primitive(PrimitiveKind::Number))
        );
        assert_eq!(
            table.lookup(Symbol::intern("y")),
            Some(&Type::Primitive(PrimitiveKind::String))
        );
        table.pop_scope();
        assert_eq!(table.lookup(Symbol::intern("y")), None);
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let mut table = SymbolTable::new(std::iter::empty());
        table.define(Symbol::intern("x"), Type::Primitive(PrimitiveKind::Number));
        table.push_scope();
        table.define(Symbol::intern("x"), Type::Primitive(PrimitiveKind::Boolean));
        assert_eq!(
            table.lookup(Symbol::intern("x")),
            Some(&Type::Primitive(PrimitiveKind::Boolean))
        );
    }

    #[test]
    fn update_rewrites_the_declaring_scope() {
        let mut table = SymbolTable::new(std::iter::empty());
        table.define(Symbol::intern("x"), Type::Primitive(PrimitiveKind::Number));
        table.push_scope();
        table.update(Symbol::intern("x"), Type::Primitive(PrimitiveKind::String));
        table.pop_scope();
        assert_eq!(
            table.lookup(Symbol::intern("x")),
            Some(&Type::Primitive(PrimitiveKind::String))
        );
    }

    #[test]
    fn is_declared_sees_every_active_scope() {
        let mut table = SymbolTable::new(std::iter::empty());
        table.push_scope();
        table.define(Symbol::intern("x"), Type::Unknown);
        assert!(table.is_declared(Symbol::intern("x")));
        assert!(!table.is_declared(Symbol::intern("y")));
    }
}
