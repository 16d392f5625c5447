use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use spellc_util::Symbol;

use crate::types::Type;

/// The custom-type registry. Named object types are interned by
/// name here; resolving a `Reference` annotation shares this entry rather
/// than copying it.
///
/// Cloning a `TypeRegistry` shares the underlying map — the façade holds
/// one instance across `compile()` calls while each call's `TypeChecker`
/// borrows a clone.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    inner: Rc<RefCell<FxHashMap<Symbol, Type>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: Symbol, ty: Type) {
        self.inner.borrow_mut().insert(name, ty);
    }

    pub fn get(&self, name: Symbol) -> Option<Type> {
        self.inner.borrow().get(&name).cloned()
    }

    /// Finds a registered named `Object` type whose field set matches
    /// `fields` exactly (same names, each assignable both ways), ignoring
    /// declaration order. Used by the façade's step-3 pass to
    /// decide which anonymous object-literal inference result corresponds
    /// to a type the host registered by name.
    pub fn find_matching_name(&self, fields: &[(Symbol, Type)]) -> Option<Symbol> {
        self.inner.borrow().iter().find_map(|(name, ty)| match ty {
            Type::Object { fields: candidate, .. } if fields_match(fields, candidate) => {
                Some(*name)
            }
            _ => None,
        })
    }
}

fn fields_match(a: &[(Symbol, Type)], b: &[(Symbol, Type)]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|(name, ty)| {
        b.iter().any(|(bname, bty)| bname == name && crate::types::is_assignable(ty, bty) && crate::types::is_assignable(bty, ty))
    })
}
