use spellc_par::types::PrimitiveKind;
use spellc_util::{format_number, Symbol};

/// Semantic type. Unlike [`spellc_par::types::TypeAnn`] this
/// is the *resolved* form: `Reference` annotations have already been looked
/// up in the custom-type registry, so there is no variant for an unresolved
/// name.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Primitive(PrimitiveKind),
    Array(Box<Type>),
    /// `name` is `Some` for interface declarations and `TypeDecl`-registered
    /// named object types; object literals infer an anonymous (`None`)
    /// object unless the façade later stashes a name on the AST node.
    Object {
        name: Option<Symbol>,
        fields: Vec<(Symbol, Type)>,
    },
    Function {
        params: Vec<Type>,
        ret: Box<Type>,
        is_async: bool,
    },
    Union(Vec<Type>),
    Promise(Box<Type>),
    Unknown,
}

impl Type {
    /// The equality used by the conditional-arm merge rule: primitives by name, Array/Promise recursively,
    /// named objects nominally, everything else (unnamed objects,
    /// functions, unions) treated as non-equal.
    pub fn eq_for_merge(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Unknown, Type::Unknown) => true,
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Array(a), Type::Array(b)) => a.eq_for_merge(b),
            (Type::Promise(a), Type::Promise(b)) => a.eq_for_merge(b),
            (Type::Object { name: Some(a), .. }, Type::Object { name: Some(b), .. }) => a == b,
            _ => false,
        }
    }
}

/// `isAssignable(source, target)`.
pub fn is_assignable(source: &Type, target: &Type) -> bool {
    if let Type::Union(members) = source {
        return members.iter().all(|m| is_assignable(m, target));
    }
    if source == target {
        return true;
    }
    if matches!(source, Type::Unknown) || matches!(target, Type::Unknown) {
        return true;
    }
    if let Type::Union(alternatives) = target {
        return alternatives.iter().any(|alt| is_assignable(source, alt));
    }
    match (source, target) {
        (Type::Array(s), Type::Array(t)) => is_assignable(s, t),
        (Type::Promise(s), Type::Promise(t)) => is_assignable(s, t),
        (Type::Object { fields: sf, .. }, Type::Object { fields: tf, .. }) => {
            tf.iter().all(|(name, ty)| {
                sf.iter()
                    .find(|(n, _)| n == name)
                    .is_some_and(|(_, sty)| is_assignable(sty, ty))
            })
        }
        _ => false,
    }
}

/// `typeToString`.
pub fn type_to_string(ty: &Type) -> String {
    match ty {
        Type::Primitive(p) => p.name().to_string(),
        Type::Array(elem) => format!("{}[]", type_to_string(elem)),
        Type::Promise(inner) => format!("Promise<{}>", type_to_string(inner)),
        Type::Object { name: Some(name), .. } => name.as_str().to_string(),
        Type::Object { name: None, fields } => {
            let body = fields
                .iter()
                .map(|(n, t)| format!("{}: {}", n.as_str(), type_to_string(t)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{ {body} }}")
        }
        Type::Function { params, ret, is_async } => {
            let params = params.iter().map(type_to_string).collect::<Vec<_>>().join(", ");
            let prefix = if *is_async { "async " } else { "" };
            format!("{prefix}({params}) => {}", type_to_string(ret))
        }
        Type::Union(members) => members.iter().map(type_to_string).collect::<Vec<_>>().join(" | "),
        Type::Unknown => "unknown".to_string(),
    }
}

/// Renders a numeric literal the same way the parser's computed-index
/// lowering does, so member lookups on an `Array` by literal index agree
/// with the string key the parser produced.
pub fn numeric_key(n: f64) -> String {
    format_number(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num() -> Type {
        Type::Primitive(PrimitiveKind::Number)
    }
    fn string() -> Type {
        Type::Primitive(PrimitiveKind::String)
    }

    #[test]
    fn reflexivity() {
        assert!(is_assignable(&num(), &num()));
        let spell = Type::Object {
            name: Some(Symbol::intern("Spell")),
            fields: vec![(Symbol::intern("level"), num())],
        };
        assert!(is_assignable(&spell, &spell));
    }

    #[test]
    fn unknown_is_assignable_both_ways() {
        assert!(is_assignable(&Type::Unknown, &num()));
        assert!(is_assignable(&num(), &Type::Unknown));
    }

    #[test]
    fn union_fans_out_on_the_source_side() {
        let union = Type::Union(vec![num(), string()]);
        assert!(!is_assignable(&union, &num()));
        let wider = Type::Union(vec![num(), string()]);
        assert!(is_assignable(&union, &wider));
    }

    #[test]
    fn arrays_are_covariant() {
        assert!(is_assignable(
            &Type::Array(Box::new(num())),
            &Type::Array(Box::new(Type::Unknown))
        ));
        assert!(!is_assignable(
            &Type::Array(Box::new(num())),
            &Type::Array(Box::new(string()))
        ));
    }

    #[test]
    fn objects_use_width_subtyping() {
        let wide = Type::Object {
            name: None,
            fields: vec![
                (Symbol::intern("name"), string()),
                (Symbol::intern("level"), num()),
            ],
        };
        let narrow = Type::Object {
            name: None,
            fields: vec![(Symbol::intern("name"), string())],
        };
        assert!(is_assignable(&wide, &narrow));
        assert!(!is_assignable(&narrow, &wide));
    }

    #[test]
    fn type_to_string_matches_spec_forms() {
        assert_eq!(type_to_string(&num()), "number");
        assert_eq!(type_to_string(&Type::Array(Box::new(num()))), "number[]");
        assert_eq!(
            type_to_string(&Type::Promise(Box::new(Type::Array(Box::new(num()))))),
            "Promise<number[]>"
        );
        let fn_ty = Type::Function {
            params: vec![],
            ret: Box::new(Type::Promise(Box::new(Type::Array(Box::new(Type::Object {
                name: Some(Symbol::intern("Spell")),
                fields: vec![],
            }))))),
            is_async: true,
        };
        assert_eq!(type_to_string(&fn_ty), "async () => Promise<Spell[]>");
    }

    #[test]
    fn eq_for_merge_treats_unnamed_objects_as_non_equal() {
        let a = Type::Object { name: None, fields: vec![] };
        let b = Type::Object { name: None, fields: vec![] };
        assert!(!a.eq_for_merge(&b));
    }
}
