//! Host-context configuration loading for the CLI — the command-line
//! driver needs *some* path to seed `Compiler::new`/`register_type`
//! without a full embedding host.
//!
//! A context file describes named type bindings as a small recursive
//! shape, deserialized with `serde`:
//!
//! ```json
//! {
//!   "casting": { "kind": "ref", "name": "SpellCasting" },
//!   "Spell": { "kind": "object", "fields": { "name": "string", "level": "number" } },
//!   "SpellCasting": { "kind": "object", "fields": { "spells": { "kind": "array", "of": { "kind": "ref", "name": "Spell" } } } }
//! }
//! ```
//!
//! Top-level entries named the same as a previously-declared object become
//! registered types (`Compiler::register_type`); everything else seeds the
//! context symbol scope (`Compiler::new`).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use spellc_sem::types::Type as SemanticType;
use spellc_par::types::PrimitiveKind;

use crate::error::ConfigError;

/// Recursive shape of a single type entry in a context file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeSpec {
    Primitive { name: String },
    Array { of: Box<TypeSpec> },
    Object { fields: BTreeMap<String, TypeSpec> },
    Union { of: Vec<TypeSpec> },
    #[serde(rename = "ref")]
    Reference { name: String },
    Promise { resolve: Box<TypeSpec> },
}

/// A parsed context file: an ordered mapping from binding name to the type
/// it should seed or register as.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ContextFile(pub BTreeMap<String, TypeSpec>);

impl ContextFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string())),
            _ => serde_json::from_str(&content)
                .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string())),
        }
    }

    /// Resolves every entry to a `SemanticType`, registering named `Object`
    /// entries in `registry` as each is resolved so that forward-declared
    /// `Reference`s among sibling entries work regardless of map order.
    pub fn resolve(&self, registry: &spellc_sem::TypeRegistry) -> Vec<(String, SemanticType)> {
        for (name, spec) in &self.0 {
            if let TypeSpec::Object { .. } = spec {
                let ty = Self::resolve_spec(spec, registry, Some(name.as_str()));
                registry.register(spellc_util::Symbol::intern(name), ty);
            }
        }
        self.0
            .iter()
            .map(|(name, spec)| (name.clone(), Self::resolve_spec(spec, registry, None)))
            .collect()
    }

    fn resolve_spec(spec: &TypeSpec, registry: &spellc_sem::TypeRegistry, self_name: Option<&str>) -> SemanticType {
        match spec {
            TypeSpec::Primitive { name } => SemanticType::Primitive(
                PrimitiveKind::from_name(name).unwrap_or(PrimitiveKind::Null),
            ),
            TypeSpec::Array { of } => {
                SemanticType::Array(Box::new(Self::resolve_spec(of, registry, None)))
            }
            TypeSpec::Object { fields } => SemanticType::Object {
                name: self_name.map(spellc_util::Symbol::intern),
                fields: fields
                    .iter()
                    .map(|(n, s)| (spellc_util::Symbol::intern(n), Self::resolve_spec(s, registry, None)))
                    .collect(),
            },
            TypeSpec::Union { of } => {
                SemanticType::Union(of.iter().map(|s| Self::resolve_spec(s, registry, None)).collect())
            }
            TypeSpec::Reference { name } => registry
                .get(spellc_util::Symbol::intern(name))
                .unwrap_or(SemanticType::Unknown),
            TypeSpec::Promise { resolve } => {
                SemanticType::Promise(Box::new(Self::resolve_spec(resolve, registry, None)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_primitive_and_object_entries() {
        let file: ContextFile = serde_json::from_str(
            r#"{
                "Spell": {"kind": "object", "fields": {"level": {"kind": "primitive", "name": "number"}}},
                "casting": {"kind": "ref", "name": "Spell"}
            }"#,
        )
        .unwrap();
        let registry = spellc_sem::TypeRegistry::new();
        let resolved = file.resolve(&registry);
        let casting = resolved.iter().find(|(n, _)| n == "casting").unwrap();
        assert_eq!(spellc_sem::types::type_to_string(&casting.1), "Spell");
    }
}
