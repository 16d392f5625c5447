//! spellc - compiler façade for the spellc TTRPG scripting language.
//!
//! Wires the four pipeline crates (`spellc-lex` → `spellc-par` → `spellc-sem`
//! → `spellc-gen`) behind one host-facing entry point, [`Compiler::compile`].
//! A thin façade crate, re-used by a CLI binary (`src/main.rs`) rather than
//! owning command logic itself.

pub mod config;
mod error;

use rustc_hash::FxHashMap;

use spellc_par::ast::NodeId;
use spellc_sem::types::{type_to_string, Type};
use spellc_sem::{TypeChecker, TypeRegistry};
use spellc_util::Symbol;

pub use error::{CompileError, ConfigError};

/// Re-exported so callers can build `Type` values for `register_type`/
/// `register_function`/`create_object_type`/`create_array_type` without an
/// extra `spellc-sem` dependency.
pub use spellc_sem::types::Type as SemanticType;

/// The result of a successful `compile()` call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOutput {
    /// The inferred program return type, stringified (`typeToString`).
    pub return_type: String,
    /// The emitted target-language source text.
    pub code: String,
}

/// The façade. Owns the symbol seeds and the custom-type
/// registry, both of which survive across `compile()` calls while each call's lexer/parser/checker/emitter state is
/// transient.
pub struct Compiler {
    registry: TypeRegistry,
    context: FxHashMap<Symbol, Type>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Compiler {
    /// `new Compiler(contextTypes?)`. `context_types` seeds the
    /// top symbol scope with host-supplied bindings.
    pub fn new(context_types: impl IntoIterator<Item = (String, Type)>) -> Self {
        let context = context_types
            .into_iter()
            .map(|(name, ty)| (Symbol::intern(&name), ty))
            .collect();
        Self {
            registry: TypeRegistry::new(),
            context,
        }
    }

    /// `registerType(name, type)`: adds or replaces an entry in
    /// the custom-type registry.
    pub fn register_type(&mut self, name: &str, ty: Type) {
        self.registry.register(Symbol::intern(name), ty);
    }

    /// `registerFunction(name, paramTypes, returnType, async?)`:
    /// seeds the symbol table with a named `Function` binding.
    pub fn register_function(&mut self, name: &str, param_types: Vec<Type>, return_type: Type, is_async: bool) {
        let ty = Type::Function {
            params: param_types,
            ret: Box::new(return_type),
            is_async,
        };
        self.context.insert(Symbol::intern(name), ty);
    }

    /// Seeds an additional context binding after construction — used by the
    /// CLI's `--context` loader, which
    /// needs the registry populated before it can resolve the file's
    /// `Reference` entries.
    pub fn add_context(&mut self, name: &str, ty: Type) {
        self.context.insert(Symbol::intern(name), ty);
    }

    /// The custom-type registry backing this compiler, shared (not cloned)
    /// so a caller can register types into it directly — e.g. the CLI's
    /// `--context` loader resolves forward-declared `Reference` entries
    /// against this same registry before seeding the context.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// `compile(source)`. Runs the full pipeline and returns
    /// either the emitted code plus the stringified return type, or the
    /// first error encountered. There is no partial result.
    pub fn compile(&self, source: &str) -> Result<CompileOutput, CompileError> {
        let program = spellc_par::parse(source)?;

        let mut checker = TypeChecker::new(self.context.clone(), self.registry.clone());
        let return_type = checker.infer_return_type(&program)?;

        let named_types = self.resolve_object_literal_names(&checker);

        let mut emitter = spellc_gen::Emitter::new(named_types);
        let code = emitter.emit_program(&program)?;

        Ok(CompileOutput {
            return_type: type_to_string(&return_type),
            code,
        })
    }

    /// Façade step 3: for every object-literal node the checker
    /// inferred an anonymous structural type for, look up whether the
    /// registry holds a named type with an identical field set. Nodes that
    /// match are handed to the emitter so it can inject `_type` (spec
    /// §4.4) without re-inferring anything itself.
    fn resolve_object_literal_names(&self, checker: &TypeChecker) -> FxHashMap<NodeId, Symbol> {
        let mut named_types = FxHashMap::default();
        for (node_id, ty) in checker.object_literal_types() {
            if let Type::Object { name: None, fields } = ty {
                if let Some(name) = self.registry.find_matching_name(fields) {
                    named_types.insert(*node_id, name);
                }
            }
        }
        named_types
    }
}

/// `createObjectType(name, fields)`: constructs a named
/// structural `Object` type for host-side registration.
pub fn create_object_type(name: &str, fields: Vec<(String, Type)>) -> Type {
    Type::Object {
        name: Some(Symbol::intern(name)),
        fields: fields.into_iter().map(|(n, ty)| (Symbol::intern(&n), ty)).collect(),
    }
}

/// `createArrayType(element)`.
pub fn create_array_type(element: Type) -> Type {
    Type::Array(Box::new(element))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spellc_par::types::PrimitiveKind;

    fn spell_type() -> Type {
        create_object_type(
            "Spell",
            vec![
                ("name".to_string(), Type::Primitive(PrimitiveKind::String)),
                ("level".to_string(), Type::Primitive(PrimitiveKind::Number)),
                ("damage".to_string(), Type::Primitive(PrimitiveKind::String)),
            ],
        )
    }

    fn casting_type() -> Type {
        create_object_type(
            "SpellCasting",
            vec![("spells".to_string(), create_array_type(spell_type()))],
        )
    }

    /// Scenario 1: a bare literal return with no context.
    #[test]
    fn literal_return_with_no_context() {
        let compiler = Compiler::default();
        let out = compiler.compile("return 42").unwrap();
        assert_eq!(out.return_type, "number");
        assert_eq!(out.code, "return 42;");
    }

    /// Scenario 2: filtering a host-context array by a
    /// structural-field arrow predicate.
    #[test]
    fn filter_over_host_context_array() {
        let mut compiler = Compiler::new([("casting".to_string(), casting_type())]);
        compiler.register_type("Spell", spell_type());
        let out = compiler
            .compile("const filtered = casting.spells.filter(s => s.level <= 2)\nreturn filtered")
            .unwrap();
        assert_eq!(out.return_type, "Spell[]");
        assert!(out.code.contains("(await casting).spells.filter"));
    }

    /// Scenario 3: an early-return `if` unions with the
    /// fallthrough branch's type.
    #[test]
    fn early_return_if_unions_return_types() {
        let mut compiler = Compiler::new([
            ("slot".to_string(), create_object_type("Slot", vec![
                ("current".to_string(), Type::Primitive(PrimitiveKind::Number)),
                ("level".to_string(), Type::Primitive(PrimitiveKind::Number)),
            ])),
            ("casting".to_string(), casting_type()),
        ]);
        compiler.register_type("Spell", spell_type());
        let out = compiler
            .compile("if slot.current <= 0 { return null }\nreturn casting.spells.filter(s => s.level == slot.level)")
            .unwrap();
        assert_eq!(out.return_type, "Spell[] | null");
    }

    /// Scenario 4: a declared function return annotation that is
    /// assignable-compatible with the inferred body type.
    #[test]
    fn function_call_return_is_assignable_to_declaration() {
        let mut compiler = Compiler::new([("casting".to_string(), casting_type())]);
        compiler.register_type("Spell", spell_type());
        let out = compiler
            .compile(
                "fn getSpellsForLevel(level: number) -> Spell[] { return casting.spells.filter(s => s.level <= level) }\nreturn getSpellsForLevel(3)",
            )
            .unwrap();
        assert_eq!(out.return_type, "Spell[]");
    }

    /// Scenario 5: an object literal assigned to a `Reference`-
    /// annotated `let` gets a synthetic `_type` field.
    #[test]
    fn var_decl_with_reference_annotation_gets_injected_type() {
        let mut compiler = Compiler::default();
        compiler.register_type("Spell", spell_type());
        let out = compiler
            .compile("const spell: Spell = { name: \"X\", level: 1, damage: \"\" }\nreturn spell")
            .unwrap();
        assert_eq!(out.return_type, "Spell");
        assert!(out.code.contains("_type: \"Spell\""));
    }

    /// Scenario 6: an async function's standalone type
    /// stringifies with `Promise`, and the await at the call site unwraps it.
    #[test]
    fn async_function_wraps_and_unwraps_promise() {
        let mut compiler = Compiler::new([("casting".to_string(), casting_type())]);
        compiler.register_type("Spell", spell_type());
        let out = compiler
            .compile("async fn fetchSpells() -> Promise<Spell[]> { return casting.spells }\nreturn await fetchSpells()")
            .unwrap();
        assert_eq!(out.return_type, "Spell[]");
    }

    /// Boundary test: empty program.
    #[test]
    fn empty_program_is_unknown_with_no_code() {
        let compiler = Compiler::default();
        let out = compiler.compile("").unwrap();
        assert_eq!(out.return_type, "unknown");
        assert_eq!(out.code, "");
    }

    /// Boundary test: empty array literal infers `Array<Unknown>`.
    #[test]
    fn empty_array_literal_return_type() {
        let compiler = Compiler::default();
        let out = compiler.compile("return []").unwrap();
        assert_eq!(out.return_type, "unknown[]");
    }

    /// Boundary test: `await` outside any async context errors.
    ///
    #[test]
    fn await_inside_non_async_function_errors() {
        let compiler = Compiler::default();
        let err = compiler.compile("fn f() { return await 1 }").unwrap_err();
        assert_eq!(err.to_string(), "await can only be used in async functions");
    }

    /// The registry survives across `compile()` calls: a type registered before one call is still visible to
    /// the next.
    #[test]
    fn registry_persists_across_compile_calls() {
        let mut compiler = Compiler::default();
        compiler.register_type("Spell", spell_type());
        compiler.compile("type Alias = Spell").unwrap();
        let out = compiler.compile("let s: Spell = { name: \"Y\", level: 2, damage: \"fire\" }\nreturn s").unwrap();
        assert_eq!(out.return_type, "Spell");
    }

    /// A registered function is visible to subsequent `compile()` calls via
    /// the same context-seeding path as constructor-time context types.
    #[test]
    fn registered_function_is_callable() {
        let mut compiler = Compiler::default();
        compiler.register_function("roll", vec![Type::Primitive(PrimitiveKind::Number)], Type::Primitive(PrimitiveKind::Number), false);
        let out = compiler.compile("return roll(20)").unwrap();
        assert_eq!(out.return_type, "number");
    }

    /// Parser errors surface through `CompileError` with the "at line N"
    /// convention diagnostics consumers regex out.
    #[test]
    fn parse_error_embeds_line_number() {
        let compiler = Compiler::default();
        let err = compiler.compile("let x =").unwrap_err();
        assert!(err.to_string().contains("at line 1"));
    }
}
