//! spellc-sem - type checker for the spellc scripting language.
//!
//! Turns a `spellc-par` [`Program`](spellc_par::ast::Program) into a
//! resolved return type, maintaining the symbol table, the custom-type
//! registry, and the async-context state machine that the emitter
//! (`spellc-gen`) later drives over the same tree. This checker runs
//! directly on the parser's AST; there is no separate lowering step.

mod checker;
mod error;
mod registry;
mod scope;
pub mod types;

pub use checker::TypeChecker;
pub use error::TypeError;
pub use registry::TypeRegistry;
pub use scope::SymbolTable;
