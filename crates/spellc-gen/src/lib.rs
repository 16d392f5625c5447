//! spellc-gen - target-code emitter for the spellc scripting language.
//!
//! Walks a `spellc-par` [`Program`](spellc_par::ast::Program) and renders
//! it as host-language source, tracking its own lexical-scope and
//! async-context stacks independently of `spellc-sem` since it runs as a
//! separate pass over the same tree. There is no machine code here, only
//! a source-to-source rewrite.

mod emitter;
mod error;

pub use emitter::Emitter;
pub use error::EmitError;
