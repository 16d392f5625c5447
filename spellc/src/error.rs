//! The façade's composed error type.
//!
//! Each pipeline stage has its own error enum (`spellc_lex::LexError`,
//! `spellc_par::ParseError`, `spellc_sem::TypeError`, `spellc_gen::EmitError`);
//! `CompileError` unifies them with `#[from]` so `compile()` can return a
//! single `Result`. `to_string()` on any variant is a free-form message,
//! embedding "at line N" for parser/lexer errors.

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] spellc_par::ParseError),

    #[error(transparent)]
    Type(#[from] spellc_sem::TypeError),

    #[error(transparent)]
    Emit(#[from] spellc_gen::EmitError),
}

/// Errors loading a CLI `--context` file.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("failed to read context file {0}: {1}")]
    Io(String, String),

    #[error("failed to parse context file {0}: {1}")]
    Parse(String, String),
}
