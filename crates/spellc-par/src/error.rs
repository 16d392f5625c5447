use spellc_lex::LexError;

/// Syntactic errors. The parser aborts on the first error —
/// there is no recovery.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{0}")]
    Lex(#[from] LexError),

    #[error("Expected {expected}, got {got} at line {line}")]
    Expected {
        expected: String,
        got: String,
        line: u32,
    },

    #[error("Unexpected token {token} at line {line}")]
    UnexpectedToken { token: String, line: u32 },

    #[error("Complex computed member access not yet supported at line {line}")]
    ComplexComputedMember { line: u32 },
}
