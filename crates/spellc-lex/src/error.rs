use spellc_util::Span;

/// Lexical errors. Each variant's `Display` impl is the exact
/// message shape the façade surfaces to the host.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedCharacter { ch: char, line: u32, column: u32 },

    #[error("Unterminated string at line {line}")]
    UnterminatedString { line: u32 },
}

impl LexError {
    pub fn span(&self) -> Span {
        match *self {
            LexError::UnexpectedCharacter { line, column, .. } => Span::new(line, column),
            LexError::UnterminatedString { line } => Span::new(line, 0),
        }
    }
}
