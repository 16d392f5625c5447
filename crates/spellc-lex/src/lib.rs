//! spellc-lex - lexical analysis for the spellc scripting language.
//!
//! Converts source text into the token stream consumed by `spellc-par`,
//! split into `cursor` (character-at-a-time traversal) and `lexer`
//! (token production) since this grammar's lexical surface is small
//! enough not to need a per-concern module split of its own.

mod cursor;
mod error;
mod lexer;
mod token;

pub use error::LexError;
pub use lexer::Lexer;
pub use token::{keyword_or_identifier, Token, TokenKind};
