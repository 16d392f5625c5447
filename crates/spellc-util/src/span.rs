//! Source positions.
//!
//! The grammar has no error-recovery story: the only thing
//! a diagnostic ever needs is the 1-based line (and, for lexical errors,
//! the column) of the offending token. `Span` carries exactly that,
//! matching what `Token` and every AST/error type in this crate threads
//! through the pipeline.

/// A 1-based line/column position in source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// A placeholder span for positions that have no meaningful source
    /// location (e.g. a type constructed purely by `registerType`).
    pub const DUMMY: Span = Span { line: 0, column: 0 };
}
