use spellc_util::{Span, Symbol};

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{keyword_or_identifier, Token, TokenKind};

/// Transforms source text into an ordered token sequence.
///
/// The lexer aborts on the first unexpected character or unterminated
/// string — there is no error recovery in this grammar.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Lexes the entire source, returning tokens terminated by exactly one
    /// `Eof` token carrying the final line/column.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let at_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if at_eof {
                tracing::debug!(count = tokens.len(), "lexed token stream");
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;

        let start_line = self.cursor.line();
        let start_col = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(Token::new(TokenKind::Eof, "", Span::new(start_line, start_col)));
        }

        let c = self.cursor.current();
        let span = Span::new(start_line, start_col);

        let (kind, lexeme) = match c {
            '(' => { self.cursor.advance(); (TokenKind::LParen, "(".to_string()) }
            ')' => { self.cursor.advance(); (TokenKind::RParen, ")".to_string()) }
            '{' => { self.cursor.advance(); (TokenKind::LBrace, "{".to_string()) }
            '}' => { self.cursor.advance(); (TokenKind::RBrace, "}".to_string()) }
            '[' => { self.cursor.advance(); (TokenKind::LBracket, "[".to_string()) }
            ']' => { self.cursor.advance(); (TokenKind::RBracket, "]".to_string()) }
            ',' => { self.cursor.advance(); (TokenKind::Comma, ",".to_string()) }
            '.' => { self.cursor.advance(); (TokenKind::Dot, ".".to_string()) }
            '?' => { self.cursor.advance(); (TokenKind::Question, "?".to_string()) }
            '+' => { self.cursor.advance(); (TokenKind::Plus, "+".to_string()) }
            '*' => { self.cursor.advance(); (TokenKind::Star, "*".to_string()) }
            '/' => { self.cursor.advance(); (TokenKind::Slash, "/".to_string()) }
            '%' => { self.cursor.advance(); (TokenKind::Percent, "%".to_string()) }
            ':' => { self.cursor.advance(); (TokenKind::Colon, ":".to_string()) }
            '|' => {
                self.cursor.advance();
                if self.cursor.eat('|') {
                    (TokenKind::OrOr, "||".to_string())
                } else {
                    (TokenKind::Pipe, "|".to_string())
                }
            }

            '-' => self.lex_minus(),
            '=' => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    (TokenKind::EqEq, "==".to_string())
                } else if self.cursor.eat('>') {
                    (TokenKind::FatArrow, "=>".to_string())
                } else {
                    (TokenKind::Eq, "=".to_string())
                }
            }
            '!' => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    (TokenKind::NotEq, "!=".to_string())
                } else {
                    (TokenKind::Bang, "!".to_string())
                }
            }
            '<' => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    (TokenKind::LtEq, "<=".to_string())
                } else {
                    (TokenKind::Lt, "<".to_string())
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    (TokenKind::GtEq, ">=".to_string())
                } else {
                    (TokenKind::Gt, ">".to_string())
                }
            }
            '&' => {
                self.cursor.advance();
                if self.cursor.eat('&') {
                    (TokenKind::AndAnd, "&&".to_string())
                } else {
                    return Err(LexError::UnexpectedCharacter {
                        ch: '&',
                        line: start_line,
                        column: start_col,
                    });
                }
            }

            '"' | '\'' => return self.lex_string(c, span),

            c if c.is_ascii_digit() => self.lex_number(),

            c if c.is_ascii_alphabetic() || c == '_' => self.lex_identifier(),

            other => {
                self.cursor.advance();
                return Err(LexError::UnexpectedCharacter {
                    ch: other,
                    line: start_line,
                    column: start_col,
                });
            }
        };

        Ok(Token::new(kind, lexeme, span))
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.cursor.current() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '/' if self.cursor.peek_next() == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.current() != '\n' {
                        self.cursor.advance();
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// `-` directly before a digit folds into a negative numeric literal;
    /// `->` is the return-type arrow; otherwise `-` is the MINUS operator.
    fn lex_minus(&mut self) -> (TokenKind, String) {
        self.cursor.advance();
        if self.cursor.eat('>') {
            return (TokenKind::Arrow, "->".to_string());
        }
        if self.cursor.current().is_ascii_digit() {
            let (_, digits) = self.lex_number();
            let lexeme = format!("-{digits}");
            let value: f64 = lexeme.parse().unwrap_or(0.0);
            return (TokenKind::Number(value), lexeme);
        }
        (TokenKind::Minus, "-".to_string())
    }

    fn lex_number(&mut self) -> (TokenKind, String) {
        let mut text = String::new();
        while self.cursor.current().is_ascii_digit() {
            text.push(self.cursor.advance());
        }
        if self.cursor.current() == '.' && self.cursor.peek_next().is_ascii_digit() {
            text.push(self.cursor.advance()); // '.'
            while self.cursor.current().is_ascii_digit() {
                text.push(self.cursor.advance());
            }
        }
        let value: f64 = text.parse().unwrap_or(0.0);
        (TokenKind::Number(value), text)
    }

    fn lex_identifier(&mut self) -> (TokenKind, String) {
        let mut text = String::new();
        while self.cursor.current().is_ascii_alphanumeric() || self.cursor.current() == '_' {
            text.push(self.cursor.advance());
        }
        (keyword_or_identifier(&text), text)
    }

    fn lex_string(&mut self, quote: char, span: Span) -> Result<Token, LexError> {
        self.cursor.advance(); // opening quote
        let mut value = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedString { line: span.line });
            }
            let c = self.cursor.current();
            if c == quote {
                self.cursor.advance();
                break;
            }
            if c == '\n' {
                return Err(LexError::UnterminatedString { line: span.line });
            }
            if c == '\\' {
                self.cursor.advance();
                match self.cursor.current() {
                    'n' => { value.push('\n'); self.cursor.advance(); }
                    't' => { value.push('\t'); self.cursor.advance(); }
                    other => { value.push(other); self.cursor.advance(); }
                }
            } else {
                value.push(c);
                self.cursor.advance();
            }
        }
        let sym = Symbol::intern(&value);
        Ok(Token::new(TokenKind::String(sym), value, span))
    }
}
