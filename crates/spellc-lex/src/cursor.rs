//! Character cursor for traversing source text, tracking 1-based line/column.

pub struct Cursor<'a> {
    source: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn current(&self) -> char {
        self.source[self.position..].chars().next().unwrap_or('\0')
    }

    pub fn peek_next(&self) -> char {
        let mut chars = self.source[self.position..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    pub fn advance(&mut self) -> char {
        let c = self.current();
        if !self.is_at_end() {
            self.position += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    /// Consumes `expected` if it is the current character.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.current() == expected {
            self.advance();
            true
        } else {
            false
        }
    }
}
