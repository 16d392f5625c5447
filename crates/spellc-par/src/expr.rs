use spellc_lex::TokenKind;
use spellc_util::{format_number, Symbol};

use crate::ast::{BinOp, Expr, ExprKind, Literal, UnOp};
use crate::error::ParseError;
use crate::parser::Parser;

/// Expression parsing: recursive-descent precedence climbing over the
/// grammar's precedence ladder, low to high:
/// assignment → conditional → `||` → `&&` → equality → relational →
/// additive → multiplicative → unary → call/member → primary.
impl Parser {
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_conditional()?;
        if self.check(&TokenKind::Eq) {
            let span = self.peek().span;
            self.advance();
            let value = self.parse_assignment()?;
            return Ok(self.expr(
                span,
                ExprKind::Assignment {
                    target: Box::new(left),
                    value: Box::new(value),
                },
            ));
        }
        Ok(left)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let test = self.parse_or()?;
        if self.check(&TokenKind::Question) {
            let span = self.peek().span;
            self.advance();
            let then_branch = self.parse_assignment()?;
            self.expect(TokenKind::Colon, "':'")?;
            let else_branch = self.parse_assignment()?;
            return Ok(self.expr(
                span,
                ExprKind::Conditional {
                    test: Box::new(test),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                },
            ));
        }
        Ok(test)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::OrOr) {
            let span = self.peek().span;
            self.advance();
            let right = self.parse_and()?;
            left = self.binary(span, BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::AndAnd) {
            let span = self.peek().span;
            self.advance();
            let right = self.parse_equality()?;
            left = self.binary(span, BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::NotEq,
                _ => break,
            };
            let span = self.peek().span;
            self.advance();
            let right = self.parse_relational()?;
            left = self.binary(span, op, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => break,
            };
            let span = self.peek().span;
            self.advance();
            let right = self.parse_additive()?;
            left = self.binary(span, op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let span = self.peek().span;
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(span, op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let span = self.peek().span;
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(span, op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let span = self.peek().span;
        match self.peek().kind {
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(self.expr(span, ExprKind::Unary { op: UnOp::Not, operand: Box::new(operand) }))
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(self.expr(span, ExprKind::Unary { op: UnOp::Neg, operand: Box::new(operand) }))
            }
            TokenKind::Await => {
                self.advance();
                let arg = self.parse_unary()?;
                Ok(self.expr(span, ExprKind::Await { arg: Box::new(arg) }))
            }
            _ => self.parse_call_member(),
        }
    }

    fn binary(&mut self, span: spellc_util::Span, op: BinOp, left: Expr, right: Expr) -> Expr {
        self.expr(span, ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) })
    }

    /// Left-associative chain of `.prop`, `[expr]`, and `(args)`, applied in
    /// whatever order they're written.
    fn parse_call_member(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::Dot) {
                let span = self.peek().span;
                let name = self.expect_identifier("property name")?;
                let property = self.expr(span, ExprKind::Identifier(name));
                expr = self.expr(
                    span,
                    ExprKind::Member { object: Box::new(expr), property: Box::new(property), computed: false },
                );
            } else if self.check(&TokenKind::LBracket) {
                let span = self.peek().span;
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RBracket, "']'")?;
                let property = self.lower_computed_index(inner)?;
                expr = self.expr(
                    span,
                    ExprKind::Member { object: Box::new(expr), property: Box::new(property), computed: true },
                );
            } else if self.check(&TokenKind::LParen) {
                let span = self.peek().span;
                self.advance();
                let mut args = Vec::new();
                if !self.check(&TokenKind::RParen) {
                    loop {
                        args.push(self.parse_assignment()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "')'")?;
                expr = self.expr(span, ExprKind::Call { callee: Box::new(expr), args });
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Only a resolvable literal key is supported as a computed index;
    /// anything else is a parse error.
    fn lower_computed_index(&mut self, inner: Expr) -> Result<Expr, ParseError> {
        match &inner.kind {
            ExprKind::Literal(Literal::Number(n)) => {
                let s = format_number(*n);
                Ok(self.expr(inner.span, ExprKind::Literal(Literal::Str(Symbol::intern(&s)))))
            }
            ExprKind::Literal(Literal::Str(_)) => Ok(inner),
            _ => Err(ParseError::ComplexComputedMember { line: inner.span.line }),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.peek().span;

        if self.eat(&TokenKind::Async) {
            return self.parse_arrow_after_async(span);
        }

        match self.peek().kind.clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(self.expr(span, ExprKind::Literal(Literal::Number(n))))
            }
            TokenKind::String(sym) => {
                self.advance();
                Ok(self.expr(span, ExprKind::Literal(Literal::Str(sym))))
            }
            TokenKind::True => {
                self.advance();
                Ok(self.expr(span, ExprKind::Literal(Literal::Bool(true))))
            }
            TokenKind::False => {
                self.advance();
                Ok(self.expr(span, ExprKind::Literal(Literal::Bool(false))))
            }
            TokenKind::Null => {
                self.advance();
                Ok(self.expr(span, ExprKind::Literal(Literal::Null)))
            }
            TokenKind::Identifier(sym) => {
                if matches!(self.peek_at(1).kind, TokenKind::FatArrow) {
                    self.advance(); // identifier
                    self.advance(); // =>
                    let body = self.parse_assignment()?;
                    return Ok(self.expr(
                        span,
                        ExprKind::Arrow { params: vec![sym], body: Box::new(body), is_async: false },
                    ));
                }
                self.advance();
                Ok(self.expr(span, ExprKind::Identifier(sym)))
            }
            TokenKind::LParen => self.parse_grouped_or_arrow(span, false),
            TokenKind::LBracket => self.parse_array_literal(span),
            TokenKind::LBrace => self.parse_object_literal(span),
            other => Err(ParseError::UnexpectedToken { token: other.describe(), line: span.line }),
        }
    }

    fn parse_arrow_after_async(&mut self, span: spellc_util::Span) -> Result<Expr, ParseError> {
        if let TokenKind::Identifier(sym) = self.peek().kind.clone() {
            if matches!(self.peek_at(1).kind, TokenKind::FatArrow) {
                self.advance(); // identifier
                self.advance(); // =>
                let body = self.parse_assignment()?;
                return Ok(self.expr(
                    span,
                    ExprKind::Arrow { params: vec![sym], body: Box::new(body), is_async: true },
                ));
            }
        }
        if self.check(&TokenKind::LParen) {
            return self.parse_grouped_or_arrow(span, true);
        }
        let got = self.peek().kind.describe();
        Err(ParseError::Expected { expected: "arrow function after 'async'".to_string(), got, line: span.line })
    }

    /// `( expr )` vs `(a, b) => expr`: attempt the arrow-parameter-list
    /// parse first with a backtrack anchor at the opening paren, falling
    /// back to a grouped expression on failure.
    fn parse_grouped_or_arrow(&mut self, span: spellc_util::Span, force_async: bool) -> Result<Expr, ParseError> {
        let mark = self.mark();
        if let Some(params) = self.try_parse_arrow_params() {
            if self.eat(&TokenKind::FatArrow) {
                let body = self.parse_assignment()?;
                return Ok(self.expr(
                    span,
                    ExprKind::Arrow { params, body: Box::new(body), is_async: force_async },
                ));
            }
        }
        self.reset(mark);

        self.expect(TokenKind::LParen, "'('")?;
        let inner = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(inner)
    }

    fn try_parse_arrow_params(&mut self) -> Option<Vec<Symbol>> {
        if !self.eat(&TokenKind::LParen) {
            return None;
        }
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let sym = match self.peek().kind.clone() {
                    TokenKind::Identifier(sym) => {
                        self.advance();
                        sym
                    }
                    _ => return None,
                };
                if self.eat(&TokenKind::Colon) {
                    self.parse_type_ann().ok()?;
                }
                params.push(sym);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        if !self.eat(&TokenKind::RParen) {
            return None;
        }
        Some(params)
    }

    fn parse_array_literal(&mut self, span: spellc_util::Span) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LBracket, "'['")?;
        let mut elements = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                elements.push(self.parse_assignment()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket, "']'")?;
        Ok(self.expr(span, ExprKind::Array(elements)))
    }

    fn parse_object_literal(&mut self, span: spellc_util::Span) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                let name = self.expect_identifier("field name")?;
                self.expect(TokenKind::Colon, "':'")?;
                let value = self.parse_assignment()?;
                fields.push((name, value));
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(self.expr(span, ExprKind::Object(fields)))
    }
}
