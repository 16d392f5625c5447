use spellc_lex::TokenKind;

use crate::ast::{Param, Stmt, StmtKind};
use crate::error::ParseError;
use crate::parser::Parser;

/// Statement-level parsing.
impl Parser {
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().kind {
            TokenKind::Type => self.parse_type_decl(),
            TokenKind::Interface => self.parse_interface_decl(),
            TokenKind::Let | TokenKind::Const => self.parse_var_decl(),
            TokenKind::Fn => self.parse_fn_decl(false),
            TokenKind::Async if matches!(self.peek_at(1).kind, TokenKind::Fn) => {
                self.advance(); // async
                self.parse_fn_decl(true)
            }
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_type_decl(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.expect(TokenKind::Type, "'type'")?;
        let name = self.expect_identifier("type name")?;
        self.expect(TokenKind::Eq, "'='")?;
        let ann = self.parse_type_ann()?;
        Ok(self.stmt(span, StmtKind::TypeDecl { name, ann }))
    }

    fn parse_interface_decl(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.expect(TokenKind::Interface, "'interface'")?;
        let name = self.expect_identifier("interface name")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let field_name = self.expect_identifier("field name")?;
            self.expect(TokenKind::Colon, "':'")?;
            let ann = self.parse_type_ann()?;
            fields.push((field_name, ann));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(self.stmt(span, StmtKind::InterfaceDecl { name, fields }))
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        let is_const = matches!(self.peek().kind, TokenKind::Const);
        self.advance(); // 'let' or 'const'
        let name = self.expect_identifier("variable name")?;
        let ann = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type_ann()?)
        } else {
            None
        };
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expression()?;
        Ok(self.stmt(span, StmtKind::VarDecl { name, is_const, ann, value }))
    }

    fn parse_fn_decl(&mut self, is_async: bool) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.expect(TokenKind::Fn, "'fn'")?;
        let name = self.expect_identifier("function name")?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let pname = self.expect_identifier("parameter name")?;
                let pann = if self.eat(&TokenKind::Colon) {
                    Some(self.parse_type_ann()?)
                } else {
                    None
                };
                params.push(Param { name: pname, ann: pann });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        let return_ann = if self.eat(&TokenKind::Arrow) {
            Some(self.parse_type_ann()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(self.stmt(span, StmtKind::FuncDecl { name, params, return_ann, body, is_async }))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.expect(TokenKind::Return, "'return'")?;
        let value = if self.starts_expression() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(self.stmt(span, StmtKind::Return { value }))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.expect(TokenKind::If, "'if'")?;
        let cond = self.parse_expression()?;
        let then_body = self.parse_block()?;
        let else_body = if self.eat(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(self.stmt(span, StmtKind::If { cond, then_body, else_body }))
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        self.expect(TokenKind::For, "'for'")?;
        let is_await = self.eat(&TokenKind::Await);
        let var = self.expect_identifier("loop variable")?;
        self.expect(TokenKind::In, "'in'")?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(self.stmt(span, StmtKind::For { var, iterable, body, is_await }))
    }

    fn parse_expr_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.peek().span;
        let expr = self.parse_expression()?;
        Ok(self.stmt(span, StmtKind::ExprStmt { expr }))
    }

    pub(crate) fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(statements)
    }

    /// Whether the current token can start an expression — used to decide
    /// whether a bare `return` has a value.
    fn starts_expression(&self) -> bool {
        !matches!(self.peek().kind, TokenKind::RBrace | TokenKind::Eof)
    }
}
