use spellc_lex::TokenKind;
use spellc_util::Symbol;

use crate::error::ParseError;
use crate::parser::Parser;

/// Surface syntax of a type position.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeAnn {
    Primitive(PrimitiveKind),
    Array(Box<TypeAnn>),
    Object(Vec<(Symbol, TypeAnn)>),
    Union(Vec<TypeAnn>),
    Reference(Symbol),
    Promise(Box<TypeAnn>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Number,
    String,
    Boolean,
    Null,
}

impl PrimitiveKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "number" => Some(PrimitiveKind::Number),
            "string" => Some(PrimitiveKind::String),
            "boolean" => Some(PrimitiveKind::Boolean),
            "null" => Some(PrimitiveKind::Null),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Number => "number",
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Null => "null",
        }
    }
}

impl Parser {
    /// `typeAnn := unionMember ('|' unionMember)*`
    pub(crate) fn parse_type_ann(&mut self) -> Result<TypeAnn, ParseError> {
        let first = self.parse_type_postfix()?;
        if !self.check(&TokenKind::Pipe) {
            return Ok(first);
        }
        let mut alternatives = vec![first];
        while self.eat(&TokenKind::Pipe) {
            alternatives.push(self.parse_type_postfix()?);
        }
        Ok(TypeAnn::Union(alternatives))
    }

    /// `unionMember := typePrimary '[]'*`
    fn parse_type_postfix(&mut self) -> Result<TypeAnn, ParseError> {
        let mut ty = self.parse_type_primary()?;
        while self.eat(&TokenKind::LBracket) {
            self.expect(TokenKind::RBracket, "']'")?;
            ty = TypeAnn::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_type_primary(&mut self) -> Result<TypeAnn, ParseError> {
        if self.eat(&TokenKind::Null) {
            return Ok(TypeAnn::Primitive(PrimitiveKind::Null));
        }

        if self.check(&TokenKind::LBrace) {
            return self.parse_object_type();
        }

        if let TokenKind::Identifier(_) = self.peek().kind {
            let tok = self.advance();
            let name = match tok.kind {
                TokenKind::Identifier(sym) => sym,
                _ => unreachable!(),
            };
            let name_str = name.as_str();
            if let Some(prim) = PrimitiveKind::from_name(name_str) {
                return Ok(TypeAnn::Primitive(prim));
            }
            if name_str == "Promise" && self.check(&TokenKind::Lt) {
                self.advance();
                let inner = self.parse_type_ann()?;
                self.expect(TokenKind::Gt, "'>'")?;
                return Ok(TypeAnn::Promise(Box::new(inner)));
            }
            return Ok(TypeAnn::Reference(name));
        }

        let got = self.peek().kind.describe();
        Err(ParseError::Expected {
            expected: "type annotation".to_string(),
            got,
            line: self.peek().span.line,
        })
    }

    /// `{ (IDENT ':' typeAnn ','?)* }`
    fn parse_object_type(&mut self) -> Result<TypeAnn, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let name = self.expect_identifier("field name")?;
            self.expect(TokenKind::Colon, "':'")?;
            let ann = self.parse_type_ann()?;
            fields.push((name, ann));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(TypeAnn::Object(fields))
    }

    pub(crate) fn expect_identifier(&mut self, what: &str) -> Result<Symbol, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(sym) => {
                self.advance();
                Ok(sym)
            }
            other => Err(ParseError::Expected {
                expected: what.to_string(),
                got: other.describe(),
                line: self.peek().span.line,
            }),
        }
    }
}
