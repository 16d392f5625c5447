use spellc_util::{Span, Symbol};

use crate::types::TypeAnn;

/// Identifies an AST node for side tables keyed by node rather than value
/// (the type checker's "named type" annotation on object literals is
/// threaded through exactly this way instead of mutating the tree in
/// place).
pub type NodeId = u32;

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Symbol,
    pub ann: Option<TypeAnn>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    TypeDecl {
        name: Symbol,
        ann: TypeAnn,
    },
    InterfaceDecl {
        name: Symbol,
        fields: Vec<(Symbol, TypeAnn)>,
    },
    VarDecl {
        name: Symbol,
        is_const: bool,
        ann: Option<TypeAnn>,
        value: Expr,
    },
    FuncDecl {
        name: Symbol,
        params: Vec<Param>,
        return_ann: Option<TypeAnn>,
        body: Vec<Stmt>,
        is_async: bool,
    },
    Return {
        value: Option<Expr>,
    },
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    For {
        var: Symbol,
        iterable: Expr,
        body: Vec<Stmt>,
        is_await: bool,
    },
    ExprStmt {
        expr: Expr,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(Symbol),
    Bool(bool),
    Null,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Neg,
}

impl UnOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnOp::Not => "!",
            UnOp::Neg => "-",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(Symbol),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },
    Array(Vec<Expr>),
    /// Ordered key/value pairs — field order is preserved end to end for
    /// stable stringification and emission.
    Object(Vec<(Symbol, Expr)>),
    Conditional {
        test: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Arrow {
        params: Vec<Symbol>,
        body: Box<Expr>,
        is_async: bool,
    },
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Await {
        arg: Box<Expr>,
    },
}
