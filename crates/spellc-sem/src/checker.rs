use rustc_hash::FxHashMap;

use spellc_par::ast::{BinOp, Expr, ExprKind, Literal, NodeId, Param, Program, Stmt, StmtKind, UnOp};
use spellc_par::types::{PrimitiveKind, TypeAnn};
use spellc_util::Symbol;

use crate::error::TypeError;
use crate::registry::TypeRegistry;
use crate::scope::SymbolTable;
use crate::types::{is_assignable, type_to_string, Type};

/// The type checker. Walks a parsed [`Program`] maintaining the
/// symbol table, the custom-type registry, and the async-context state
/// machine (`in_async`/`top_level_await_allowed`).
///
/// Return-type collection (`check_stmts_collect`) gathers, for a given
/// block, every `return` directly in that block first, then — after the
/// whole block has been walked — the returns found inside nested `If`/`For`
/// bodies, each nested body's own sub-collection applying the same rule
/// recursively. This is what makes an early exit inside a conditional
/// appear *after* the function's main-line return in the inferred union
/// (an `if`-guard's return is a deferred branch, not the primary path). A
/// `FuncDecl`'s body starts a fresh collection so a nested function's
/// returns never leak into the enclosing one.
pub struct TypeChecker {
    symbols: SymbolTable,
    registry: TypeRegistry,
    in_async: bool,
    top_level_await_allowed: bool,
    object_literal_types: FxHashMap<NodeId, Type>,
}

impl TypeChecker {
    pub fn new(context: impl IntoIterator<Item = (Symbol, Type)>, registry: TypeRegistry) -> Self {
        Self {
            symbols: SymbolTable::new(context),
            registry,
            in_async: true,
            top_level_await_allowed: true,
            object_literal_types: FxHashMap::default(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Every object-literal node's locally-inferred structural type, keyed
    /// by node id. The façade's step-3 pass matches these
    /// against the custom-type registry to decide which object literals
    /// get a `_type` annotation stashed for the emitter — recorded here,
    /// as the checker already computes each literal's type once during
    /// `check`/`infer_return_type`, rather than re-inferring in a second
    /// tree walk.
    pub fn object_literal_types(&self) -> &FxHashMap<NodeId, Type> {
        &self.object_literal_types
    }

    /// `check(program)`: walks statements in order, updating
    /// the symbol table and registry; returns the last statement's type.
    pub fn check(&mut self, program: &Program) -> Result<Type, TypeError> {
        self.in_async = self.top_level_await_allowed;
        let mut returns = Vec::new();
        self.check_stmts_collect(&program.statements, &mut returns)
    }

    /// `inferReturnType(program)`.
    pub fn infer_return_type(&mut self, program: &Program) -> Result<Type, TypeError> {
        self.in_async = self.top_level_await_allowed;
        let mut returns = Vec::new();
        self.check_stmts_collect(&program.statements, &mut returns)?;
        Ok(Self::returns_to_type(returns))
    }

    fn returns_to_type(returns: Vec<Type>) -> Type {
        match returns.len() {
            0 => Type::Unknown,
            1 => returns.into_iter().next().unwrap(),
            _ => Type::Union(returns),
        }
    }

    /// Walks `stmts`, appending every `return` found directly in this block
    /// to `out` in encounter order, then — once the whole block has been
    /// walked — appending the returns collected from any nested `If`/`For`
    /// bodies, in the order those statements were encountered. Returns the
    /// type of the block's last statement (used informationally by `If`'s
    /// own caller and by `check`).
    fn check_stmts_collect(&mut self, stmts: &[Stmt], out: &mut Vec<Type>) -> Result<Type, TypeError> {
        let mut direct = Vec::new();
        let mut deferred: Vec<Vec<Type>> = Vec::new();
        let mut last = Type::Unknown;
        for stmt in stmts {
            last = self.check_stmt(stmt, &mut direct, &mut deferred)?;
        }
        out.extend(direct);
        out.extend(deferred.into_iter().flatten());
        Ok(last)
    }

    fn check_stmt(&mut self, stmt: &Stmt, direct: &mut Vec<Type>, deferred: &mut Vec<Vec<Type>>) -> Result<Type, TypeError> {
        match &stmt.kind {
            StmtKind::TypeDecl { name, ann } => {
                let ty = self.resolve_annotation(ann);
                self.registry.register(*name, ty.clone());
                Ok(ty)
            }
            StmtKind::InterfaceDecl { name, fields } => {
                let fields = fields
                    .iter()
                    .map(|(fname, ann)| (*fname, self.resolve_annotation(ann)))
                    .collect();
                let ty = Type::Object { name: Some(*name), fields };
                self.registry.register(*name, ty.clone());
                Ok(ty)
            }
            StmtKind::VarDecl { name, ann, value, .. } => {
                let value_ty = self.infer_expr(value)?;
                let bound = if let Some(declared_ann) = ann {
                    let declared = self.resolve_annotation(declared_ann);
                    if !is_assignable(&value_ty, &declared) {
                        return Err(TypeError::CannotAssign {
                            source: type_to_string(&value_ty),
                            target: type_to_string(&declared),
                        });
                    }
                    declared
                } else {
                    value_ty
                };
                self.symbols.define(*name, bound.clone());
                Ok(bound)
            }
            StmtKind::FuncDecl { name, params, return_ann, body, is_async } => {
                let fn_ty = self.check_func_decl(*name, params, return_ann, body, *is_async)?;
                self.symbols.define(*name, fn_ty.clone());
                Ok(fn_ty)
            }
            StmtKind::Return { value } => {
                let ty = match value {
                    Some(expr) => self.infer_expr(expr)?,
                    None => Type::Primitive(PrimitiveKind::Null),
                };
                direct.push(ty.clone());
                Ok(ty)
            }
            StmtKind::If { cond, then_body, else_body } => {
                self.infer_expr(cond)?;
                let mut branch_returns = Vec::new();
                let mut last = self.check_stmts_collect(then_body, &mut branch_returns)?;
                if let Some(else_body) = else_body {
                    last = self.check_stmts_collect(else_body, &mut branch_returns)?;
                }
                if !branch_returns.is_empty() {
                    deferred.push(branch_returns);
                }
                Ok(last)
            }
            StmtKind::For { var, iterable, body, is_await } => {
                let element = self.for_element_type(iterable, *is_await)?;
                self.symbols.push_scope();
                self.symbols.define(*var, element);
                let mut body_returns = Vec::new();
                let result = self.check_stmts_collect(body, &mut body_returns);
                self.symbols.pop_scope();
                let last = result?;
                if !body_returns.is_empty() {
                    deferred.push(body_returns);
                }
                Ok(last)
            }
            StmtKind::ExprStmt { expr } => self.infer_expr(expr),
        }
    }

    fn check_func_decl(
        &mut self,
        name: Symbol,
        params: &[Param],
        return_ann: &Option<TypeAnn>,
        body: &[Stmt],
        is_async: bool,
    ) -> Result<Type, TypeError> {
        self.symbols.push_scope();
        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            let ty = param
                .ann
                .as_ref()
                .map(|ann| self.resolve_annotation(ann))
                .unwrap_or(Type::Unknown);
            self.symbols.define(param.name, ty.clone());
            param_types.push(ty);
        }

        let prev_async = self.in_async;
        self.in_async = is_async;
        let mut returns = Vec::new();
        let body_result = self.check_stmts_collect(body, &mut returns);
        self.in_async = prev_async;
        self.symbols.pop_scope();
        body_result?;

        let mut computed = Self::returns_to_type(returns);
        if is_async && !matches!(computed, Type::Promise(_)) {
            computed = Type::Promise(Box::new(computed));
        }

        let final_return = if let Some(declared_ann) = return_ann {
            let declared = self.resolve_annotation(declared_ann);
            if !is_assignable(&computed, &declared) {
                return Err(TypeError::ReturnMismatch {
                    name: name.as_str().to_string(),
                    actual: type_to_string(&computed),
                    declared: type_to_string(&declared),
                });
            }
            declared
        } else {
            computed
        };

        Ok(Type::Function { params: param_types, ret: Box::new(final_return), is_async })
    }

    fn for_element_type(&mut self, iterable: &Expr, is_await: bool) -> Result<Type, TypeError> {
        let iterable_ty = self.infer_expr(iterable)?;
        if is_await {
            let element = match &iterable_ty {
                Type::Promise(inner) => match inner.as_ref() {
                    Type::Array(elem) => Some((**elem).clone()),
                    _ => Some(Type::Unknown),
                },
                _ => None,
            };
            let Some(element) = element else {
                return Err(TypeError::ForAwaitRequiresAsyncIterable);
            };
            if !self.in_async {
                return Err(TypeError::ForAwaitRequiresAsyncIterable);
            }
            Ok(element)
        } else {
            Ok(match &iterable_ty {
                Type::Array(elem) => (**elem).clone(),
                _ => Type::Unknown,
            })
        }
    }

    fn infer_expr(&mut self, expr: &Expr) -> Result<Type, TypeError> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(self.infer_literal(lit)),
            ExprKind::Identifier(sym) => Ok(self.infer_identifier(*sym)),
            ExprKind::Binary { op, left, right } => self.infer_binary(*op, left, right),
            ExprKind::Unary { op, operand } => self.infer_unary(*op, operand),
            ExprKind::Call { callee, args } => self.infer_call(callee, args),
            ExprKind::Member { object, property, computed } => {
                let object_ty = self.infer_expr(object)?;
                Ok(self.member_type(&object_ty, property, *computed))
            }
            ExprKind::Array(elements) => self.infer_array(elements),
            ExprKind::Object(fields) => {
                let mut typed_fields = Vec::with_capacity(fields.len());
                for (name, value) in fields {
                    let ty = self.infer_expr(value)?;
                    typed_fields.push((*name, ty));
                }
                let ty = Type::Object { name: None, fields: typed_fields };
                self.object_literal_types.insert(expr.id, ty.clone());
                Ok(ty)
            }
            ExprKind::Conditional { test, then_branch, else_branch } => {
                self.infer_expr(test)?;
                let then_ty = self.infer_expr(then_branch)?;
                let else_ty = self.infer_expr(else_branch)?;
                if then_ty.eq_for_merge(&else_ty) {
                    Ok(then_ty)
                } else {
                    Ok(Type::Union(vec![then_ty, else_ty]))
                }
            }
            ExprKind::Arrow { params, body, is_async } => self.infer_arrow(params, body, *is_async),
            ExprKind::Assignment { target, value } => {
                let value_ty = self.infer_expr(value)?;
                if let ExprKind::Identifier(sym) = &target.kind {
                    self.symbols.update(*sym, value_ty.clone());
                }
                Ok(value_ty)
            }
            ExprKind::Await { arg } => {
                if !self.in_async {
                    return Err(TypeError::AwaitOutsideAsync);
                }
                let arg_ty = self.infer_expr(arg)?;
                Ok(match arg_ty {
                    Type::Promise(inner) => *inner,
                    other => other,
                })
            }
        }
    }

    fn infer_literal(&self, lit: &Literal) -> Type {
        match lit {
            Literal::Number(_) => Type::Primitive(PrimitiveKind::Number),
            Literal::Str(_) => Type::Primitive(PrimitiveKind::String),
            Literal::Bool(_) => Type::Primitive(PrimitiveKind::Boolean),
            Literal::Null => Type::Primitive(PrimitiveKind::Null),
        }
    }

    /// Identifier rule: symbol table first, custom-type
    /// registry on a miss or an `Unknown` hit, else `Unknown`.
    fn infer_identifier(&self, name: Symbol) -> Type {
        match self.symbols.lookup(name) {
            Some(ty) if !matches!(ty, Type::Unknown) => ty.clone(),
            _ => self.registry.get(name).unwrap_or(Type::Unknown),
        }
    }

    fn infer_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Result<Type, TypeError> {
        let left_ty = self.infer_expr(left)?;
        let right_ty = self.infer_expr(right)?;
        Ok(match op {
            BinOp::Add => {
                let is_string = |t: &Type| matches!(t, Type::Primitive(PrimitiveKind::String));
                if is_string(&left_ty) || is_string(&right_ty) {
                    Type::Primitive(PrimitiveKind::String)
                } else {
                    Type::Primitive(PrimitiveKind::Number)
                }
            }
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => Type::Primitive(PrimitiveKind::Number),
            BinOp::Eq
            | BinOp::NotEq
            | BinOp::Lt
            | BinOp::LtEq
            | BinOp::Gt
            | BinOp::GtEq
            | BinOp::And
            | BinOp::Or => Type::Primitive(PrimitiveKind::Boolean),
        })
    }

    fn infer_unary(&mut self, op: UnOp, operand: &Expr) -> Result<Type, TypeError> {
        self.infer_expr(operand)?;
        Ok(match op {
            UnOp::Not => Type::Primitive(PrimitiveKind::Boolean),
            UnOp::Neg => Type::Primitive(PrimitiveKind::Number),
        })
    }

    /// Call rule: array-method result types when the callee is
    /// a Member on an Array value, the callee's own return type when it is
    /// a Function, else `Unknown`.
    fn infer_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Type, TypeError> {
        for arg in args {
            self.infer_expr(arg)?;
        }
        if let ExprKind::Member { object, property, computed: false } = &callee.kind {
            let object_ty = self.infer_expr(object)?;
            if let (Type::Array(elem), ExprKind::Identifier(method)) = (&object_ty, &property.kind) {
                return Ok(Self::array_method_result(method.as_str(), elem));
            }
            return Ok(match self.member_type(&object_ty, property, false) {
                Type::Function { ret, .. } => *ret,
                _ => Type::Unknown,
            });
        }
        Ok(match self.infer_expr(callee)? {
            Type::Function { ret, .. } => *ret,
            _ => Type::Unknown,
        })
    }

    fn array_method_result(method: &str, element: &Type) -> Type {
        match method {
            "filter" | "map" | "slice" | "concat" => Type::Array(Box::new(element.clone())),
            "find" | "at" => element.clone(),
            "length" | "findIndex" | "indexOf" => Type::Primitive(PrimitiveKind::Number),
            "some" | "every" | "includes" => Type::Primitive(PrimitiveKind::Boolean),
            _ => Type::Unknown,
        }
    }

    /// Member rule. Non-computed and computed-with-a-literal-key
    /// access are resolved the same way once the property expression
    /// yields a name: the parser has already lowered literal computed
    /// indices to a string-literal property.
    fn member_type(&self, object_ty: &Type, property: &Expr, computed: bool) -> Type {
        let key = match &property.kind {
            ExprKind::Identifier(sym) => Some(sym.as_str()),
            ExprKind::Literal(Literal::Str(sym)) => Some(sym.as_str()),
            _ => None,
        };
        match object_ty {
            Type::Object { fields, .. } => key
                .and_then(|k| fields.iter().find(|(n, _)| n.as_str() == k))
                .map(|(_, ty)| ty.clone())
                .unwrap_or(Type::Unknown),
            Type::Array(elem) => {
                if key == Some("length") {
                    Type::Primitive(PrimitiveKind::Number)
                } else if computed && key.is_some_and(|k| k.parse::<f64>().is_ok()) {
                    (**elem).clone()
                } else {
                    Type::Unknown
                }
            }
            _ => Type::Unknown,
        }
    }

    fn infer_array(&mut self, elements: &[Expr]) -> Result<Type, TypeError> {
        if elements.is_empty() {
            return Ok(Type::Array(Box::new(Type::Unknown)));
        }
        let mut first = None;
        for (index, element) in elements.iter().enumerate() {
            let ty = self.infer_expr(element)?;
            if index == 0 {
                first = Some(ty);
            }
        }
        Ok(Type::Array(Box::new(first.expect("non-empty"))))
    }

    fn infer_arrow(&mut self, params: &[Symbol], body: &Expr, is_async: bool) -> Result<Type, TypeError> {
        self.symbols.push_scope();
        for param in params {
            self.symbols.define(*param, Type::Unknown);
        }
        let prev_async = self.in_async;
        self.in_async = is_async;
        let body_result = self.infer_expr(body);
        self.in_async = prev_async;
        self.symbols.pop_scope();
        let body_ty = body_result?;

        let ret = if is_async && !matches!(body_ty, Type::Promise(_)) {
            Type::Promise(Box::new(body_ty))
        } else {
            body_ty
        };
        Ok(Type::Function {
            params: vec![Type::Unknown; params.len()],
            ret: Box::new(ret),
            is_async,
        })
    }

    /// Resolves a surface `TypeAnn` to a semantic `Type`, looking up
    /// `Reference` names in the custom-type registry.
    fn resolve_annotation(&mut self, ann: &TypeAnn) -> Type {
        match ann {
            TypeAnn::Primitive(p) => Type::Primitive(*p),
            TypeAnn::Array(inner) => Type::Array(Box::new(self.resolve_annotation(inner))),
            TypeAnn::Object(fields) => Type::Object {
                name: None,
                fields: fields
                    .iter()
                    .map(|(name, ann)| (*name, self.resolve_annotation(ann)))
                    .collect(),
            },
            TypeAnn::Union(alternatives) => {
                Type::Union(alternatives.iter().map(|ann| self.resolve_annotation(ann)).collect())
            }
            TypeAnn::Reference(name) => self.registry.get(*name).unwrap_or(Type::Unknown),
            TypeAnn::Promise(inner) => Type::Promise(Box::new(self.resolve_annotation(inner))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spellc_par::parse;

    fn checker() -> TypeChecker {
        TypeChecker::new(std::iter::empty(), TypeRegistry::new())
    }

    #[test]
    fn return_of_number_literal() {
        let program = parse("return 42").unwrap();
        let ty = checker().infer_return_type(&program).unwrap();
        assert_eq!(type_to_string(&ty), "number");
    }

    #[test]
    fn empty_program_infers_unknown() {
        let program = parse("").unwrap();
        let ty = checker().infer_return_type(&program).unwrap();
        assert_eq!(ty, Type::Unknown);
    }

    #[test]
    fn if_branch_return_is_deferred_after_fallthrough() {
        // The if-branch's return is a deferred early exit, not the primary
        // path, so it lands after the fallthrough return in the union.
        let program = parse("if x { return 1 }\nreturn \"a\"").unwrap();
        let mut c = checker();
        c.symbols.define(Symbol::intern("x"), Type::Primitive(PrimitiveKind::Boolean));
        let ty = c.infer_return_type(&program).unwrap();
        assert_eq!(type_to_string(&ty), "string | number");
    }

    #[test]
    fn var_decl_rejects_incompatible_annotation() {
        let program = parse("let x: number = \"oops\"").unwrap();
        let err = checker().check(&program).unwrap_err();
        assert_eq!(err.to_string(), "Cannot assign string to number");
    }

    #[test]
    fn declared_return_narrower_than_inferred_is_accepted() {
        let program = parse("fn f() -> number | string { return 1 }\nreturn f()").unwrap();
        let ty = checker().infer_return_type(&program).unwrap();
        assert_eq!(type_to_string(&ty), "number | string");
    }

    #[test]
    fn async_function_wraps_return_in_promise() {
        let program = parse("async fn f() { return 1 }").unwrap();
        let mut c = checker();
        c.check(&program).unwrap();
        let ty = c.symbols.lookup(Symbol::intern("f")).cloned().unwrap();
        assert_eq!(type_to_string(&ty), "async () => Promise<number>");
    }

    #[test]
    fn await_outside_async_function_errors() {
        let program = parse("fn f() { return await x }").unwrap();
        let mut c = checker();
        c.symbols.define(Symbol::intern("x"), Type::Promise(Box::new(Type::Primitive(PrimitiveKind::Number))));
        let err = c.check(&program).unwrap_err();
        assert_eq!(err.to_string(), "await can only be used in async functions");
    }

    #[test]
    fn for_await_requires_async_iterable() {
        let program = parse("async fn f() { for await x in xs { return x } }").unwrap();
        let mut c = checker();
        c.symbols.define(Symbol::intern("xs"), Type::Array(Box::new(Type::Unknown)));
        let err = c.check(&program).unwrap_err();
        assert_eq!(err.to_string(), "for await…of requires an async iterable (Promise<T[]>)");
    }

    #[test]
    fn array_filter_preserves_element_type() {
        let program = parse("return xs.filter(s => s)").unwrap();
        let mut c = checker();
        let spell = Type::Object {
            name: Some(Symbol::intern("Spell")),
            fields: vec![(Symbol::intern("level"), Type::Primitive(PrimitiveKind::Number))],
        };
        c.symbols.define(Symbol::intern("xs"), Type::Array(Box::new(spell)));
        let ty = c.infer_return_type(&program).unwrap();
        assert_eq!(type_to_string(&ty), "Spell[]");
    }

    #[test]
    fn empty_array_literal_is_array_of_unknown() {
        let program = parse("return []").unwrap();
        let ty = checker().infer_return_type(&program).unwrap();
        assert_eq!(type_to_string(&ty), "unknown[]");
    }

    #[test]
    fn object_literal_preserves_declared_field_order() {
        let program = parse("return { b: 1, a: \"x\" }").unwrap();
        let ty = checker().infer_return_type(&program).unwrap();
        assert_eq!(type_to_string(&ty), "{ b: number, a: string }");
    }
}
