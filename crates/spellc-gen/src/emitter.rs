use rustc_hash::{FxHashMap, FxHashSet};

use spellc_par::ast::{BinOp, Expr, ExprKind, Literal, NodeId, Param, Program, Stmt, StmtKind, UnOp};
use spellc_par::types::TypeAnn;
use spellc_util::{format_number, Symbol};

use crate::error::EmitError;

/// Target-code emitter. Maintains a stack of lexical scopes and
/// a parallel stack of `inAsyncContext` flags, mirroring the checker's
/// scope stack but tracked independently since the emitter runs as a
/// separate pass over the same tree.
///
/// `named_types` is the façade's step-3 side table: for every
/// object-literal node the façade could resolve to a named type, it maps
/// that node's [`NodeId`] to the type's name so [`Self::emit_object`] can
/// inject `_type` without re-running inference here.
pub struct Emitter {
    scopes: Vec<FxHashSet<Symbol>>,
    async_ctx: Vec<bool>,
    named_types: FxHashMap<NodeId, Symbol>,
}

impl Emitter {
    /// Top-level emission begins with one scope and `inAsyncContext = true`
    /// because the host wraps top-level script code in an async function.
    pub fn new(named_types: FxHashMap<NodeId, Symbol>) -> Self {
        Self {
            scopes: vec![FxHashSet::default()],
            async_ctx: vec![true],
            named_types,
        }
    }

    pub fn emit_program(&mut self, program: &Program) -> Result<String, EmitError> {
        let code = self.emit_block(&program.statements)?;
        tracing::debug!(bytes = code.len(), "emitted program");
        Ok(code)
    }

    fn enter_scope(&mut self, is_async: bool) {
        self.scopes.push(FxHashSet::default());
        self.async_ctx.push(is_async);
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
        self.async_ctx.pop();
    }

    fn in_async_context(&self) -> bool {
        *self.async_ctx.last().expect("at least one scope")
    }

    fn declare(&mut self, name: Symbol) {
        self.scopes.last_mut().expect("at least one scope").insert(name);
    }

    fn is_declared(&self, name: Symbol) -> bool {
        self.scopes.iter().any(|scope| scope.contains(&name))
    }

    fn emit_block(&mut self, stmts: &[Stmt]) -> Result<String, EmitError> {
        let mut lines = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            if let Some(line) = self.emit_stmt(stmt)? {
                lines.push(line);
            }
        }
        Ok(lines.join("\n"))
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<Option<String>, EmitError> {
        match &stmt.kind {
            // Erased at runtime: types carry no representation in the
            // target language.
            StmtKind::TypeDecl { .. } | StmtKind::InterfaceDecl { .. } => Ok(None),

            StmtKind::VarDecl { name, is_const, ann, value } => {
                let keyword = if *is_const { "const" } else { "let" };
                let reference_hint = match ann {
                    Some(TypeAnn::Reference(type_name)) => Some(*type_name),
                    _ => None,
                };
                let value_code = match (&value.kind, reference_hint) {
                    (ExprKind::Object(fields), Some(type_name)) => {
                        self.emit_object(fields, value.id, Some(type_name))?
                    }
                    _ => self.emit_expr(value)?,
                };
                self.declare(*name);
                Ok(Some(format!("{keyword} {} = {value_code};", name.as_str())))
            }

            StmtKind::FuncDecl { name, params, body, is_async, .. } => {
                self.declare(*name);
                self.enter_scope(*is_async);
                for param in params {
                    self.declare(param.name);
                }
                let body_code = self.emit_block(body);
                self.exit_scope();
                let body_code = body_code?;
                let prefix = if *is_async { "async " } else { "" };
                let params = Self::render_params(params);
                Ok(Some(format!(
                    "{prefix}function {}({params}) {{\n{body_code}\n}}",
                    name.as_str()
                )))
            }

            StmtKind::Return { value } => match value {
                Some(expr) => Ok(Some(format!("return {};", self.emit_expr(expr)?))),
                None => Ok(Some("return;".to_string())),
            },

            StmtKind::If { cond, then_body, else_body } => {
                let cond_code = self.emit_expr(cond)?;
                let then_code = self.emit_block(then_body)?;
                let code = match else_body {
                    Some(else_body) => {
                        let else_code = self.emit_block(else_body)?;
                        format!("if ({cond_code}) {{\n{then_code}\n}} else {{\n{else_code}\n}}")
                    }
                    None => format!("if ({cond_code}) {{\n{then_code}\n}}"),
                };
                Ok(Some(code))
            }

            StmtKind::For { var, iterable, body, is_await } => {
                let iter_code = self.emit_expr(iterable)?;
                self.enter_scope(self.in_async_context());
                self.declare(*var);
                let body_code = self.emit_block(body);
                self.exit_scope();
                let body_code = body_code?;
                let await_kw = if *is_await { " await" } else { "" };
                Ok(Some(format!(
                    "for{await_kw} (const {} of {iter_code}) {{\n{body_code}\n}}",
                    var.as_str()
                )))
            }

            StmtKind::ExprStmt { expr } => Ok(Some(format!("{};", self.emit_expr(expr)?))),
        }
    }

    fn render_params(params: &[Param]) -> String {
        params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
    }

    fn emit_expr(&mut self, expr: &Expr) -> Result<String, EmitError> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(Self::emit_literal(lit)),

            // A bare identifier is already a complete expression, so an
            // undeclared async read needs no parens beyond `await`'s own.
            ExprKind::Identifier(sym) => Ok(self.emit_identifier(*sym)),

            ExprKind::Binary { op, left, right } => self.emit_binary(*op, left, right),

            ExprKind::Unary { op, operand } => self.emit_unary(*op, operand),

            ExprKind::Call { callee, args } => self.emit_call(callee, args),

            ExprKind::Member { object, property, computed } => {
                self.emit_member(object, property, *computed)
            }

            ExprKind::Array(elements) => {
                let items = elements
                    .iter()
                    .map(|e| self.emit_expr(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("[{}]", items.join(", ")))
            }

            ExprKind::Object(fields) => self.emit_object(fields, expr.id, None),

            ExprKind::Conditional { test, then_branch, else_branch } => {
                let test_code = self.emit_wrapped_if_loose(test)?;
                let then_code = self.emit_expr(then_branch)?;
                let else_code = self.emit_expr(else_branch)?;
                Ok(format!("{test_code} ? {then_code} : {else_code}"))
            }

            ExprKind::Arrow { params, body, is_async } => {
                self.enter_scope(*is_async);
                for param in params {
                    self.declare(*param);
                }
                let body_code = self.emit_expr(body);
                self.exit_scope();
                let body_code = body_code?;
                let prefix = if *is_async { "async " } else { "" };
                let params_code = params.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ");
                Ok(format!("{prefix}({params_code}) => {body_code}"))
            }

            ExprKind::Assignment { target, value } => self.emit_assignment(target, value),

            ExprKind::Await { arg } => Ok(format!("await {}", self.emit_expr(arg)?)),
        }
    }

    fn emit_literal(lit: &Literal) -> String {
        match lit {
            Literal::Number(n) => format_number(*n),
            // Decoded at lex time; re-wrapped verbatim without re-escaping
            // (a source string containing an embedded `"` or newline would
            // not round-trip — see the emitted-target-surface note).
            Literal::Str(sym) => format!("\"{}\"", sym.as_str()),
            Literal::Bool(b) => b.to_string(),
            Literal::Null => "null".to_string(),
        }
    }

    /// Identifier read rule: declared locals render bare; an undeclared
    /// name read in async context is a host global, awaited at the read
    /// site. Member/Call emission then composes around this string, which
    /// is what gives `(await root).prop.method()` without any special-case
    /// chain-walking logic.
    fn emit_identifier(&self, name: Symbol) -> String {
        if !self.is_declared(name) && self.in_async_context() {
            format!("(await {})", name.as_str())
        } else {
            name.as_str().to_string()
        }
    }

    fn emit_unary(&mut self, op: UnOp, operand: &Expr) -> Result<String, EmitError> {
        let code = self.emit_wrapped_if_loose(operand)?;
        Ok(format!("{}{code}", op.as_str()))
    }

    /// Binary precedence, matching the parser's climbing order (low to
    /// high): `||` < `&&` < equality < relational < additive <
    /// multiplicative.
    fn bin_prec(op: BinOp) -> u8 {
        match op {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::NotEq => 3,
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => 4,
            BinOp::Add | BinOp::Sub => 5,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 6,
        }
    }

    /// Grouped source expressions are stripped to their inner node during
    /// parsing (no `Paren` AST variant), so a `Binary`/`Conditional`/
    /// `Assignment`/`Arrow`/`Await` nested under another `Binary` only gets
    /// there one of two ways: natural precedence nesting (needs no parens
    /// to reprint correctly) or an explicit source grouping that changed
    /// the shape away from the default (must be re-parenthesized or the
    /// emitted code changes meaning). This renders `left`/`right` with
    /// parens reinserted exactly in the second case.
    fn emit_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Result<String, EmitError> {
        let prec = Self::bin_prec(op);
        let left_code = self.emit_expr(left)?;
        let left_code = Self::wrap_binary_operand(left, left_code, prec, false);
        let right_code = self.emit_expr(right)?;
        let right_code = Self::wrap_binary_operand(right, right_code, prec, true);
        Ok(format!("{left_code} {} {right_code}", op.as_str()))
    }

    /// `Await` is excluded here: `await x + 1` already parses naturally as
    /// `(await x) + 1` (await sits at the unary tier, tighter than any
    /// binary operator), so it reaches this position without ever having
    /// been grouped — wrapping it would just be redundant.
    fn wrap_binary_operand(expr: &Expr, code: String, parent_prec: u8, is_right: bool) -> String {
        let needs_parens = match &expr.kind {
            ExprKind::Binary { op, .. } => {
                let child_prec = Self::bin_prec(*op);
                if is_right {
                    child_prec <= parent_prec
                } else {
                    child_prec < parent_prec
                }
            }
            ExprKind::Conditional { .. } | ExprKind::Assignment { .. } | ExprKind::Arrow { .. } => true,
            _ => false,
        };
        if needs_parens {
            format!("({code})")
        } else {
            code
        }
    }

    /// True for expression kinds that can only appear directly under a
    /// unary operand / member base / call callee / conditional test
    /// position as the result of a stripped source grouping (every one of
    /// these grammar slots parses no lower than the call/member tier).
    fn is_loosely_bound(kind: &ExprKind) -> bool {
        matches!(
            kind,
            ExprKind::Binary { .. }
                | ExprKind::Conditional { .. }
                | ExprKind::Assignment { .. }
                | ExprKind::Arrow { .. }
                | ExprKind::Await { .. }
        )
    }

    fn wrap_if_loose(&self, expr: &Expr, code: String) -> String {
        if Self::is_loosely_bound(&expr.kind) {
            format!("({code})")
        } else {
            code
        }
    }

    fn emit_wrapped_if_loose(&mut self, expr: &Expr) -> Result<String, EmitError> {
        let code = self.emit_expr(expr)?;
        Ok(self.wrap_if_loose(expr, code))
    }

    fn emit_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<String, EmitError> {
        let callee_code = self.emit_wrapped_if_loose(callee)?;
        let args_code = self.emit_args(args)?;
        Ok(format!("{callee_code}({args_code})"))
    }

    fn emit_args(&mut self, args: &[Expr]) -> Result<String, EmitError> {
        let items = args
            .iter()
            .map(|a| self.emit_expr(a))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items.join(", "))
    }

    /// Member access. `object` composes through [`Self::emit_identifier`]
    /// for an undeclared root, so a chain rooted at a host global reads
    /// `(await root).a.b` with exactly one `await` at the root, no matter
    /// how deep the chain — this function never re-decides awaiting, it
    /// only ever appends `.prop` or `[key]` to whatever `object` rendered
    /// to.
    fn emit_member(&mut self, object: &Expr, property: &Expr, computed: bool) -> Result<String, EmitError> {
        let object_code = self.emit_wrapped_if_loose(object)?;
        if computed {
            let key = match &property.kind {
                ExprKind::Literal(Literal::Str(sym)) => sym.as_str().to_string(),
                _ => self.emit_expr(property)?,
            };
            if key.parse::<f64>().is_ok() {
                Ok(format!("{object_code}[{key}]"))
            } else {
                Ok(format!("{object_code}[\"{key}\"]"))
            }
        } else {
            let name = match &property.kind {
                ExprKind::Identifier(sym) => sym.as_str().to_string(),
                _ => self.emit_expr(property)?,
            };
            Ok(format!("{object_code}.{name}"))
        }
    }

    /// Assignment. An identifier target never gets `await`-wrapped (you
    /// cannot assign through an awaited read); a member target reuses
    /// [`Self::emit_member`] unchanged, which already only awaits the
    /// chain's root.
    fn emit_assignment(&mut self, target: &Expr, value: &Expr) -> Result<String, EmitError> {
        let value_code = self.emit_expr(value)?;
        match &target.kind {
            ExprKind::Identifier(sym) => Ok(format!("{} = {value_code}", sym.as_str())),
            ExprKind::Member { object, property, computed } => {
                let target_code = self.emit_member(object, property, *computed)?;
                Ok(format!("{target_code} = {value_code}"))
            }
            _ => Err(EmitError::InvalidAssignmentTarget),
        }
    }

    /// Object literal. `reference_hint` comes from a `let x: T = {...}`
    /// annotation (checked at the call site in [`Self::emit_stmt`]);
    /// otherwise the façade's per-node side table is consulted. Either way
    /// `_type` is only injected when the literal doesn't already declare
    /// one itself.
    fn emit_object(
        &mut self,
        fields: &[(Symbol, Expr)],
        node_id: NodeId,
        reference_hint: Option<Symbol>,
    ) -> Result<String, EmitError> {
        let type_name = reference_hint.or_else(|| self.named_types.get(&node_id).copied());
        let has_type_field = fields.iter().any(|(name, _)| name.as_str() == "_type");

        let mut parts = Vec::with_capacity(fields.len() + 1);
        if let Some(name) = type_name {
            if !has_type_field {
                parts.push(format!("_type: \"{}\"", name.as_str()));
            }
        }
        for (name, value) in fields {
            parts.push(format!("{}: {}", name.as_str(), self.emit_expr(value)?));
        }
        if parts.is_empty() {
            Ok("{}".to_string())
        } else {
            Ok(format!("{{ {} }}", parts.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spellc_par::parse;

    fn emit(src: &str) -> String {
        let program = parse(src).unwrap();
        Emitter::new(FxHashMap::default()).emit_program(&program).unwrap()
    }

    #[test]
    fn bare_return_literal() {
        assert_eq!(emit("return 42"), "return 42;");
    }

    #[test]
    fn undeclared_identifier_read_is_awaited_in_async_context() {
        assert_eq!(emit("return casting"), "return (await casting);");
    }

    #[test]
    fn declared_local_is_never_awaited() {
        assert_eq!(emit("let x = 1\nreturn x"), "let x = 1;\nreturn x;");
    }

    #[test]
    fn member_chain_awaits_only_the_root() {
        assert_eq!(
            emit("return casting.spells.filter(s => s.level <= 2)"),
            "return (await casting).spells.filter((s) => s.level <= 2);"
        );
    }

    #[test]
    fn param_shadowing_undeclared_global_is_not_awaited() {
        assert_eq!(
            emit("fn f(casting) { return casting }"),
            "function f(casting) {\nreturn casting;\n}"
        );
    }

    #[test]
    fn for_loop_declares_loop_variable() {
        assert_eq!(
            emit("for x in xs { return x }"),
            "for (const x of (await xs)) {\nreturn x;\n}"
        );
    }

    #[test]
    fn for_await_loop_emits_await_keyword() {
        // The identifier-read rule and the loop's own `await` keyword are
        // two independent suspension points that compose rather than
        // collapse: `xs` is a host global (read-site await), and `for
        // await` is what the checker's `Promise<Array<E>>` iterable rule
        // requires at the loop itself.
        assert_eq!(
            emit("async fn f() { for await x in xs { return x } }"),
            "async function f() {\nfor await (const x of (await xs)) {\nreturn x;\n}\n}"
        );
    }

    #[test]
    fn object_literal_gets_injected_type_from_reference_annotation() {
        assert_eq!(
            emit("const spell: Spell = { name: \"X\", level: 1 }\nreturn spell"),
            "const spell = { _type: \"Spell\", name: \"X\", level: 1 };\nreturn spell;"
        );
    }

    #[test]
    fn object_literal_with_explicit_type_field_is_not_duplicated() {
        assert_eq!(
            emit("const spell: Spell = { _type: \"Custom\", level: 1 }\nreturn spell"),
            "const spell = { _type: \"Custom\", level: 1 };\nreturn spell;"
        );
    }

    #[test]
    fn type_and_interface_decls_are_erased() {
        assert_eq!(emit("type T = number\ninterface I { a: number }\nreturn 1"), "return 1;");
    }

    #[test]
    fn async_function_and_await_call_site() {
        assert_eq!(
            emit("async fn fetchSpells() { return casting }\nreturn await fetchSpells()"),
            "async function fetchSpells() {\nreturn (await casting);\n}\nreturn await fetchSpells();"
        );
    }

    #[test]
    fn stripped_grouping_restores_subtraction_associativity() {
        // `a - (b - c)` loses its explicit grouping in the AST (no `Paren`
        // node); the emitter must reinsert parens or `9 - (4 - 2)` would
        // silently re-emit as the wrong-associativity `9 - 4 - 2`.
        assert_eq!(emit("return 9 - (4 - 2)"), "return 9 - (4 - 2);");
    }

    #[test]
    fn natural_precedence_nesting_needs_no_parens() {
        assert_eq!(emit("return a + b * c"), "return (await a) + (await b) * (await c);");
    }

    #[test]
    fn assignment_to_member_only_awaits_the_root() {
        assert_eq!(
            emit("async fn f() { casting.hp = 1 }"),
            "async function f() {\n(await casting).hp = 1;\n}"
        );
    }

    #[test]
    fn empty_program_emits_empty_string() {
        assert_eq!(emit(""), "");
    }

    #[test]
    fn string_literal_is_emitted_double_quoted() {
        assert_eq!(emit("return 'hi'"), "return \"hi\";");
    }
}
