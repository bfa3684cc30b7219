//! C# renderer for target units.
//!
//! Allman braces, four-space indentation. Binary expressions are always
//! parenthesized so no precedence table is needed.

use crate::ir::*;
use crate::target::{Member, Param, TargetUnit, TypeDecl};
use crate::traits::Renderer;

/// Static instance of the C# renderer for registry.
pub static CSHARP_RENDERER: CSharpRendererImpl = CSharpRendererImpl;

/// C# renderer implementing the Renderer trait.
pub struct CSharpRendererImpl;

impl Renderer for CSharpRendererImpl {
    fn language(&self) -> &'static str {
        "csharp"
    }

    fn extension(&self) -> &'static str {
        "cs"
    }

    fn render(&self, header: &str, unit: &TargetUnit) -> String {
        CSharpWriter::emit(header, unit)
    }
}

/// Emits target units as C# source code.
pub struct CSharpWriter {
    output: String,
    indent: usize,
}

impl CSharpWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Emit `header` verbatim followed by the unit.
    pub fn emit(header: &str, unit: &TargetUnit) -> String {
        let mut writer = Self::new();
        writer.output.push_str(header);
        writer.write_unit(unit);
        writer.output
    }

    fn write_unit(&mut self, unit: &TargetUnit) {
        for using in &unit.usings {
            self.output.push_str("using ");
            self.output.push_str(using);
            self.output.push_str(";\n");
        }
        if !unit.usings.is_empty() && !unit.types.is_empty() {
            self.output.push('\n');
        }

        match &unit.namespace {
            Some(ns) => {
                self.output.push_str("namespace ");
                self.output.push_str(ns);
                self.output.push_str("\n{\n");
                self.indent += 1;
                self.write_types(&unit.types);
                self.indent -= 1;
                self.output.push_str("}\n");
            }
            None => self.write_types(&unit.types),
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
    }

    fn write_types(&mut self, types: &[TypeDecl]) {
        for (i, decl) in types.iter().enumerate() {
            if i > 0 {
                self.output.push('\n');
            }
            self.write_type(decl);
        }
    }

    fn write_modifiers(&mut self, modifiers: &[String]) {
        for m in modifiers {
            self.output.push_str(m);
            self.output.push(' ');
        }
    }

    fn write_type(&mut self, decl: &TypeDecl) {
        self.write_indent();
        self.write_modifiers(&decl.modifiers);
        self.output.push_str(decl.kind.keyword());
        self.output.push(' ');
        self.output.push_str(&decl.name);
        if !decl.bases.is_empty() {
            self.output.push_str(" : ");
            for (i, base) in decl.bases.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                self.write_type_ref(base);
            }
        }
        self.output.push('\n');
        self.write_indent();
        self.output.push_str("{\n");
        self.indent += 1;

        for (i, constant) in decl.constants.iter().enumerate() {
            self.write_indent();
            self.output.push_str(constant);
            if i + 1 < decl.constants.len() {
                self.output.push(',');
            }
            self.output.push('\n');
        }

        let mut previous: Option<&Member> = None;
        for member in &decl.members {
            let grouped_fields = matches!(
                (previous, member),
                (Some(Member::Field { .. }), Member::Field { .. })
            );
            if (previous.is_some() || !decl.constants.is_empty()) && !grouped_fields {
                self.output.push('\n');
            }
            self.write_member(member);
            previous = Some(member);
        }

        self.indent -= 1;
        self.write_indent();
        self.output.push_str("}\n");
    }

    fn write_member(&mut self, member: &Member) {
        match member {
            Member::Field {
                name,
                ty,
                modifiers,
                init,
            } => {
                self.write_indent();
                self.write_modifiers(modifiers);
                self.write_type_ref(ty);
                self.output.push(' ');
                self.output.push_str(name);
                if let Some(init) = init {
                    self.output.push_str(" = ");
                    self.write_expr(init);
                }
                self.output.push_str(";\n");
            }

            Member::Method {
                name,
                params,
                return_type,
                modifiers,
                body,
            } => {
                self.write_indent();
                self.write_modifiers(modifiers);
                match return_type {
                    Some(ty) => self.write_type_ref(ty),
                    None => self.output.push_str("void"),
                }
                self.output.push(' ');
                self.output.push_str(name);
                self.write_params(params);
                match body {
                    Some(body) => {
                        self.output.push('\n');
                        self.write_body(body);
                    }
                    None => self.output.push_str(";\n"),
                }
            }

            Member::Constructor {
                name,
                params,
                modifiers,
                body,
            } => {
                self.write_indent();
                self.write_modifiers(modifiers);
                self.output.push_str(name);
                self.write_params(params);
                self.output.push('\n');
                self.write_body(body);
            }

            Member::Type(decl) => self.write_type(decl),

            Member::Placeholder(note) => {
                self.write_indent();
                self.output.push_str("// untranslated: ");
                self.output.push_str(note);
                self.output.push('\n');
            }
        }
    }

    fn write_params(&mut self, params: &[Param]) {
        self.output.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_type_ref(&param.ty);
            self.output.push(' ');
            self.output.push_str(&param.name);
        }
        self.output.push(')');
    }

    fn write_body(&mut self, stmts: &[Stmt]) {
        self.write_indent();
        self.output.push_str("{\n");
        self.indent += 1;
        for stmt in stmts {
            self.write_stmt(stmt);
        }
        self.indent -= 1;
        self.write_indent();
        self.output.push_str("}\n");
    }

    /// Body of a control statement: blocks stay at the current level,
    /// single statements are indented one step.
    fn write_nested(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(stmts) => self.write_body(stmts),
            _ => {
                self.indent += 1;
                self.write_stmt(stmt);
                self.indent -= 1;
            }
        }
    }

    fn write_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.write_indent();
                self.write_expr(expr);
                self.output.push_str(";\n");
            }

            Stmt::Local { name, ty, init } => {
                self.write_indent();
                self.write_local(name, ty, init.as_ref());
                self.output.push_str(";\n");
            }

            Stmt::Block(stmts) => self.write_body(stmts),

            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                self.write_indent();
                self.write_if(test, consequent, alternate.as_deref());
            }

            Stmt::While { test, body } => {
                self.write_indent();
                self.output.push_str("while (");
                self.write_expr(test);
                self.output.push_str(")\n");
                self.write_nested(body);
            }

            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                self.write_indent();
                self.output.push_str("for (");
                for (i, s) in init.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_stmt_inline(s);
                }
                self.output.push_str("; ");
                if let Some(test) = test {
                    self.write_expr(test);
                }
                self.output.push_str("; ");
                for (i, e) in update.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_expr(e);
                }
                self.output.push_str(")\n");
                self.write_nested(body);
            }

            Stmt::ForEach {
                variable,
                ty,
                iterable,
                body,
            } => {
                self.write_indent();
                self.output.push_str("foreach (");
                self.write_type_ref(ty);
                self.output.push(' ');
                self.output.push_str(variable);
                self.output.push_str(" in ");
                self.write_expr(iterable);
                self.output.push_str(")\n");
                self.write_nested(body);
            }

            Stmt::Return(expr) => {
                self.write_indent();
                self.output.push_str("return");
                if let Some(e) = expr {
                    self.output.push(' ');
                    self.write_expr(e);
                }
                self.output.push_str(";\n");
            }

            Stmt::Break => {
                self.write_indent();
                self.output.push_str("break;\n");
            }

            Stmt::Continue => {
                self.write_indent();
                self.output.push_str("continue;\n");
            }

            Stmt::Throw(expr) => {
                self.write_indent();
                self.output.push_str("throw ");
                self.write_expr(expr);
                self.output.push_str(";\n");
            }

            Stmt::Try {
                body,
                catches,
                finally,
            } => {
                self.write_indent();
                self.output.push_str("try\n");
                self.write_body(body);
                for catch in catches {
                    self.write_indent();
                    self.output.push_str("catch (");
                    self.write_type_ref(&catch.ty);
                    self.output.push(' ');
                    self.output.push_str(&catch.param);
                    self.output.push_str(")\n");
                    self.write_body(&catch.body);
                }
                if let Some(finally) = finally {
                    self.write_indent();
                    self.output.push_str("finally\n");
                    self.write_body(finally);
                }
            }

            Stmt::Labeled { label, body, .. } => {
                self.write_indent();
                self.output.push_str(label);
                self.output.push_str(":\n");
                self.write_stmt(body);
            }

            Stmt::Placeholder(note) => {
                self.write_indent();
                self.output.push_str("// untranslated: ");
                self.output.push_str(note);
                self.output.push('\n');
            }
        }
    }

    // Called with the cursor already indented; else-if chains continue on
    // the `else` line.
    fn write_if(&mut self, test: &Expr, consequent: &Stmt, alternate: Option<&Stmt>) {
        self.output.push_str("if (");
        self.write_expr(test);
        self.output.push_str(")\n");
        self.write_nested(consequent);
        if let Some(alt) = alternate {
            self.write_indent();
            self.output.push_str("else");
            match alt {
                Stmt::If {
                    test,
                    consequent,
                    alternate,
                } => {
                    self.output.push(' ');
                    self.write_if(test, consequent, alternate.as_deref());
                }
                _ => {
                    self.output.push('\n');
                    self.write_nested(alt);
                }
            }
        }
    }

    fn write_stmt_inline(&mut self, stmt: &Stmt) {
        // For-loop initializers: no indent, no semicolon
        match stmt {
            Stmt::Local { name, ty, init } => self.write_local(name, ty, init.as_ref()),
            Stmt::Expr(expr) => self.write_expr(expr),
            _ => {}
        }
    }

    fn write_local(&mut self, name: &str, ty: &TypeRef, init: Option<&Expr>) {
        self.write_type_ref(ty);
        self.output.push(' ');
        self.output.push_str(name);
        if let Some(init) = init {
            self.output.push_str(" = ");
            self.write_expr(init);
        }
    }

    fn write_type_ref(&mut self, ty: &TypeRef) {
        self.output.push_str(&ty.name);
        if !ty.args.is_empty() {
            self.output.push('<');
            for (i, arg) in ty.args.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                self.write_type_ref(arg);
            }
            self.output.push('>');
        }
        for _ in 0..ty.dims {
            self.output.push_str("[]");
        }
    }

    fn write_args(&mut self, args: &[Expr]) {
        self.output.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_expr(arg);
        }
        self.output.push(')');
    }

    fn write_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(lit) => self.write_literal(lit),

            Expr::Ident(name) => self.output.push_str(name),

            Expr::This => self.output.push_str("this"),

            Expr::Type(ty) => self.write_type_ref(ty),

            Expr::Field { object, name } => {
                self.write_expr(object);
                self.output.push('.');
                self.output.push_str(name);
            }

            Expr::Call {
                target,
                method,
                args,
                ..
            } => {
                if let Some(target) = target {
                    self.write_expr(target);
                    self.output.push('.');
                }
                self.output.push_str(method);
                self.write_args(args);
            }

            Expr::New { ty, args } => {
                self.output.push_str("new ");
                self.write_type_ref(ty);
                self.write_args(args);
            }

            Expr::Binary { left, op, right } => {
                self.output.push('(');
                self.write_expr(left);
                self.output.push(' ');
                self.output.push_str(binary_op(*op));
                self.output.push(' ');
                self.write_expr(right);
                self.output.push(')');
            }

            Expr::Unary { op, expr } => {
                self.output.push_str(unary_op(*op));
                self.write_expr(expr);
            }

            Expr::Assign { target, value } => {
                self.write_expr(target);
                self.output.push_str(" = ");
                self.write_expr(value);
            }

            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.output.push('(');
                self.write_expr(test);
                self.output.push_str(" ? ");
                self.write_expr(consequent);
                self.output.push_str(" : ");
                self.write_expr(alternate);
                self.output.push(')');
            }

            Expr::Cast { ty, expr } => {
                self.output.push_str("((");
                self.write_type_ref(ty);
                self.output.push(')');
                self.write_expr(expr);
                self.output.push(')');
            }

            Expr::InstanceOf { expr, ty } => {
                self.output.push('(');
                self.write_expr(expr);
                self.output.push_str(" is ");
                self.write_type_ref(ty);
                self.output.push(')');
            }

            Expr::AnonymousClass { ty, .. } => {
                self.output.push_str("null /* anonymous ");
                self.write_type_ref(ty);
                self.output.push_str(" */");
            }

            Expr::Placeholder(note) => {
                self.output.push_str("default /* untranslated: ");
                self.output.push_str(note);
                self.output.push_str(" */");
            }
        }
    }

    fn write_literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Null => self.output.push_str("null"),
            Literal::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Literal::Int(n) => self.output.push_str(&n.to_string()),
            Literal::Float(n) => {
                // Keep a decimal point so the literal stays a double
                if n.is_finite() && n.fract() == 0.0 {
                    self.output.push_str(&format!("{n:.1}"));
                } else {
                    self.output.push_str(&n.to_string());
                }
            }
            Literal::Char(c) => {
                self.output.push('\'');
                self.output.push_str(&escape_char(*c));
                self.output.push('\'');
            }
            Literal::String(s) => {
                self.output.push('"');
                self.output.push_str(&escape_string(s));
                self.output.push('"');
            }
        }
    }
}

impl Default for CSharpWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn binary_op(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
    }
}

fn unary_op(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::Not => "!",
        UnaryOp::BitNot => "~",
    }
}

fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

fn escape_char(c: char) -> String {
    match c {
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
