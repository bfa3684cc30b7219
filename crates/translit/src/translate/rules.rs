//! The built-in rule set.
//!
//! Deliberately small: declarations, modifiers, type references and method
//! names are mapped; bodies are carried over structurally. Constructs with
//! no target counterpart produce a warning and a placeholder.

use super::names::{
    builtin_member, builtin_type, member_key, member_key_for_binding, namespace_for_package,
    pascal_case,
};
use super::{UnitTranslator, WarningHandler};
use crate::error::BindError;
use crate::resolver::SymbolResolver;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;
use translit_syntax::ir::{CatchClause, Expr, Stmt, TypeRef, simple_name};
use translit_syntax::source::{self, Member, MethodDecl, Modifier};
use translit_syntax::target;
use translit_syntax::{SourceUnit, TargetRef, TargetUnit};

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTranslator;

impl UnitTranslator for DefaultTranslator {
    fn translate(
        &self,
        unit: &SourceUnit,
        resolver: &SymbolResolver,
        warnings: &mut dyn WarningHandler,
    ) -> Result<TargetUnit, BindError> {
        let namespace = unit.package.as_deref().map(namespace_for_package);

        // Declarations are bound before any body is visited so references
        // within the unit resolve.
        for decl in &unit.types {
            bind_type(
                resolver,
                namespace.as_deref(),
                decl,
                unit.qualify(&decl.name),
                decl.name.clone(),
            )?;
        }

        let mut ctx = UnitContext {
            resolver,
            warnings,
            namespace: namespace.clone(),
            usings: BTreeSet::new(),
        };
        let types: Vec<target::TypeDecl> = unit
            .types
            .iter()
            .filter_map(|decl| ctx.type_decl(decl, &unit.qualify(&decl.name)))
            .collect();

        let mut out = TargetUnit::new(unit.path.clone());
        out.namespace = namespace;
        out.usings = ctx.usings;
        out.suppressed = types.is_empty();
        out.types = types;
        Ok(out)
    }
}

fn bind_type(
    resolver: &SymbolResolver,
    namespace: Option<&str>,
    decl: &source::TypeDecl,
    identity: String,
    target_name: String,
) -> Result<(), BindError> {
    if decl.kind == source::TypeKind::Annotation {
        return Ok(());
    }
    let reference = TargetRef::ty(namespace.map(str::to_string), target_name.clone());
    let owner = reference.full_name();
    resolver.bind(identity.clone(), reference)?;

    // Overloads share one identity.
    let mut seen = HashSet::new();
    for member in &decl.members {
        match member {
            Member::Method(method) if seen.insert(method.name.as_str()) => {
                resolver.bind(
                    member_key(&identity, &method.name),
                    TargetRef::member(owner.clone(), pascal_case(&method.name)),
                )?;
            }
            Member::Type(nested) => bind_type(
                resolver,
                namespace,
                nested,
                format!("{identity}.{}", nested.name),
                format!("{target_name}.{}", nested.name),
            )?,
            _ => {}
        }
    }
    Ok(())
}

struct UnitContext<'a> {
    resolver: &'a SymbolResolver,
    warnings: &'a mut dyn WarningHandler,
    namespace: Option<String>,
    usings: BTreeSet<String>,
}

impl UnitContext<'_> {
    fn type_decl(&mut self, decl: &source::TypeDecl, identity: &str) -> Option<target::TypeDecl> {
        let kind = match decl.kind {
            source::TypeKind::Class => target::TypeKind::Class,
            source::TypeKind::Interface => target::TypeKind::Interface,
            source::TypeKind::Enum => target::TypeKind::Enum,
            source::TypeKind::Annotation => {
                debug!(identity, "annotation type has no target form");
                return None;
            }
        };

        let mut out = target::TypeDecl::new(decl.name.clone(), kind);
        out.modifiers = type_modifiers(&decl.modifiers);
        out.bases = decl
            .extends
            .iter()
            .chain(&decl.implements)
            .map(|t| self.type_ref(t))
            .collect();
        out.constants = decl.constants.clone();

        let in_interface = kind == target::TypeKind::Interface;
        for member in &decl.members {
            let translated = match member {
                Member::Field(field) => Some(self.field(field)),
                Member::Method(method) => Some(self.method(method, identity, in_interface)),
                Member::Constructor(ctor) => Some(self.constructor(ctor, &decl.name)),
                Member::Type(nested) => self
                    .type_decl(nested, &format!("{identity}.{}", nested.name))
                    .map(target::Member::Type),
            };
            out.members.extend(translated);
        }
        Some(out)
    }

    fn field(&mut self, field: &source::FieldDecl) -> target::Member {
        target::Member::Field {
            name: field.name.clone(),
            ty: self.type_ref(&field.ty),
            modifiers: member_modifiers(&field.modifiers, true),
            init: field.init.as_ref().map(|e| self.expr(e)),
        }
    }

    fn method(&mut self, method: &MethodDecl, owner: &str, in_interface: bool) -> target::Member {
        if method.has(Modifier::Native) {
            self.warnings.warning(
                method.span,
                &format!("native method '{}' cannot be translated", method.name),
            );
            return target::Member::Placeholder(format!("native method {}", method.name));
        }

        let mut body = method.body.as_ref().map(|b| self.block(b));
        if method.has(Modifier::Synchronized) {
            self.warnings.warning(
                method.span,
                &format!("synchronized modifier on '{}' was dropped", method.name),
            );
            if let Some(body) = body.as_mut() {
                body.insert(0, Stmt::Placeholder("synchronized method".to_string()));
            }
        }

        target::Member::Method {
            name: self.member_name(&format!("{owner}.{}", method.name)),
            params: self.params(&method.params),
            return_type: method.return_type.as_ref().map(|t| self.type_ref(t)),
            modifiers: if in_interface {
                Vec::new()
            } else {
                member_modifiers(&method.modifiers, false)
            },
            body,
        }
    }

    fn constructor(&mut self, ctor: &MethodDecl, type_name: &str) -> target::Member {
        target::Member::Constructor {
            name: type_name.to_string(),
            params: self.params(&ctor.params),
            modifiers: member_modifiers(&ctor.modifiers, false),
            body: ctor.body.as_ref().map(|b| self.block(b)).unwrap_or_default(),
        }
    }

    fn params(&mut self, params: &[source::Param]) -> Vec<target::Param> {
        params
            .iter()
            .map(|p| target::Param {
                name: p.name.clone(),
                ty: self.type_ref(&p.ty),
            })
            .collect()
    }

    /// Resolve a type identity to its printed name, recording the `using`
    /// it needs. Unknown identities are external types and keep their
    /// simple name.
    fn type_name(&mut self, identity: &str) -> String {
        let reference = self
            .resolver
            .resolve(identity)
            .or_else(|| builtin_type(identity));
        match reference {
            Some(reference) => {
                if let Some(ns) = reference.namespace() {
                    if self.namespace.as_deref() != Some(ns) {
                        self.usings.insert(ns.to_string());
                    }
                }
                reference.name().to_string()
            }
            None => {
                debug!(identity, "unresolved type, treating as external");
                simple_name(identity).to_string()
            }
        }
    }

    /// `identity` is the dotted method identity (`pkg.Type.method`).
    fn member_name(&self, identity: &str) -> String {
        if let Some(reference) = self.resolver.resolve(&member_key_for_binding(identity)) {
            return reference.name().to_string();
        }
        if let Some(name) = builtin_member(identity) {
            return name.to_string();
        }
        debug!(identity, "unresolved member, using naming convention");
        pascal_case(simple_name(identity))
    }

    fn type_ref(&mut self, ty: &TypeRef) -> TypeRef {
        TypeRef {
            name: self.type_name(&ty.name),
            args: ty.args.iter().map(|a| self.type_ref(a)).collect(),
            dims: ty.dims,
        }
    }

    fn block(&mut self, stmts: &[Stmt]) -> Vec<Stmt> {
        stmts.iter().map(|s| self.stmt(s)).collect()
    }

    fn boxed(&mut self, stmt: &Stmt) -> Box<Stmt> {
        Box::new(self.stmt(stmt))
    }

    fn stmt(&mut self, stmt: &Stmt) -> Stmt {
        match stmt {
            Stmt::Expr(e) => Stmt::Expr(self.expr(e)),
            Stmt::Local { name, ty, init } => Stmt::Local {
                name: name.clone(),
                ty: self.type_ref(ty),
                init: init.as_ref().map(|e| self.expr(e)),
            },
            Stmt::Block(stmts) => Stmt::Block(self.block(stmts)),
            Stmt::If {
                test,
                consequent,
                alternate,
            } => Stmt::If {
                test: self.expr(test),
                consequent: self.boxed(consequent),
                alternate: alternate.as_ref().map(|a| self.boxed(a)),
            },
            Stmt::While { test, body } => Stmt::While {
                test: self.expr(test),
                body: self.boxed(body),
            },
            Stmt::For {
                init,
                test,
                update,
                body,
            } => Stmt::For {
                init: self.block(init),
                test: test.as_ref().map(|e| self.expr(e)),
                update: update.iter().map(|e| self.expr(e)).collect(),
                body: self.boxed(body),
            },
            Stmt::ForEach {
                variable,
                ty,
                iterable,
                body,
            } => Stmt::ForEach {
                variable: variable.clone(),
                ty: self.type_ref(ty),
                iterable: self.expr(iterable),
                body: self.boxed(body),
            },
            Stmt::Return(e) => Stmt::Return(e.as_ref().map(|e| self.expr(e))),
            Stmt::Break => Stmt::Break,
            Stmt::Continue => Stmt::Continue,
            Stmt::Throw(e) => Stmt::Throw(self.expr(e)),
            Stmt::Try {
                body,
                catches,
                finally,
            } => Stmt::Try {
                body: self.block(body),
                catches: catches
                    .iter()
                    .map(|c| CatchClause {
                        param: c.param.clone(),
                        ty: self.type_ref(&c.ty),
                        body: self.block(&c.body),
                    })
                    .collect(),
                finally: finally.as_ref().map(|f| self.block(f)),
            },
            Stmt::Labeled { label, body, span } => {
                self.warnings.warning(
                    *span,
                    &format!("labeled statement '{label}' has no equivalent, label dropped"),
                );
                Stmt::Block(vec![
                    Stmt::Placeholder(format!("label {label}")),
                    self.stmt(body),
                ])
            }
            Stmt::Placeholder(note) => Stmt::Placeholder(note.clone()),
        }
    }

    fn boxed_expr(&mut self, expr: &Expr) -> Box<Expr> {
        Box::new(self.expr(expr))
    }

    fn expr(&mut self, expr: &Expr) -> Expr {
        match expr {
            Expr::Literal(_) | Expr::Ident(_) | Expr::This | Expr::Placeholder(_) => expr.clone(),
            Expr::Type(ty) => Expr::Type(self.type_ref(ty)),
            Expr::Field { object, name } => Expr::Field {
                object: self.boxed_expr(object),
                name: name.clone(),
            },
            Expr::Call {
                target,
                method,
                binding,
                args,
            } => Expr::Call {
                target: target.as_ref().map(|t| self.boxed_expr(t)),
                method: match binding {
                    Some(binding) => self.member_name(binding),
                    None => pascal_case(method),
                },
                binding: None,
                args: args.iter().map(|a| self.expr(a)).collect(),
            },
            Expr::New { ty, args } => Expr::New {
                ty: self.type_ref(ty),
                args: args.iter().map(|a| self.expr(a)).collect(),
            },
            Expr::Binary { left, op, right } => Expr::Binary {
                left: self.boxed_expr(left),
                op: *op,
                right: self.boxed_expr(right),
            },
            Expr::Unary { op, expr } => Expr::Unary {
                op: *op,
                expr: self.boxed_expr(expr),
            },
            Expr::Assign { target, value } => Expr::Assign {
                target: self.boxed_expr(target),
                value: self.boxed_expr(value),
            },
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => Expr::Conditional {
                test: self.boxed_expr(test),
                consequent: self.boxed_expr(consequent),
                alternate: self.boxed_expr(alternate),
            },
            Expr::Cast { ty, expr } => Expr::Cast {
                ty: self.type_ref(ty),
                expr: self.boxed_expr(expr),
            },
            Expr::InstanceOf { expr, ty } => Expr::InstanceOf {
                expr: self.boxed_expr(expr),
                ty: self.type_ref(ty),
            },
            Expr::AnonymousClass { ty, span } => {
                self.warnings.warning(
                    *span,
                    &format!("anonymous class of '{}' is not supported", ty.simple_name()),
                );
                Expr::Placeholder(format!("anonymous {}", ty.simple_name()))
            }
        }
    }
}

fn type_modifiers(modifiers: &[Modifier]) -> Vec<String> {
    modifiers
        .iter()
        .filter_map(|m| match m {
            Modifier::Public => Some("public"),
            Modifier::Protected => Some("protected"),
            Modifier::Private => Some("private"),
            Modifier::Static => Some("static"),
            Modifier::Abstract => Some("abstract"),
            Modifier::Final => Some("sealed"),
            Modifier::Native | Modifier::Synchronized => None,
        })
        .map(str::to_string)
        .collect()
}

fn member_modifiers(modifiers: &[Modifier], is_field: bool) -> Vec<String> {
    modifiers
        .iter()
        .filter_map(|m| match m {
            Modifier::Public => Some("public"),
            Modifier::Protected => Some("protected"),
            Modifier::Private => Some("private"),
            Modifier::Static => Some("static"),
            Modifier::Abstract => Some("abstract"),
            Modifier::Final if is_field => Some("readonly"),
            Modifier::Final | Modifier::Native | Modifier::Synchronized => None,
        })
        .map(str::to_string)
        .collect()
}
