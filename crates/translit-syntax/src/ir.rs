//! Statement and expression IR shared by the source and target trees.
//!
//! Declarations differ between the two languages and live in
//! [`crate::source`] and [`crate::target`]; method bodies use this common
//! IR on both sides. A few variants only ever appear on one side:
//! `Labeled` and `AnonymousClass` come from the source front-end and have no
//! target counterpart, while `Placeholder` is produced by the translator
//! where a construct could not be mapped.

use serde::{Deserialize, Serialize};

/// Position of a node in its unit's source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: usize,
    /// Length in bytes.
    pub len: usize,
    /// 1-based line of `start`.
    pub line: u32,
}

impl Span {
    pub fn new(start: usize, len: usize, line: u32) -> Self {
        Self { start, len, line }
    }

    /// One past the last character, clamped to `usize::MAX`.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.len)
    }
}

/// A reference to a type.
///
/// On the source side `name` is a fully qualified identity
/// (`java.util.List`, `int`); on the target side it is the printed name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeRef>,
    /// Array dimensions.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub dims: u8,
}

fn is_zero(n: &u8) -> bool {
    *n == 0
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            dims: 0,
        }
    }

    pub fn with_args(mut self, args: Vec<TypeRef>) -> Self {
        self.args = args;
        self
    }

    pub fn array(mut self) -> Self {
        self.dims += 1;
        self
    }

    /// Last segment of a qualified name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }
}

/// Last segment of a dotted name.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Literal(Literal),
    /// Local variable, parameter or unqualified field.
    Ident(String),
    This,
    /// A type used as an expression, e.g. the target of a static call.
    Type(TypeRef),
    Field {
        object: Box<Expr>,
        name: String,
    },
    Call {
        #[serde(default)]
        target: Option<Box<Expr>>,
        method: String,
        /// Qualified identity of the called method (`pkg.Type.method`),
        /// when the front-end resolved it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        binding: Option<String>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    New {
        ty: TypeRef,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
    },
    InstanceOf {
        expr: Box<Expr>,
        ty: TypeRef,
    },
    /// Instance creation with an inline class body.
    AnonymousClass {
        ty: TypeRef,
        span: Span,
    },
    /// Stand-in for an expression that could not be translated.
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: String,
    pub ty: TypeRef,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Expr(Expr),
    Local {
        name: String,
        ty: TypeRef,
        #[serde(default)]
        init: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        test: Expr,
        consequent: Box<Stmt>,
        #[serde(default)]
        alternate: Option<Box<Stmt>>,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    For {
        #[serde(default)]
        init: Vec<Stmt>,
        #[serde(default)]
        test: Option<Expr>,
        #[serde(default)]
        update: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForEach {
        variable: String,
        ty: TypeRef,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Throw(Expr),
    Try {
        body: Vec<Stmt>,
        #[serde(default)]
        catches: Vec<CatchClause>,
        #[serde(default)]
        finally: Option<Vec<Stmt>>,
    },
    Labeled {
        label: String,
        body: Box<Stmt>,
        span: Span,
    },
    /// Stand-in for a statement that could not be translated.
    Placeholder(String),
}

// Builders, mostly for tests and hand-built trees.

impl Expr {
    pub fn int(n: i64) -> Self {
        Expr::Literal(Literal::Int(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn bool(b: bool) -> Self {
        Expr::Literal(Literal::Bool(b))
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn field(object: Expr, name: impl Into<String>) -> Self {
        Expr::Field {
            object: Box::new(object),
            name: name.into(),
        }
    }

    pub fn call(target: Option<Expr>, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            target: target.map(Box::new),
            method: method.into(),
            binding: None,
            args,
        }
    }

    /// A call whose method identity is known.
    pub fn bound_call(
        target: Option<Expr>,
        binding: impl Into<String>,
        args: Vec<Expr>,
    ) -> Self {
        let binding = binding.into();
        Expr::Call {
            target: target.map(Box::new),
            method: simple_name(&binding).to_string(),
            binding: Some(binding),
            args,
        }
    }

    pub fn new_object(ty: TypeRef, args: Vec<Expr>) -> Self {
        Expr::New { ty, args }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Expr::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn local(name: impl Into<String>, ty: TypeRef, init: Option<Expr>) -> Self {
        Stmt::Local {
            name: name.into(),
            ty,
            init,
        }
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Block(stmts)
    }

    pub fn if_stmt(test: Expr, consequent: Stmt, alternate: Option<Stmt>) -> Self {
        Stmt::If {
            test,
            consequent: Box::new(consequent),
            alternate: alternate.map(Box::new),
        }
    }

    pub fn while_loop(test: Expr, body: Stmt) -> Self {
        Stmt::While {
            test,
            body: Box::new(body),
        }
    }

    pub fn for_each(variable: impl Into<String>, ty: TypeRef, iterable: Expr, body: Stmt) -> Self {
        Stmt::ForEach {
            variable: variable.into(),
            ty,
            iterable,
            body: Box::new(body),
        }
    }

    pub fn return_stmt(expr: Option<Expr>) -> Self {
        Stmt::Return(expr)
    }
}
