//! Target-language syntax tree.

use crate::ir::{Stmt, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// What a source identity translates to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRef {
    /// A type in an optional namespace.
    Type {
        namespace: Option<String>,
        name: String,
    },
    /// A member of a translated type. `owner` is the owner's full target name.
    Member { owner: String, name: String },
}

impl TargetRef {
    pub fn ty(namespace: Option<String>, name: impl Into<String>) -> Self {
        TargetRef::Type {
            namespace,
            name: name.into(),
        }
    }

    pub fn member(owner: impl Into<String>, name: impl Into<String>) -> Self {
        TargetRef::Member {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// The name used at a reference site.
    pub fn name(&self) -> &str {
        match self {
            TargetRef::Type { name, .. } | TargetRef::Member { name, .. } => name,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            TargetRef::Type { namespace, .. } => namespace.as_deref(),
            TargetRef::Member { .. } => None,
        }
    }

    /// Namespace-qualified name.
    pub fn full_name(&self) -> String {
        match self {
            TargetRef::Type {
                namespace: Some(ns),
                name,
            } => format!("{ns}.{name}"),
            TargetRef::Type { name, .. } => name.clone(),
            TargetRef::Member { owner, name } => format!("{owner}.{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

impl TypeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Member {
    Field {
        name: String,
        ty: TypeRef,
        modifiers: Vec<String>,
        init: Option<crate::ir::Expr>,
    },
    Method {
        name: String,
        params: Vec<Param>,
        /// `None` prints as `void`.
        return_type: Option<TypeRef>,
        modifiers: Vec<String>,
        /// `None` prints a bodiless declaration (`;`).
        body: Option<Vec<Stmt>>,
    },
    Constructor {
        name: String,
        params: Vec<Param>,
        modifiers: Vec<String>,
        body: Vec<Stmt>,
    },
    Type(TypeDecl),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Vec<String>,
    pub bases: Vec<TypeRef>,
    pub constants: Vec<String>,
    pub members: Vec<Member>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: Vec::new(),
            bases: Vec::new(),
            constants: Vec::new(),
            members: Vec::new(),
        }
    }
}

/// The translation of one [`crate::SourceUnit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetUnit {
    /// Path of the unit this was translated from.
    pub path: PathBuf,
    pub namespace: Option<String>,
    pub usings: BTreeSet<String>,
    pub types: Vec<TypeDecl>,
    /// Valid translation that must not be emitted.
    pub suppressed: bool,
}

impl TargetUnit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            namespace: None,
            usings: BTreeSet::new(),
            types: Vec::new(),
            suppressed: false,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    pub fn suppressed(path: impl Into<PathBuf>) -> Self {
        Self {
            suppressed: true,
            ..Self::new(path)
        }
    }
}
