// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node types for the recast syntax tree.
//!
//! Every node carries its leading trivia ([`Space`]: whitespace and comments
//! that precede its first token) so that printing a tree reproduces the
//! parsed source exactly. Expression nodes are the one exception: a compound
//! expression (`a.b`, `a + b`, `a.f()`) has no trivia of its own, the
//! leftmost leaf carries it.
//!
//! # Identity
//!
//! [`NodeId`]s identify nodes for matching and reporting only. A rewritten
//! node keeps the id of the node it replaces; nodes synthesized by a rewrite
//! draw fresh ids from the [`CompilationUnit`]'s [`IdGen`].
//!
//! # Sharing
//!
//! Declarations, members, statements and compound expressions are held in
//! [`Arc`]s. Rebuilding a parent after one child changed clones the `Arc`s
//! of its siblings, so untouched subtrees are shared between the old and the
//! new tree.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ============================================================================
// Identity and trivia
// ============================================================================

/// A stable identifier for a node, assigned in pre-order by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Get the raw u32 value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Allocator for fresh [`NodeId`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdGen {
    next: u32,
}

impl IdGen {
    /// Create an allocator whose first id is `next`.
    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }

    /// Allocate a new id.
    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`IdGen::fresh`] will return.
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// Leading trivia: the exact whitespace and comments before a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Space(String);

impl Space {
    /// Create trivia from its exact text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// No trivia at all.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// A single line break.
    pub fn newline() -> Self {
        Self("\n".to_string())
    }

    /// A line break followed by one empty line.
    pub fn blank_line() -> Self {
        Self("\n\n".to_string())
    }

    /// A single space.
    pub fn single() -> Self {
        Self(" ".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the trivia contains an empty line.
    ///
    /// Imports separated by an empty line belong to different groups.
    pub fn has_blank_line(&self) -> bool {
        let lines: Vec<&str> = self.0.split('\n').collect();
        if lines.len() < 3 {
            return false;
        }
        lines[1..lines.len() - 1]
            .iter()
            .any(|line| line.trim_matches(|c| c == ' ' || c == '\t' || c == '\r').is_empty())
    }

    /// Returns true if the trivia contains a `//` or `/* */` comment.
    pub fn has_comment(&self) -> bool {
        self.0.contains("//") || self.0.contains("/*")
    }
}

impl From<&str> for Space {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// An element of a comma-separated list, with the trivia before the comma
/// that follows it. The last element's `after` is always empty; the list's
/// closing trivia lives on the list itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padded<T> {
    pub elem: T,
    pub after: Space,
}

impl<T> Padded<T> {
    pub fn new(elem: T, after: Space) -> Self {
        Self { elem, after }
    }

    /// Wrap an element with no trivia before its comma.
    pub fn bare(elem: T) -> Self {
        Self {
            elem,
            after: Space::empty(),
        }
    }

    /// Replace the element, keeping the separator trivia.
    pub fn with_elem(&self, elem: T) -> Self {
        Self {
            elem,
            after: self.after.clone(),
        }
    }
}

// ============================================================================
// Names and types
// ============================================================================

/// An identifier token: a simple name, a modifier keyword, or a marker
/// annotation such as `@Override`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub id: NodeId,
    pub prefix: Space,
    pub name: String,
}

impl Ident {
    pub fn new(id: NodeId, prefix: Space, name: impl Into<String>) -> Self {
        Self {
            id,
            prefix,
            name: name.into(),
        }
    }

    /// Return a copy spelled `name`, keeping id and trivia.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            id: self.id,
            prefix: self.prefix.clone(),
            name: name.into(),
        }
    }

    /// Returns true if this identifier is a marker annotation (`@Name`).
    pub fn is_annotation(&self) -> bool {
        self.name.starts_with('@')
    }
}

/// A type reference: `Vehicle`, `java.util.List<String>`, `Map<K, V>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeName {
    pub id: NodeId,
    pub prefix: Space,
    /// The name exactly as spelled, possibly dotted.
    pub name: String,
    pub type_args: Option<TypeArguments>,
    /// Fully-qualified name, when an external resolver supplied it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
}

impl TypeName {
    pub fn new(id: NodeId, prefix: Space, name: impl Into<String>) -> Self {
        Self {
            id,
            prefix,
            name: name.into(),
            type_args: None,
            resolved: None,
        }
    }

    /// The last segment of the spelled name.
    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.name)
    }

    /// Returns true if the name is spelled with a package or outer type.
    pub fn is_qualified(&self) -> bool {
        self.name.contains('.')
    }

    /// Return a copy spelled `name`, keeping id, trivia and type arguments.
    ///
    /// The resolution is dropped because it described the old name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            id: self.id,
            prefix: self.prefix.clone(),
            name: name.into(),
            type_args: self.type_args.clone(),
            resolved: None,
        }
    }

    pub fn with_resolved(mut self, fqn: impl Into<String>) -> Self {
        self.resolved = Some(fqn.into());
        self
    }

    pub fn with_type_args(&self, type_args: Option<TypeArguments>) -> Self {
        Self {
            type_args,
            ..self.clone()
        }
    }
}

/// The last segment of a dotted name.
pub fn simple_name_of(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Everything before the last segment of a dotted name.
pub fn qualifier_of(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(qualifier, _)| qualifier)
}

/// A `<...>` list of type arguments or type parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeArguments {
    pub id: NodeId,
    /// Trivia before `<`.
    pub prefix: Space,
    pub args: Vec<Padded<TypeName>>,
    /// Trivia before `>`.
    pub close: Space,
}

// ============================================================================
// Module level
// ============================================================================

/// One parsed source module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub id: NodeId,
    pub package: Option<PackageDecl>,
    pub imports: Vec<Import>,
    pub types: Vec<Arc<ClassDecl>>,
    /// Trivia before end of file.
    pub eof: Space,
    /// First id not used by any node in this tree.
    pub next_id: u32,
}

impl CompilationUnit {
    /// The declared package, if any.
    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.name.as_str())
    }

    /// An allocator for ids that do not collide with this tree's nodes.
    pub fn id_gen(&self) -> IdGen {
        IdGen::starting_at(self.next_id)
    }

    pub fn with_imports(&self, imports: Vec<Import>) -> Self {
        Self {
            imports,
            ..self.clone()
        }
    }

    pub fn with_types(&self, types: Vec<Arc<ClassDecl>>) -> Self {
        Self {
            types,
            ..self.clone()
        }
    }

    pub fn with_next_id(mut self, next_id: u32) -> Self {
        self.next_id = self.next_id.max(next_id);
        self
    }

    /// Single-type, non-static imports in source order.
    pub fn type_imports(&self) -> impl Iterator<Item = &Import> {
        self.imports.iter().filter(|i| !i.is_static() && !i.wildcard)
    }
}

/// `package com.example;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDecl {
    pub id: NodeId,
    pub prefix: Space,
    pub name_prefix: Space,
    pub name: String,
    pub semi: Space,
}

/// `import com.example.Type;`, `import com.example.*;` or
/// `import static com.example.Type.MEMBER;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub id: NodeId,
    pub prefix: Space,
    /// Trivia before `static`; `None` for a non-static import.
    pub static_prefix: Option<Space>,
    pub name_prefix: Space,
    /// The imported name without a trailing `.*`.
    pub name: String,
    pub wildcard: bool,
    pub semi: Space,
}

impl Import {
    /// A single-type import printed as `import <name>;` after `prefix`.
    pub fn single(id: NodeId, prefix: Space, name: impl Into<String>) -> Self {
        Self {
            id,
            prefix,
            static_prefix: None,
            name_prefix: Space::single(),
            name: name.into(),
            wildcard: false,
            semi: Space::empty(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.static_prefix.is_some()
    }

    /// The simple name bound by a single-type import.
    pub fn simple_name(&self) -> Option<&str> {
        if self.wildcard {
            None
        } else {
            Some(simple_name_of(&self.name))
        }
    }

    pub fn with_prefix(&self, prefix: Space) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// The keyword introducing a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
}

impl ClassKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
        }
    }
}

/// A class or interface declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub id: NodeId,
    pub prefix: Space,
    pub modifiers: Vec<Ident>,
    /// Trivia before the `class`/`interface` keyword.
    pub kind_prefix: Space,
    pub kind: ClassKind,
    pub name: Ident,
    pub type_params: Option<TypeArguments>,
    pub extends: Option<TypeClause>,
    pub implements: Option<TypeClause>,
    pub body: ClassBody,
}

impl ClassDecl {
    /// The superclass of a class that extends exactly one type.
    pub fn superclass(&self) -> Option<&TypeName> {
        if self.kind != ClassKind::Class {
            return None;
        }
        match self.extends.as_ref().map(|clause| clause.types.as_slice()) {
            Some([single]) => Some(&single.elem),
            _ => None,
        }
    }

    /// Return a copy whose single `extends` type is `superclass`.
    ///
    /// Returns `None` when the declaration has no single superclass slot.
    pub fn with_superclass(&self, superclass: TypeName) -> Option<Self> {
        self.superclass()?;
        let clause = self.extends.as_ref()?;
        let types = vec![clause.types[0].with_elem(superclass)];
        Some(Self {
            extends: Some(TypeClause {
                types,
                ..clause.clone()
            }),
            ..self.clone()
        })
    }

    pub fn with_body(&self, body: ClassBody) -> Self {
        Self {
            body,
            ..self.clone()
        }
    }
}

/// `extends A` or `implements A, B<T>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeClause {
    pub id: NodeId,
    /// Trivia before the keyword.
    pub prefix: Space,
    pub types: Vec<Padded<TypeName>>,
}

/// `{ members }` of a type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBody {
    pub id: NodeId,
    /// Trivia before `{`.
    pub prefix: Space,
    pub members: Vec<Member>,
    /// Trivia before `}`.
    pub end: Space,
}

/// A member of a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Member {
    Field(Arc<FieldDecl>),
    Method(Arc<MethodDecl>),
    Class(Arc<ClassDecl>),
}

/// `private static final int MAX = 10;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub id: NodeId,
    pub prefix: Space,
    pub modifiers: Vec<Ident>,
    pub ty: TypeName,
    pub name: Ident,
    pub init: Option<Initializer>,
    /// Trivia before `;`.
    pub semi: Space,
}

/// `= value` of a field or local variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initializer {
    /// Trivia before `=`.
    pub prefix: Space,
    pub value: Expr,
}

/// A method or constructor. Constructors have no return type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub id: NodeId,
    pub prefix: Space,
    pub modifiers: Vec<Ident>,
    pub return_type: Option<TypeName>,
    pub name: Ident,
    pub params: Parameters,
    pub body: MethodBody,
}

/// `(int a, String b)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    /// Trivia before `(`.
    pub prefix: Space,
    pub params: Vec<Padded<Param>>,
    /// Trivia before `)`.
    pub close: Space,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub id: NodeId,
    pub prefix: Space,
    pub modifiers: Vec<Ident>,
    pub ty: TypeName,
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodBody {
    Block(Block),
    /// A body-less declaration; holds the trivia before `;`.
    Abstract(Space),
}

// ============================================================================
// Statements
// ============================================================================

/// `{ statements }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: NodeId,
    /// Trivia before `{`.
    pub prefix: Space,
    pub statements: Vec<Stmt>,
    /// Trivia before `}`.
    pub end: Space,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    Expr(Arc<ExprStmt>),
    LocalVar(Arc<LocalVar>),
    Return(Arc<Return>),
    Block(Arc<Block>),
}

/// `expr;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub id: NodeId,
    pub prefix: Space,
    pub expr: Expr,
    pub semi: Space,
}

/// `final int x = expr;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVar {
    pub id: NodeId,
    pub prefix: Space,
    pub modifiers: Vec<Ident>,
    pub ty: TypeName,
    pub name: Ident,
    pub init: Option<Initializer>,
    pub semi: Space,
}

/// `return expr;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Return {
    pub id: NodeId,
    pub prefix: Space,
    pub value: Option<Expr>,
    pub semi: Space,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Name(Ident),
    FieldAccess(Arc<FieldAccess>),
    MethodCall(Arc<MethodCall>),
    New(Arc<NewClass>),
    Literal(Literal),
    Binary(Arc<Binary>),
    Parens(Arc<Parens>),
}

impl Expr {
    /// The trivia before the expression's first token.
    pub fn prefix(&self) -> &Space {
        match self {
            Expr::Name(ident) => &ident.prefix,
            Expr::FieldAccess(access) => access.target.prefix(),
            Expr::MethodCall(call) => match &call.target {
                Some(target) => target.prefix(),
                None => &call.name.prefix,
            },
            Expr::New(new) => &new.prefix,
            Expr::Literal(lit) => &lit.prefix,
            Expr::Binary(bin) => bin.left.prefix(),
            Expr::Parens(parens) => &parens.prefix,
        }
    }

    /// The dotted name this expression spells, if it is a plain name chain
    /// such as `Constants` or `com.acme.Constants`.
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Expr::Name(ident) => Some(ident.name.clone()),
            Expr::FieldAccess(access) => {
                let mut name = access.target.dotted_name()?;
                name.push('.');
                name.push_str(&access.name.name);
                Some(name)
            }
            _ => None,
        }
    }

    pub fn id(&self) -> NodeId {
        match self {
            Expr::Name(ident) => ident.id,
            Expr::FieldAccess(access) => access.id,
            Expr::MethodCall(call) => call.id,
            Expr::New(new) => new.id,
            Expr::Literal(lit) => lit.id,
            Expr::Binary(bin) => bin.id,
            Expr::Parens(parens) => parens.id,
        }
    }
}

/// `target.name`; a reference to a member when `target` names a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAccess {
    pub id: NodeId,
    pub target: Expr,
    /// Trivia before `.`.
    pub dot: Space,
    pub name: Ident,
    /// Fully-qualified owning type, when an external resolver supplied it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// `target.name(args)` or `name(args)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    pub id: NodeId,
    pub target: Option<Expr>,
    /// Trivia before `.`; empty when there is no target.
    pub dot: Space,
    pub name: Ident,
    pub args: Arguments,
}

/// `new Type(args)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClass {
    pub id: NodeId,
    pub prefix: Space,
    pub ty: TypeName,
    pub args: Arguments,
}

/// A literal token spelled exactly as in source: `10`, `"text"`, `'c'`, `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub id: NodeId,
    pub prefix: Space,
    pub text: String,
}

/// `left op right`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    pub id: NodeId,
    pub left: Expr,
    pub op_prefix: Space,
    pub op: String,
    pub right: Expr,
}

/// `(inner)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parens {
    pub id: NodeId,
    pub prefix: Space,
    pub inner: Expr,
    /// Trivia before `)`.
    pub close: Space,
}

/// `(a, b)` of a call or instance creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arguments {
    /// Trivia before `(`.
    pub prefix: Space,
    pub args: Vec<Padded<Expr>>,
    /// Trivia before `)`.
    pub close: Space,
}
