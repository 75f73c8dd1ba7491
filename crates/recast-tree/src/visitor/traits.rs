// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor and Transformer trait definitions.

use crate::nodes::{
    Block, ClassDecl, CompilationUnit, Expr, FieldAccess, FieldDecl, Ident, Import, MethodCall,
    MethodDecl, NewClass, TypeName,
};

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    ///
    /// After visiting children, `leave_*` will be called for this node.
    #[default]
    Continue,

    /// Skip children, continue with siblings.
    ///
    /// `leave_*` is still called for this node.
    SkipChildren,

    /// Stop traversal entirely. No further `visit_*` or `leave_*` methods
    /// are called.
    Stop,
}

/// Outcome of a transformer hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite<T> {
    /// Keep the node as it is.
    Unchanged,
    /// Replace the node. Traversal continues into the replacement's children.
    Replaced(T),
}

impl<T> Rewrite<T> {
    /// Returns true if this is a `Replaced` variant.
    pub fn is_replaced(&self) -> bool {
        matches!(self, Self::Replaced(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Rewrite::Unchanged => None,
            Rewrite::Replaced(node) => Some(node),
        }
    }

    /// The replacement, or `original` when unchanged.
    pub fn unwrap_or(self, original: T) -> T {
        self.into_option().unwrap_or(original)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Rewrite<U> {
        match self {
            Rewrite::Unchanged => Rewrite::Unchanged,
            Rewrite::Replaced(node) => Rewrite::Replaced(f(node)),
        }
    }
}

impl<T> From<Option<T>> for Rewrite<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(node) => Rewrite::Replaced(node),
            None => Rewrite::Unchanged,
        }
    }
}

/// Generate `visit_*` / `leave_*` pairs with default implementations.
macro_rules! visitor_methods {
    (
        $(
            $(#[$meta:meta])*
            $base_name:ident : $node_type:ty
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                $(#[$meta])*
                #[doc = concat!("Visit a [`", stringify!($node_type), "`] node.")]
                #[allow(unused_variables)]
                fn [<visit_ $base_name>](&mut self, node: &$node_type) -> VisitResult {
                    VisitResult::Continue
                }

                $(#[$meta])*
                #[doc = concat!("Leave a [`", stringify!($node_type), "`] node.")]
                #[allow(unused_variables)]
                fn [<leave_ $base_name>](&mut self, node: &$node_type) {}
            )*
        }
    };
}

/// Generate `transform_*` hooks that leave the node unchanged by default.
macro_rules! transformer_methods {
    (
        $(
            $(#[$meta:meta])*
            $base_name:ident : $node_type:ty => $output:ty
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                $(#[$meta])*
                #[allow(unused_variables)]
                fn [<transform_ $base_name>](&mut self, node: &$node_type) -> Rewrite<$output> {
                    Rewrite::Unchanged
                }
            )*
        }
    };
}

/// Read-only traversal.
///
/// `visit_*` is called in pre-order, `leave_*` in post-order, and children
/// are visited in source order.
///
/// # Example
///
/// ```
/// use recast_tree::parse_compilation_unit;
/// use recast_tree::nodes::TypeName;
/// use recast_tree::visitor::{walk_compilation_unit, VisitResult, Visitor};
///
/// struct TypeNames(Vec<String>);
///
/// impl Visitor for TypeNames {
///     fn visit_type_name(&mut self, node: &TypeName) -> VisitResult {
///         self.0.push(node.name.clone());
///         VisitResult::Continue
///     }
/// }
///
/// let unit = parse_compilation_unit("class A extends B<C> {}").expect("parse error");
/// let mut names = TypeNames(Vec::new());
/// walk_compilation_unit(&mut names, &unit);
/// assert_eq!(names.0, vec!["B", "C"]);
/// ```
pub trait Visitor {
    visitor_methods! {
        compilation_unit: CompilationUnit,
        import: Import,
        class_decl: ClassDecl,
        field_decl: FieldDecl,
        method_decl: MethodDecl,
        block: Block,
        /// Type references in any position: supertypes, field and variable
        /// types, type arguments, `new` targets.
        type_name: TypeName,
        /// Marker annotations among a declaration's modifiers.
        annotation: Ident,
        expr: Expr,
        /// A bare name in expression position.
        name_expr: Ident,
        field_access: FieldAccess,
        method_call: MethodCall,
        new_class: NewClass,
    }
}

/// Rewriting traversal.
///
/// Each hook sees a node once, before its children. Returning
/// [`Rewrite::Replaced`] substitutes the node; the walk then continues into
/// the replacement's children rather than the original's. Parents are rebuilt
/// only when some descendant changed.
pub trait Transformer {
    transformer_methods! {
        class_decl: ClassDecl => ClassDecl,
        type_name: TypeName => TypeName,
        name_expr: Ident => Expr,
        field_access: FieldAccess => Expr,
        method_call: MethodCall => Expr,
    }
}
