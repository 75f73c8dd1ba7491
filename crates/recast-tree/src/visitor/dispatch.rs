// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Walk and rewrite functions.
//!
//! `walk_*` functions drive a [`Visitor`]:
//!
//! - `VisitResult::Continue` - traverse into children
//! - `VisitResult::SkipChildren` - skip children but still call `leave_*`
//! - `VisitResult::Stop` - halt traversal immediately (no `leave_*` called)
//!
//! `rewrite_*` functions drive a [`Transformer`] and return `None` when
//! nothing below the node changed. A rebuilt parent clones the `Arc`s of its
//! unchanged children, so untouched subtrees are shared with the input tree.

use std::sync::Arc;

use super::traits::{Rewrite, Transformer, VisitResult, Visitor};
use crate::nodes::{
    Arguments, Binary, Block, ClassBody, ClassDecl, CompilationUnit, Expr, ExprStmt, FieldAccess,
    FieldDecl, Ident, Initializer, LocalVar, Member, MethodBody, MethodCall, MethodDecl, NewClass,
    Padded, Param, Parameters, Parens, Return, Stmt, TypeArguments, TypeClause, TypeName,
};

/// Return early from a walk function when a child walk stopped.
macro_rules! walk_or_stop {
    ($walk:expr) => {
        if $walk == VisitResult::Stop {
            return VisitResult::Stop;
        }
    };
}

// ============================================================================
// Visitor walks
// ============================================================================

/// Walk a [`CompilationUnit`]: imports, then type declarations.
pub fn walk_compilation_unit<V: Visitor + ?Sized>(
    visitor: &mut V,
    node: &CompilationUnit,
) -> VisitResult {
    match visitor.visit_compilation_unit(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            for import in &node.imports {
                walk_or_stop!(visitor.visit_import(import));
                visitor.leave_import(import);
            }
            for decl in &node.types {
                walk_or_stop!(walk_class_decl(visitor, decl));
            }
        }
    }
    visitor.leave_compilation_unit(node);
    VisitResult::Continue
}

/// Walk a [`ClassDecl`].
///
/// Traversal order:
/// 1. `visit_class_decl`
/// 2. Annotations among the modifiers
/// 3. Type parameters, `extends` types, `implements` types
/// 4. Members in source order
/// 5. `leave_class_decl`
pub fn walk_class_decl<V: Visitor + ?Sized>(visitor: &mut V, node: &ClassDecl) -> VisitResult {
    match visitor.visit_class_decl(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            walk_or_stop!(walk_annotations(visitor, &node.modifiers));
            if let Some(params) = &node.type_params {
                walk_or_stop!(walk_type_arguments(visitor, params));
            }
            for clause in [&node.extends, &node.implements].into_iter().flatten() {
                for ty in &clause.types {
                    walk_or_stop!(walk_type_name(visitor, &ty.elem));
                }
            }
            for member in &node.body.members {
                walk_or_stop!(walk_member(visitor, member));
            }
        }
    }
    visitor.leave_class_decl(node);
    VisitResult::Continue
}

fn walk_annotations<V: Visitor + ?Sized>(visitor: &mut V, modifiers: &[Ident]) -> VisitResult {
    for annotation in modifiers.iter().filter(|m| m.is_annotation()) {
        walk_or_stop!(visitor.visit_annotation(annotation));
        visitor.leave_annotation(annotation);
    }
    VisitResult::Continue
}

/// Walk a [`TypeName`] and its type arguments.
pub fn walk_type_name<V: Visitor + ?Sized>(visitor: &mut V, node: &TypeName) -> VisitResult {
    match visitor.visit_type_name(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            if let Some(args) = &node.type_args {
                walk_or_stop!(walk_type_arguments(visitor, args));
            }
        }
    }
    visitor.leave_type_name(node);
    VisitResult::Continue
}

fn walk_type_arguments<V: Visitor + ?Sized>(visitor: &mut V, node: &TypeArguments) -> VisitResult {
    for arg in &node.args {
        walk_or_stop!(walk_type_name(visitor, &arg.elem));
    }
    VisitResult::Continue
}

fn walk_member<V: Visitor + ?Sized>(visitor: &mut V, node: &Member) -> VisitResult {
    match node {
        Member::Field(field) => walk_field_decl(visitor, field),
        Member::Method(method) => walk_method_decl(visitor, method),
        Member::Class(class) => walk_class_decl(visitor, class),
    }
}

pub fn walk_field_decl<V: Visitor + ?Sized>(visitor: &mut V, node: &FieldDecl) -> VisitResult {
    match visitor.visit_field_decl(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            walk_or_stop!(walk_annotations(visitor, &node.modifiers));
            walk_or_stop!(walk_type_name(visitor, &node.ty));
            if let Some(init) = &node.init {
                walk_or_stop!(walk_expr(visitor, &init.value));
            }
        }
    }
    visitor.leave_field_decl(node);
    VisitResult::Continue
}

pub fn walk_method_decl<V: Visitor + ?Sized>(visitor: &mut V, node: &MethodDecl) -> VisitResult {
    match visitor.visit_method_decl(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            walk_or_stop!(walk_annotations(visitor, &node.modifiers));
            if let Some(ty) = &node.return_type {
                walk_or_stop!(walk_type_name(visitor, ty));
            }
            for param in &node.params.params {
                walk_or_stop!(walk_annotations(visitor, &param.elem.modifiers));
                walk_or_stop!(walk_type_name(visitor, &param.elem.ty));
            }
            if let MethodBody::Block(block) = &node.body {
                walk_or_stop!(walk_block(visitor, block));
            }
        }
    }
    visitor.leave_method_decl(node);
    VisitResult::Continue
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, node: &Block) -> VisitResult {
    match visitor.visit_block(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            for stmt in &node.statements {
                walk_or_stop!(walk_stmt(visitor, stmt));
            }
        }
    }
    visitor.leave_block(node);
    VisitResult::Continue
}

fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, node: &Stmt) -> VisitResult {
    match node {
        Stmt::Expr(stmt) => walk_expr(visitor, &stmt.expr),
        Stmt::LocalVar(var) => {
            walk_or_stop!(walk_annotations(visitor, &var.modifiers));
            walk_or_stop!(walk_type_name(visitor, &var.ty));
            match &var.init {
                Some(init) => walk_expr(visitor, &init.value),
                None => VisitResult::Continue,
            }
        }
        Stmt::Return(ret) => match &ret.value {
            Some(value) => walk_expr(visitor, value),
            None => VisitResult::Continue,
        },
        Stmt::Block(block) => walk_block(visitor, block),
    }
}

/// Walk an [`Expr`]. `visit_expr` is called first, then the hook for the
/// specific expression kind.
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, node: &Expr) -> VisitResult {
    match visitor.visit_expr(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => match node {
            Expr::Name(ident) => {
                walk_or_stop!(visitor.visit_name_expr(ident));
                visitor.leave_name_expr(ident);
            }
            Expr::FieldAccess(access) => walk_or_stop!(walk_field_access(visitor, access)),
            Expr::MethodCall(call) => walk_or_stop!(walk_method_call(visitor, call)),
            Expr::New(new) => walk_or_stop!(walk_new_class(visitor, new)),
            Expr::Literal(_) => {}
            Expr::Binary(bin) => {
                walk_or_stop!(walk_expr(visitor, &bin.left));
                walk_or_stop!(walk_expr(visitor, &bin.right));
            }
            Expr::Parens(parens) => walk_or_stop!(walk_expr(visitor, &parens.inner)),
        },
    }
    visitor.leave_expr(node);
    VisitResult::Continue
}

fn walk_field_access<V: Visitor + ?Sized>(visitor: &mut V, node: &FieldAccess) -> VisitResult {
    match visitor.visit_field_access(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => walk_or_stop!(walk_expr(visitor, &node.target)),
    }
    visitor.leave_field_access(node);
    VisitResult::Continue
}

fn walk_method_call<V: Visitor + ?Sized>(visitor: &mut V, node: &MethodCall) -> VisitResult {
    match visitor.visit_method_call(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            if let Some(target) = &node.target {
                walk_or_stop!(walk_expr(visitor, target));
            }
            walk_or_stop!(walk_arguments(visitor, &node.args));
        }
    }
    visitor.leave_method_call(node);
    VisitResult::Continue
}

fn walk_new_class<V: Visitor + ?Sized>(visitor: &mut V, node: &NewClass) -> VisitResult {
    match visitor.visit_new_class(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            walk_or_stop!(walk_type_name(visitor, &node.ty));
            walk_or_stop!(walk_arguments(visitor, &node.args));
        }
    }
    visitor.leave_new_class(node);
    VisitResult::Continue
}

fn walk_arguments<V: Visitor + ?Sized>(visitor: &mut V, node: &Arguments) -> VisitResult {
    for arg in &node.args {
        walk_or_stop!(walk_expr(visitor, &arg.elem));
    }
    VisitResult::Continue
}

// ============================================================================
// Transformer drivers
// ============================================================================

/// Rewrite each element of a list, cloning the list only once an element
/// changed. Returns `None` when every element was left alone.
pub fn rewrite_each<T: Clone>(
    items: &[T],
    mut rewrite: impl FnMut(&T) -> Option<T>,
) -> Option<Vec<T>> {
    let mut out: Option<Vec<T>> = None;
    for (i, item) in items.iter().enumerate() {
        match (rewrite(item), out.as_mut()) {
            (Some(new), Some(out)) => out.push(new),
            (Some(new), None) => {
                let mut rebuilt = items[..i].to_vec();
                rebuilt.push(new);
                out = Some(rebuilt);
            }
            (None, Some(out)) => out.push(item.clone()),
            (None, None) => {}
        }
    }
    out
}

fn rewrite_padded<T: Clone>(
    items: &[Padded<T>],
    mut rewrite: impl FnMut(&T) -> Option<T>,
) -> Option<Vec<Padded<T>>> {
    rewrite_each(items, |item| rewrite(&item.elem).map(|elem| item.with_elem(elem)))
}

fn rewrite_opt<T>(item: &Option<T>, rewrite: impl FnOnce(&T) -> Option<T>) -> Option<Option<T>> {
    item.as_ref().and_then(rewrite).map(Some)
}

/// Run the hook's children pass over the replacement when there is one.
fn with_children<N>(
    original: &N,
    replaced: Option<N>,
    children: impl FnOnce(&N) -> Option<N>,
) -> Option<N> {
    let base = replaced.as_ref().unwrap_or(original);
    let rebuilt = children(base);
    rebuilt.or(replaced)
}

/// Rewrite a whole module. Imports are left to the caller.
pub fn rewrite_compilation_unit<T: Transformer + ?Sized>(
    transformer: &mut T,
    node: &CompilationUnit,
) -> Option<CompilationUnit> {
    let types = rewrite_each(&node.types, |decl| {
        rewrite_class_decl(transformer, decl).map(Arc::new)
    })?;
    Some(node.with_types(types))
}

pub fn rewrite_class_decl<T: Transformer + ?Sized>(
    transformer: &mut T,
    node: &ClassDecl,
) -> Option<ClassDecl> {
    let replaced = transformer.transform_class_decl(node).into_option();
    with_children(node, replaced, |decl| {
        rewrite_class_children(transformer, decl)
    })
}

fn rewrite_class_children<T: Transformer + ?Sized>(
    transformer: &mut T,
    decl: &ClassDecl,
) -> Option<ClassDecl> {
    let type_params = rewrite_opt(&decl.type_params, |args| {
        rewrite_type_arguments(transformer, args)
    });
    let extends = rewrite_opt(&decl.extends, |clause| {
        rewrite_type_clause(transformer, clause)
    });
    let implements = rewrite_opt(&decl.implements, |clause| {
        rewrite_type_clause(transformer, clause)
    });
    let body = rewrite_class_body(transformer, &decl.body);

    if type_params.is_none() && extends.is_none() && implements.is_none() && body.is_none() {
        return None;
    }
    Some(ClassDecl {
        type_params: type_params.unwrap_or_else(|| decl.type_params.clone()),
        extends: extends.unwrap_or_else(|| decl.extends.clone()),
        implements: implements.unwrap_or_else(|| decl.implements.clone()),
        body: body.unwrap_or_else(|| decl.body.clone()),
        ..decl.clone()
    })
}

fn rewrite_type_clause<T: Transformer + ?Sized>(
    transformer: &mut T,
    node: &TypeClause,
) -> Option<TypeClause> {
    let types = rewrite_padded(&node.types, |ty| rewrite_type_name(transformer, ty))?;
    Some(TypeClause {
        types,
        ..node.clone()
    })
}

pub fn rewrite_type_name<T: Transformer + ?Sized>(
    transformer: &mut T,
    node: &TypeName,
) -> Option<TypeName> {
    let replaced = transformer.transform_type_name(node).into_option();
    with_children(node, replaced, |ty| {
        let args = rewrite_opt(&ty.type_args, |args| {
            rewrite_type_arguments(transformer, args)
        })?;
        Some(ty.with_type_args(args))
    })
}

fn rewrite_type_arguments<T: Transformer + ?Sized>(
    transformer: &mut T,
    node: &TypeArguments,
) -> Option<TypeArguments> {
    let args = rewrite_padded(&node.args, |ty| rewrite_type_name(transformer, ty))?;
    Some(TypeArguments {
        args,
        ..node.clone()
    })
}

fn rewrite_class_body<T: Transformer + ?Sized>(
    transformer: &mut T,
    node: &ClassBody,
) -> Option<ClassBody> {
    let members = rewrite_each(&node.members, |member| rewrite_member(transformer, member))?;
    Some(ClassBody {
        members,
        ..node.clone()
    })
}

fn rewrite_member<T: Transformer + ?Sized>(transformer: &mut T, node: &Member) -> Option<Member> {
    match node {
        Member::Field(field) => {
            rewrite_field_decl(transformer, field).map(|f| Member::Field(Arc::new(f)))
        }
        Member::Method(method) => {
            rewrite_method_decl(transformer, method).map(|m| Member::Method(Arc::new(m)))
        }
        Member::Class(class) => {
            rewrite_class_decl(transformer, class).map(|c| Member::Class(Arc::new(c)))
        }
    }
}

fn rewrite_field_decl<T: Transformer + ?Sized>(
    transformer: &mut T,
    node: &FieldDecl,
) -> Option<FieldDecl> {
    let ty = rewrite_type_name(transformer, &node.ty);
    let init = rewrite_opt(&node.init, |init| rewrite_initializer(transformer, init));
    if ty.is_none() && init.is_none() {
        return None;
    }
    Some(FieldDecl {
        ty: ty.unwrap_or_else(|| node.ty.clone()),
        init: init.unwrap_or_else(|| node.init.clone()),
        ..node.clone()
    })
}

fn rewrite_initializer<T: Transformer + ?Sized>(
    transformer: &mut T,
    node: &Initializer,
) -> Option<Initializer> {
    let value = rewrite_expr(transformer, &node.value)?;
    Some(Initializer {
        prefix: node.prefix.clone(),
        value,
    })
}

fn rewrite_method_decl<T: Transformer + ?Sized>(
    transformer: &mut T,
    node: &MethodDecl,
) -> Option<MethodDecl> {
    let return_type = rewrite_opt(&node.return_type, |ty| rewrite_type_name(transformer, ty));
    let params = rewrite_padded(&node.params.params, |param| {
        rewrite_param(transformer, param)
    });
    let body = match &node.body {
        MethodBody::Block(block) => rewrite_block(transformer, block).map(MethodBody::Block),
        MethodBody::Abstract(_) => None,
    };
    if return_type.is_none() && params.is_none() && body.is_none() {
        return None;
    }
    Some(MethodDecl {
        return_type: return_type.unwrap_or_else(|| node.return_type.clone()),
        params: match params {
            Some(params) => Parameters {
                params,
                ..node.params.clone()
            },
            None => node.params.clone(),
        },
        body: body.unwrap_or_else(|| node.body.clone()),
        ..node.clone()
    })
}

fn rewrite_param<T: Transformer + ?Sized>(transformer: &mut T, node: &Param) -> Option<Param> {
    let ty = rewrite_type_name(transformer, &node.ty)?;
    Some(Param {
        ty,
        ..node.clone()
    })
}

fn rewrite_block<T: Transformer + ?Sized>(transformer: &mut T, node: &Block) -> Option<Block> {
    let statements = rewrite_each(&node.statements, |stmt| rewrite_stmt(transformer, stmt))?;
    Some(Block {
        statements,
        ..node.clone()
    })
}

fn rewrite_stmt<T: Transformer + ?Sized>(transformer: &mut T, node: &Stmt) -> Option<Stmt> {
    match node {
        Stmt::Expr(stmt) => {
            let expr = rewrite_expr(transformer, &stmt.expr)?;
            Some(Stmt::Expr(Arc::new(ExprStmt {
                expr,
                ..(**stmt).clone()
            })))
        }
        Stmt::LocalVar(var) => {
            let ty = rewrite_type_name(transformer, &var.ty);
            let init = rewrite_opt(&var.init, |init| rewrite_initializer(transformer, init));
            if ty.is_none() && init.is_none() {
                return None;
            }
            Some(Stmt::LocalVar(Arc::new(LocalVar {
                ty: ty.unwrap_or_else(|| var.ty.clone()),
                init: init.unwrap_or_else(|| var.init.clone()),
                ..(**var).clone()
            })))
        }
        Stmt::Return(ret) => {
            let value = rewrite_opt(&ret.value, |value| rewrite_expr(transformer, value))?;
            Some(Stmt::Return(Arc::new(Return {
                value,
                ..(**ret).clone()
            })))
        }
        Stmt::Block(block) => rewrite_block(transformer, block).map(|b| Stmt::Block(Arc::new(b))),
    }
}

/// Rewrite an expression: the kind-specific hook first, then the children of
/// whichever node is current.
pub fn rewrite_expr<T: Transformer + ?Sized>(transformer: &mut T, node: &Expr) -> Option<Expr> {
    let replaced = match node {
        Expr::Name(ident) => transformer.transform_name_expr(ident),
        Expr::FieldAccess(access) => transformer.transform_field_access(access),
        Expr::MethodCall(call) => transformer.transform_method_call(call),
        _ => Rewrite::Unchanged,
    }
    .into_option();
    with_children(node, replaced, |expr| rewrite_expr_children(transformer, expr))
}

fn rewrite_expr_children<T: Transformer + ?Sized>(
    transformer: &mut T,
    node: &Expr,
) -> Option<Expr> {
    match node {
        Expr::Name(_) | Expr::Literal(_) => None,
        Expr::FieldAccess(access) => {
            let target = rewrite_expr(transformer, &access.target)?;
            Some(Expr::FieldAccess(Arc::new(FieldAccess {
                target,
                ..(**access).clone()
            })))
        }
        Expr::MethodCall(call) => {
            let target = rewrite_opt(&call.target, |target| rewrite_expr(transformer, target));
            let args = rewrite_arguments(transformer, &call.args);
            if target.is_none() && args.is_none() {
                return None;
            }
            Some(Expr::MethodCall(Arc::new(MethodCall {
                target: target.unwrap_or_else(|| call.target.clone()),
                args: args.unwrap_or_else(|| call.args.clone()),
                ..(**call).clone()
            })))
        }
        Expr::New(new) => {
            let ty = rewrite_type_name(transformer, &new.ty);
            let args = rewrite_arguments(transformer, &new.args);
            if ty.is_none() && args.is_none() {
                return None;
            }
            Some(Expr::New(Arc::new(NewClass {
                ty: ty.unwrap_or_else(|| new.ty.clone()),
                args: args.unwrap_or_else(|| new.args.clone()),
                ..(**new).clone()
            })))
        }
        Expr::Binary(bin) => {
            let left = rewrite_expr(transformer, &bin.left);
            let right = rewrite_expr(transformer, &bin.right);
            if left.is_none() && right.is_none() {
                return None;
            }
            Some(Expr::Binary(Arc::new(Binary {
                left: left.unwrap_or_else(|| bin.left.clone()),
                right: right.unwrap_or_else(|| bin.right.clone()),
                ..(**bin).clone()
            })))
        }
        Expr::Parens(parens) => {
            let inner = rewrite_expr(transformer, &parens.inner)?;
            Some(Expr::Parens(Arc::new(Parens {
                inner,
                ..(**parens).clone()
            })))
        }
    }
}

fn rewrite_arguments<T: Transformer + ?Sized>(
    transformer: &mut T,
    node: &Arguments,
) -> Option<Arguments> {
    let args = rewrite_padded(&node.args, |arg| rewrite_expr(transformer, arg))?;
    Some(Arguments {
        args,
        ..node.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::to_source;
    use crate::parse_compilation_unit;

    struct NodeCounter {
        classes: usize,
        types: usize,
        accesses: usize,
        names: usize,
    }

    impl NodeCounter {
        fn new() -> Self {
            Self {
                classes: 0,
                types: 0,
                accesses: 0,
                names: 0,
            }
        }
    }

    impl Visitor for NodeCounter {
        fn visit_class_decl(&mut self, _node: &ClassDecl) -> VisitResult {
            self.classes += 1;
            VisitResult::Continue
        }

        fn visit_type_name(&mut self, _node: &TypeName) -> VisitResult {
            self.types += 1;
            VisitResult::Continue
        }

        fn visit_field_access(&mut self, _node: &FieldAccess) -> VisitResult {
            self.accesses += 1;
            VisitResult::Continue
        }

        fn visit_name_expr(&mut self, _node: &Ident) -> VisitResult {
            self.names += 1;
            VisitResult::Continue
        }
    }

    const SOURCE: &str = r#"package p;

class Foo extends Vehicle<Wheel> {
    int limit = Constants.MAX;

    void run(Engine e) {
        helper(Constants.MIN);
    }

    static class Inner {}
}
"#;

    #[test]
    fn test_walk_counts_nodes() {
        let unit = parse_compilation_unit(SOURCE).unwrap();
        let mut counter = NodeCounter::new();
        assert_eq!(walk_compilation_unit(&mut counter, &unit), VisitResult::Continue);
        assert_eq!(counter.classes, 2);
        // Vehicle, Wheel, int, void, Engine
        assert_eq!(counter.types, 5);
        assert_eq!(counter.accesses, 2);
        assert_eq!(counter.names, 2);
    }

    struct StopAtFirstType(Vec<String>);

    impl Visitor for StopAtFirstType {
        fn visit_type_name(&mut self, node: &TypeName) -> VisitResult {
            self.0.push(node.name.clone());
            VisitResult::Stop
        }
    }

    #[test]
    fn test_walk_stop_halts_traversal() {
        let unit = parse_compilation_unit(SOURCE).unwrap();
        let mut visitor = StopAtFirstType(Vec::new());
        assert_eq!(walk_compilation_unit(&mut visitor, &unit), VisitResult::Stop);
        assert_eq!(visitor.0, vec!["Vehicle"]);
    }

    struct SkipMethods(NodeCounter);

    impl Visitor for SkipMethods {
        fn visit_method_decl(&mut self, _node: &MethodDecl) -> VisitResult {
            VisitResult::SkipChildren
        }

        fn visit_field_access(&mut self, node: &FieldAccess) -> VisitResult {
            self.0.visit_field_access(node)
        }
    }

    #[test]
    fn test_walk_skip_children() {
        let unit = parse_compilation_unit(SOURCE).unwrap();
        let mut visitor = SkipMethods(NodeCounter::new());
        walk_compilation_unit(&mut visitor, &unit);
        assert_eq!(visitor.0.accesses, 1);
    }

    struct RenameType {
        from: &'static str,
        to: &'static str,
        calls: usize,
    }

    impl Transformer for RenameType {
        fn transform_type_name(&mut self, node: &TypeName) -> Rewrite<TypeName> {
            self.calls += 1;
            if node.name == self.from {
                Rewrite::Replaced(node.with_name(self.to))
            } else {
                Rewrite::Unchanged
            }
        }
    }

    #[test]
    fn test_rewrite_renames_and_preserves_trivia() {
        let unit = parse_compilation_unit(SOURCE).unwrap();
        let mut renamer = RenameType {
            from: "Wheel",
            to: "Tire",
            calls: 0,
        };
        let rewritten = rewrite_compilation_unit(&mut renamer, &unit).unwrap();
        assert_eq!(
            to_source(&rewritten),
            SOURCE.replace("Vehicle<Wheel>", "Vehicle<Tire>")
        );
        assert_eq!(renamer.calls, 5);
    }

    #[test]
    fn test_rewrite_without_change_returns_none() {
        let unit = parse_compilation_unit(SOURCE).unwrap();
        let mut renamer = RenameType {
            from: "Missing",
            to: "Other",
            calls: 0,
        };
        assert!(rewrite_compilation_unit(&mut renamer, &unit).is_none());
    }

    #[test]
    fn test_rewrite_shares_untouched_members() {
        let unit = parse_compilation_unit(SOURCE).unwrap();
        let mut renamer = RenameType {
            from: "Engine",
            to: "Motor",
            calls: 0,
        };
        let rewritten = rewrite_compilation_unit(&mut renamer, &unit).unwrap();
        let before = &unit.types[0].body.members;
        let after = &rewritten.types[0].body.members;

        let (Member::Field(old_field), Member::Field(new_field)) = (&before[0], &after[0]) else {
            panic!("expected fields");
        };
        assert!(Arc::ptr_eq(old_field, new_field));

        let (Member::Method(old_method), Member::Method(new_method)) = (&before[1], &after[1])
        else {
            panic!("expected methods");
        };
        assert!(!Arc::ptr_eq(old_method, new_method));

        let (Member::Class(old_inner), Member::Class(new_inner)) = (&before[2], &after[2]) else {
            panic!("expected classes");
        };
        assert!(Arc::ptr_eq(old_inner, new_inner));
    }

    /// Replaces `Constants.X` with `Limits.X` and counts the hook calls.
    struct RetargetOwner {
        seen: Vec<String>,
    }

    impl Transformer for RetargetOwner {
        fn transform_field_access(&mut self, node: &FieldAccess) -> Rewrite<Expr> {
            self.seen.push(node.name.name.clone());
            match &node.target {
                Expr::Name(owner) if owner.name == "Constants" => {
                    Rewrite::Replaced(Expr::FieldAccess(Arc::new(FieldAccess {
                        target: Expr::Name(owner.with_name("Limits")),
                        ..node.clone()
                    })))
                }
                _ => Rewrite::Unchanged,
            }
        }

        fn transform_name_expr(&mut self, node: &Ident) -> Rewrite<Expr> {
            self.seen.push(node.name.clone());
            Rewrite::Unchanged
        }
    }

    #[test]
    fn test_rewrite_descends_into_replacement() {
        let unit = parse_compilation_unit("class A { int a = Constants.MAX; }").unwrap();
        let mut transformer = RetargetOwner { seen: Vec::new() };
        let rewritten = rewrite_compilation_unit(&mut transformer, &unit).unwrap();
        assert_eq!(to_source(&rewritten), "class A { int a = Limits.MAX; }");
        // The hook saw the access once, then the replacement's target.
        assert_eq!(transformer.seen, vec!["MAX", "Limits"]);
    }

    #[test]
    fn test_rewrite_each_clones_only_on_change() {
        let items = vec![1, 2, 3];
        assert_eq!(rewrite_each(&items, |_| None), None);
        assert_eq!(
            rewrite_each(&items, |n| (*n == 2).then_some(20)),
            Some(vec![1, 20, 3])
        );
    }
}
