// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Printing trees back to source text.
//!
//! Every node prints its trivia followed by its tokens, so a tree produced by
//! the parser prints back to exactly the text it was parsed from.
//!
//! ```
//! use recast_tree::{parse_compilation_unit, Codegen, CodegenState};
//!
//! let source = "class Foo extends Vehicle {}\n";
//! let unit = parse_compilation_unit(source).expect("parse error");
//!
//! let mut state = CodegenState::default();
//! unit.codegen(&mut state);
//! assert_eq!(state.to_string(), source);
//! ```

use std::fmt;

use crate::nodes::{
    Arguments, Binary, Block, ClassBody, ClassDecl, CompilationUnit, Expr, ExprStmt, FieldAccess,
    FieldDecl, Ident, Import, Initializer, Literal, LocalVar, Member, MethodBody, MethodCall,
    MethodDecl, NewClass, PackageDecl, Padded, Param, Parameters, Parens, Return, Space, Stmt,
    TypeArguments, TypeClause, TypeName,
};

/// Output buffer for [`Codegen`].
#[derive(Debug, Default)]
pub struct CodegenState {
    tokens: String,
}

impl CodegenState {
    pub fn add_token(&mut self, tok: &str) {
        self.tokens.push_str(tok);
    }

    pub fn add_space(&mut self, space: &Space) {
        self.tokens.push_str(space.as_str());
    }

    pub fn into_string(self) -> String {
        self.tokens
    }
}

impl fmt::Display for CodegenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens)
    }
}

/// A node that can print itself.
pub trait Codegen {
    fn codegen(&self, state: &mut CodegenState);
}

/// Print a node to a fresh string.
pub fn to_source<N: Codegen + ?Sized>(node: &N) -> String {
    let mut state = CodegenState::default();
    node.codegen(&mut state);
    state.into_string()
}

impl<T: Codegen + ?Sized> Codegen for std::sync::Arc<T> {
    fn codegen(&self, state: &mut CodegenState) {
        (**self).codegen(state)
    }
}

/// Print a comma-separated list of padded elements.
fn codegen_list<T: Codegen>(items: &[Padded<T>], state: &mut CodegenState) {
    let last = items.len().saturating_sub(1);
    for (i, item) in items.iter().enumerate() {
        item.elem.codegen(state);
        if i < last {
            state.add_space(&item.after);
            state.add_token(",");
        }
    }
}

fn codegen_modifiers(modifiers: &[Ident], state: &mut CodegenState) {
    for modifier in modifiers {
        modifier.codegen(state);
    }
}

impl Codegen for Ident {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token(&self.name);
    }
}

impl Codegen for TypeName {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token(&self.name);
        if let Some(args) = &self.type_args {
            args.codegen(state);
        }
    }
}

impl Codegen for TypeArguments {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("<");
        codegen_list(&self.args, state);
        state.add_space(&self.close);
        state.add_token(">");
    }
}

impl Codegen for CompilationUnit {
    fn codegen(&self, state: &mut CodegenState) {
        if let Some(package) = &self.package {
            package.codegen(state);
        }
        for import in &self.imports {
            import.codegen(state);
        }
        for decl in &self.types {
            decl.codegen(state);
        }
        state.add_space(&self.eof);
    }
}

impl Codegen for PackageDecl {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("package");
        state.add_space(&self.name_prefix);
        state.add_token(&self.name);
        state.add_space(&self.semi);
        state.add_token(";");
    }
}

impl Codegen for Import {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("import");
        if let Some(static_prefix) = &self.static_prefix {
            state.add_space(static_prefix);
            state.add_token("static");
        }
        state.add_space(&self.name_prefix);
        state.add_token(&self.name);
        if self.wildcard {
            state.add_token(".*");
        }
        state.add_space(&self.semi);
        state.add_token(";");
    }
}

impl Codegen for ClassDecl {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        codegen_modifiers(&self.modifiers, state);
        state.add_space(&self.kind_prefix);
        state.add_token(self.kind.keyword());
        self.name.codegen(state);
        if let Some(params) = &self.type_params {
            params.codegen(state);
        }
        if let Some(extends) = &self.extends {
            codegen_clause("extends", extends, state);
        }
        if let Some(implements) = &self.implements {
            codegen_clause("implements", implements, state);
        }
        self.body.codegen(state);
    }
}

fn codegen_clause(keyword: &str, clause: &TypeClause, state: &mut CodegenState) {
    state.add_space(&clause.prefix);
    state.add_token(keyword);
    codegen_list(&clause.types, state);
}

impl Codegen for ClassBody {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("{");
        for member in &self.members {
            member.codegen(state);
        }
        state.add_space(&self.end);
        state.add_token("}");
    }
}

impl Codegen for Member {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Member::Field(field) => field.codegen(state),
            Member::Method(method) => method.codegen(state),
            Member::Class(class) => class.codegen(state),
        }
    }
}

impl Codegen for FieldDecl {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        codegen_modifiers(&self.modifiers, state);
        self.ty.codegen(state);
        self.name.codegen(state);
        if let Some(init) = &self.init {
            init.codegen(state);
        }
        state.add_space(&self.semi);
        state.add_token(";");
    }
}

impl Codegen for Initializer {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("=");
        self.value.codegen(state);
    }
}

impl Codegen for MethodDecl {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        codegen_modifiers(&self.modifiers, state);
        if let Some(ty) = &self.return_type {
            ty.codegen(state);
        }
        self.name.codegen(state);
        self.params.codegen(state);
        match &self.body {
            MethodBody::Block(block) => block.codegen(state),
            MethodBody::Abstract(semi) => {
                state.add_space(semi);
                state.add_token(";");
            }
        }
    }
}

impl Codegen for Parameters {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("(");
        codegen_list(&self.params, state);
        state.add_space(&self.close);
        state.add_token(")");
    }
}

impl Codegen for Param {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        codegen_modifiers(&self.modifiers, state);
        self.ty.codegen(state);
        self.name.codegen(state);
    }
}

impl Codegen for Block {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("{");
        for stmt in &self.statements {
            stmt.codegen(state);
        }
        state.add_space(&self.end);
        state.add_token("}");
    }
}

impl Codegen for Stmt {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Stmt::Expr(stmt) => stmt.codegen(state),
            Stmt::LocalVar(var) => var.codegen(state),
            Stmt::Return(ret) => ret.codegen(state),
            Stmt::Block(block) => block.codegen(state),
        }
    }
}

impl Codegen for ExprStmt {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        self.expr.codegen(state);
        state.add_space(&self.semi);
        state.add_token(";");
    }
}

impl Codegen for LocalVar {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        codegen_modifiers(&self.modifiers, state);
        self.ty.codegen(state);
        self.name.codegen(state);
        if let Some(init) = &self.init {
            init.codegen(state);
        }
        state.add_space(&self.semi);
        state.add_token(";");
    }
}

impl Codegen for Return {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("return");
        if let Some(value) = &self.value {
            value.codegen(state);
        }
        state.add_space(&self.semi);
        state.add_token(";");
    }
}

impl Codegen for Expr {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Expr::Name(ident) => ident.codegen(state),
            Expr::FieldAccess(access) => access.codegen(state),
            Expr::MethodCall(call) => call.codegen(state),
            Expr::New(new) => new.codegen(state),
            Expr::Literal(lit) => lit.codegen(state),
            Expr::Binary(bin) => bin.codegen(state),
            Expr::Parens(parens) => parens.codegen(state),
        }
    }
}

impl Codegen for FieldAccess {
    fn codegen(&self, state: &mut CodegenState) {
        self.target.codegen(state);
        state.add_space(&self.dot);
        state.add_token(".");
        self.name.codegen(state);
    }
}

impl Codegen for MethodCall {
    fn codegen(&self, state: &mut CodegenState) {
        if let Some(target) = &self.target {
            target.codegen(state);
            state.add_space(&self.dot);
            state.add_token(".");
        }
        self.name.codegen(state);
        self.args.codegen(state);
    }
}

impl Codegen for NewClass {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("new");
        self.ty.codegen(state);
        self.args.codegen(state);
    }
}

impl Codegen for Literal {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token(&self.text);
    }
}

impl Codegen for Binary {
    fn codegen(&self, state: &mut CodegenState) {
        self.left.codegen(state);
        state.add_space(&self.op_prefix);
        state.add_token(&self.op);
        self.right.codegen(state);
    }
}

impl Codegen for Parens {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("(");
        self.inner.codegen(state);
        state.add_space(&self.close);
        state.add_token(")");
    }
}

impl Codegen for Arguments {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_space(&self.prefix);
        state.add_token("(");
        codegen_list(&self.args, state);
        state.add_space(&self.close);
        state.add_token(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{IdGen, NodeId};

    #[test]
    fn test_codegen_synthesized_import() {
        let import = Import::single(NodeId(0), Space::newline(), "com.new.Car");
        assert_eq!(to_source(&import), "\nimport com.new.Car;");
    }

    #[test]
    fn test_codegen_padded_list() {
        let mut ids = IdGen::default();
        let args = TypeArguments {
            id: ids.fresh(),
            prefix: Space::empty(),
            args: vec![
                Padded::new(TypeName::new(ids.fresh(), Space::empty(), "K"), Space::single()),
                Padded::bare(TypeName::new(ids.fresh(), Space::single(), "V")),
            ],
            close: Space::empty(),
        };
        assert_eq!(to_source(&args), "<K , V>");
    }
}
