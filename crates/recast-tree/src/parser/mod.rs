// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recursive-descent parser for the source subset the tree model covers.
//!
//! The parser exists so fixtures and the command-line host can produce trees
//! from text. It accepts package and import declarations, classes and
//! interfaces with type parameters, `extends` and `implements` clauses,
//! fields, methods, constructors, blocks, `return`, local variables and
//! expression statements. Anything else is rejected with
//! [`ParseError::Unsupported`] or [`ParseError::Unexpected`]; nothing is
//! silently dropped, so a successful parse always prints back to its input.
//!
//! Node ids are assigned deterministically in source order.

use std::sync::Arc;

use thiserror::Error;

mod tokenizer;

pub use tokenizer::{tokenize, TokKind, Token};

use crate::nodes::{
    Arguments, Binary, Block, ClassBody, ClassDecl, ClassKind, CompilationUnit, Expr, ExprStmt,
    FieldAccess, FieldDecl, IdGen, Ident, Import, Initializer, Literal, LocalVar, Member,
    MethodBody, MethodCall, MethodDecl, NewClass, NodeId, PackageDecl, Padded, Param, Parameters,
    Parens, Return, Space, Stmt, TypeArguments, TypeClause, TypeName,
};

/// Errors produced while tokenizing or parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected {found} at byte {offset}, expected {expected}")]
    Unexpected {
        found: String,
        expected: String,
        offset: usize,
    },

    #[error("unterminated {what} starting at byte {offset}")]
    Unterminated { what: &'static str, offset: usize },

    #[error("unsupported syntax at byte {offset}: {what}")]
    Unsupported { what: String, offset: usize },

    #[error("unexpected character {ch:?} at byte {offset}")]
    InvalidChar { ch: char, offset: usize },
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse one source module.
///
/// # Example
///
/// ```
/// use recast_tree::parse_compilation_unit;
///
/// let unit = parse_compilation_unit("package p;\n\nclass Foo {}\n").expect("parse error");
/// assert_eq!(unit.package_name(), Some("p"));
/// assert_eq!(unit.types[0].name.name, "Foo");
/// ```
pub fn parse_compilation_unit(source: &str) -> Result<CompilationUnit> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).compilation_unit()
}

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "default",
    "synchronized",
    "native",
    "transient",
    "volatile",
    "strictfp",
];

const RESERVED: &[&str] = &[
    "class", "interface", "enum", "extends", "implements", "package", "import", "return", "new",
    "if", "else", "for", "while", "do", "switch", "case", "try", "catch", "finally", "throw",
    "throws", "break", "continue", "true", "false", "null", "public", "protected", "private",
    "static", "final", "abstract", "synchronized", "native", "transient", "volatile", "strictfp",
];

const UNSUPPORTED_STATEMENTS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "try", "throw", "break", "continue",
];

/// Binary operators by increasing precedence. `=` is right-associative.
const BINARY_LEVELS: &[&[&str]] = &[
    &["="],
    &["||"],
    &["&&"],
    &["==", "!="],
    &["<", ">", "<=", ">="],
    &["+", "-"],
    &["*", "/", "%"],
];

fn is_reserved(text: &str) -> bool {
    RESERVED.contains(&text)
}

#[derive(Clone, Copy)]
struct Checkpoint {
    pos: usize,
    suppress: bool,
    ids: IdGen,
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// When set, the next consumed token reports empty trivia because an
    /// enclosing node already took it.
    suppress: bool,
    ids: IdGen,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token<'a>>) -> Self {
        Self {
            tokens,
            pos: 0,
            suppress: false,
            ids: IdGen::default(),
        }
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn peek(&self) -> Token<'a> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Token<'a> {
        let last = self.tokens.len() - 1;
        self.tokens[(self.pos + n).min(last)]
    }

    fn at(&self, text: &str) -> bool {
        self.peek().is(text)
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokKind::Eof
    }

    fn fresh(&mut self) -> NodeId {
        self.ids.fresh()
    }

    /// Consume the current token, returning its trivia and the token.
    fn bump(&mut self) -> (Space, Token<'a>) {
        let tok = self.peek();
        if tok.kind != TokKind::Eof {
            self.pos += 1;
        }
        let prefix = if self.suppress {
            self.suppress = false;
            Space::empty()
        } else {
            Space::new(tok.prefix)
        };
        (prefix, tok)
    }

    /// Take the trivia of the current token for an enclosing node.
    fn take_leading(&mut self) -> Space {
        let prefix = if self.suppress {
            Space::empty()
        } else {
            Space::new(self.peek().prefix)
        };
        self.suppress = true;
        prefix
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            suppress: self.suppress,
            ids: self.ids,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.suppress = checkpoint.suppress;
        self.ids = checkpoint.ids;
    }

    fn expect(&mut self, text: &'static str) -> Result<Space> {
        if self.at(text) {
            Ok(self.bump().0)
        } else {
            Err(self.unexpected(format!("`{}`", text)))
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        let tok = self.peek();
        let found = if tok.kind == TokKind::Eof {
            "end of file".to_string()
        } else {
            format!("`{}`", tok.text)
        };
        ParseError::Unexpected {
            found,
            expected: expected.into(),
            offset: tok.offset,
        }
    }

    fn unsupported(&self, what: impl Into<String>) -> ParseError {
        ParseError::Unsupported {
            what: what.into(),
            offset: self.peek().offset,
        }
    }

    fn at_name(&self) -> bool {
        let tok = self.peek();
        tok.kind == TokKind::Ident && !is_reserved(tok.text) && !tok.text.starts_with('@')
    }

    fn ident(&mut self) -> Result<Ident> {
        if !self.at_name() {
            return Err(self.unexpected("identifier"));
        }
        let id = self.fresh();
        let (prefix, tok) = self.bump();
        Ok(Ident::new(id, prefix, tok.text))
    }

    /// A name after a `.`, which may be a keyword when another `.` follows.
    fn segment(&mut self) -> Result<Ident> {
        let tok = self.peek();
        if tok.kind == TokKind::Ident && is_reserved(tok.text) && self.peek_at(1).is(".") {
            let id = self.fresh();
            let (prefix, tok) = self.bump();
            return Ok(Ident::new(id, prefix, tok.text));
        }
        self.ident()
    }

    /// A dotted name without interior trivia, optionally ending in `.*`.
    fn dotted(&mut self, allow_wildcard: bool) -> Result<(Space, String, bool)> {
        if !self.at_name() {
            return Err(self.unexpected("name"));
        }
        let (prefix, first) = self.bump();
        let mut name = first.text.to_string();
        let mut wildcard = false;
        while self.at(".") {
            let dot = self.peek();
            let next = self.peek_at(1);
            if !dot.prefix.is_empty() || !next.prefix.is_empty() {
                return Err(self.unsupported("trivia inside a qualified name"));
            }
            if allow_wildcard && next.is("*") {
                self.bump();
                self.bump();
                wildcard = true;
                break;
            }
            if next.kind != TokKind::Ident || next.text.starts_with('@') {
                break;
            }
            // Keywords are allowed as interior segments only: `com.new.Car`.
            if is_reserved(next.text) && !self.peek_at(2).is(".") {
                break;
            }
            self.bump();
            self.bump();
            name.push('.');
            name.push_str(next.text);
        }
        Ok((prefix, name, wildcard))
    }

    /// A comma-separated list ending in `close`.
    fn padded_list<T>(
        &mut self,
        close: &'static str,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<(Vec<Padded<T>>, Space)> {
        let mut items = Vec::new();
        if !self.at(close) {
            items.push(Padded::bare(item(self)?));
            while self.at(",") {
                let (after, _) = self.bump();
                if let Some(last) = items.last_mut() {
                    last.after = after;
                }
                items.push(Padded::bare(item(self)?));
            }
        }
        let close_space = self.expect(close)?;
        Ok((items, close_space))
    }

    // ------------------------------------------------------------------
    // Module level
    // ------------------------------------------------------------------

    fn compilation_unit(mut self) -> Result<CompilationUnit> {
        let id = self.fresh();
        let package = if self.at("package") {
            Some(self.package_decl()?)
        } else {
            None
        };
        let mut imports = Vec::new();
        while self.at("import") {
            imports.push(self.import()?);
        }
        let mut types = Vec::new();
        while !self.at_eof() {
            types.push(Arc::new(self.type_decl()?));
        }
        let (eof, _) = self.bump();
        Ok(CompilationUnit {
            id,
            package,
            imports,
            types,
            eof,
            next_id: self.ids.peek(),
        })
    }

    fn package_decl(&mut self) -> Result<PackageDecl> {
        let id = self.fresh();
        let (prefix, _) = self.bump();
        let (name_prefix, name, _) = self.dotted(false)?;
        let semi = self.expect(";")?;
        Ok(PackageDecl {
            id,
            prefix,
            name_prefix,
            name,
            semi,
        })
    }

    fn import(&mut self) -> Result<Import> {
        let id = self.fresh();
        let (prefix, _) = self.bump();
        let static_prefix = if self.at("static") {
            Some(self.bump().0)
        } else {
            None
        };
        let (name_prefix, name, wildcard) = self.dotted(true)?;
        let semi = self.expect(";")?;
        Ok(Import {
            id,
            prefix,
            static_prefix,
            name_prefix,
            name,
            wildcard,
            semi,
        })
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn type_decl(&mut self) -> Result<ClassDecl> {
        let id = self.fresh();
        let prefix = self.take_leading();
        let modifiers = self.modifiers()?;
        self.class_rest(id, prefix, modifiers)
    }

    fn modifiers(&mut self) -> Result<Vec<Ident>> {
        let mut modifiers = Vec::new();
        loop {
            let tok = self.peek();
            if tok.kind != TokKind::Ident {
                break;
            }
            let annotation = tok.text.starts_with('@');
            if !annotation && !MODIFIERS.contains(&tok.text) {
                break;
            }
            // `default` only acts as a modifier in front of a declaration.
            if tok.text == "default" && self.peek_at(1).is(":") {
                break;
            }
            let id = self.fresh();
            let (prefix, tok) = self.bump();
            modifiers.push(Ident::new(id, prefix, tok.text));
            if annotation && self.at("(") {
                return Err(self.unsupported("annotation arguments"));
            }
        }
        Ok(modifiers)
    }

    fn class_rest(&mut self, id: NodeId, prefix: Space, modifiers: Vec<Ident>) -> Result<ClassDecl> {
        let kind = if self.at("class") {
            ClassKind::Class
        } else if self.at("interface") {
            ClassKind::Interface
        } else if self.at("enum") {
            return Err(self.unsupported("enum declaration"));
        } else {
            return Err(self.unexpected("`class` or `interface`"));
        };
        let (kind_prefix, _) = self.bump();
        let name = self.ident()?;
        let type_params = if self.at("<") {
            Some(self.type_arguments()?)
        } else {
            None
        };
        let extends = if self.at("extends") {
            Some(self.type_clause()?)
        } else {
            None
        };
        let implements = if self.at("implements") {
            Some(self.type_clause()?)
        } else {
            None
        };
        let body = self.class_body()?;
        Ok(ClassDecl {
            id,
            prefix,
            modifiers,
            kind_prefix,
            kind,
            name,
            type_params,
            extends,
            implements,
            body,
        })
    }

    fn type_clause(&mut self) -> Result<TypeClause> {
        let id = self.fresh();
        let (prefix, _) = self.bump();
        let mut types = vec![Padded::bare(self.type_name()?)];
        while self.at(",") {
            let (after, _) = self.bump();
            if let Some(last) = types.last_mut() {
                last.after = after;
            }
            types.push(Padded::bare(self.type_name()?));
        }
        Ok(TypeClause { id, prefix, types })
    }

    fn class_body(&mut self) -> Result<ClassBody> {
        let id = self.fresh();
        let prefix = self.expect("{")?;
        let mut members = Vec::new();
        while !self.at("}") {
            if self.at_eof() {
                return Err(self.unexpected("`}`"));
            }
            members.push(self.member()?);
        }
        let end = self.expect("}")?;
        Ok(ClassBody {
            id,
            prefix,
            members,
            end,
        })
    }

    fn member(&mut self) -> Result<Member> {
        let id = self.fresh();
        let prefix = self.take_leading();
        let modifiers = self.modifiers()?;

        if self.at("class") || self.at("interface") || self.at("enum") {
            let class = self.class_rest(id, prefix, modifiers)?;
            return Ok(Member::Class(Arc::new(class)));
        }
        if self.at("<") {
            return Err(self.unsupported("generic method declaration"));
        }
        if self.at("{") {
            return Err(self.unsupported("initializer block"));
        }

        let is_constructor = self.at_name() && self.peek_at(1).is("(");
        let return_type = if is_constructor {
            None
        } else {
            Some(self.type_name()?)
        };
        let name = self.ident()?;

        if self.at("(") {
            let params = self.parameters()?;
            let body = if self.at("{") {
                MethodBody::Block(self.block()?)
            } else if self.at(";") {
                MethodBody::Abstract(self.bump().0)
            } else if self.at("throws") {
                return Err(self.unsupported("throws clause"));
            } else {
                return Err(self.unexpected("method body"));
            };
            return Ok(Member::Method(Arc::new(MethodDecl {
                id,
                prefix,
                modifiers,
                return_type,
                name,
                params,
                body,
            })));
        }

        let Some(ty) = return_type else {
            return Err(self.unexpected("`(`"));
        };
        let init = self.initializer()?;
        let semi = self.expect(";")?;
        Ok(Member::Field(Arc::new(FieldDecl {
            id,
            prefix,
            modifiers,
            ty,
            name,
            init,
            semi,
        })))
    }

    fn initializer(&mut self) -> Result<Option<Initializer>> {
        if !self.at("=") {
            return Ok(None);
        }
        let (prefix, _) = self.bump();
        let value = self.expr()?;
        Ok(Some(Initializer { prefix, value }))
    }

    fn parameters(&mut self) -> Result<Parameters> {
        let prefix = self.expect("(")?;
        let (params, close) = self.padded_list(")", Self::param)?;
        Ok(Parameters {
            prefix,
            params,
            close,
        })
    }

    fn param(&mut self) -> Result<Param> {
        let id = self.fresh();
        let prefix = self.take_leading();
        let modifiers = self.modifiers()?;
        let ty = self.type_name()?;
        let name = self.ident()?;
        Ok(Param {
            id,
            prefix,
            modifiers,
            ty,
            name,
        })
    }

    fn type_name(&mut self) -> Result<TypeName> {
        let id = self.fresh();
        let mut ty = if self.at("?") {
            let (prefix, _) = self.bump();
            if self.at("extends") || self.at("super") {
                return Err(self.unsupported("bounded wildcard"));
            }
            TypeName::new(id, prefix, "?")
        } else {
            let (prefix, name, _) = self.dotted(false)?;
            TypeName::new(id, prefix, name)
        };
        if self.at("<") {
            ty.type_args = Some(self.type_arguments()?);
        }
        if self.at("[") {
            return Err(self.unsupported("array type"));
        }
        Ok(ty)
    }

    fn type_arguments(&mut self) -> Result<TypeArguments> {
        let id = self.fresh();
        let prefix = self.expect("<")?;
        let (args, close) = self.padded_list(">", Self::type_name)?;
        Ok(TypeArguments {
            id,
            prefix,
            args,
            close,
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self) -> Result<Block> {
        let id = self.fresh();
        let prefix = self.expect("{")?;
        let mut statements = Vec::new();
        while !self.at("}") {
            if self.at_eof() {
                return Err(self.unexpected("`}`"));
            }
            statements.push(self.statement()?);
        }
        let end = self.expect("}")?;
        Ok(Block {
            id,
            prefix,
            statements,
            end,
        })
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.at("{") {
            return Ok(Stmt::Block(Arc::new(self.block()?)));
        }
        if let Some(keyword) = UNSUPPORTED_STATEMENTS.iter().find(|k| self.at(k)) {
            return Err(self.unsupported(format!("`{}` statement", keyword)));
        }

        let id = self.fresh();
        let prefix = self.take_leading();

        if self.at("return") {
            self.bump();
            let value = if self.at(";") {
                None
            } else {
                Some(self.expr()?)
            };
            let semi = self.expect(";")?;
            return Ok(Stmt::Return(Arc::new(Return {
                id,
                prefix,
                value,
                semi,
            })));
        }

        let starts_with_modifier = self.at("final") || self.peek().text.starts_with('@');
        if starts_with_modifier || self.looks_like_local_var() {
            let modifiers = self.modifiers()?;
            let ty = self.type_name()?;
            let name = self.ident()?;
            let init = self.initializer()?;
            let semi = self.expect(";")?;
            return Ok(Stmt::LocalVar(Arc::new(LocalVar {
                id,
                prefix,
                modifiers,
                ty,
                name,
                init,
                semi,
            })));
        }

        let expr = self.expr()?;
        let semi = self.expect(";")?;
        Ok(Stmt::Expr(Arc::new(ExprStmt {
            id,
            prefix,
            expr,
            semi,
        })))
    }

    /// `Type name =` or `Type name;` ahead.
    fn looks_like_local_var(&mut self) -> bool {
        let checkpoint = self.checkpoint();
        let result = self.type_name().is_ok()
            && self.at_name()
            && (self.peek_at(1).is("=") || self.peek_at(1).is(";"));
        self.restore(checkpoint);
        result
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self) -> Result<Expr> {
        self.binary(0)
    }

    fn at_operator(&self, ops: &[&str]) -> bool {
        let tok = self.peek();
        tok.kind == TokKind::Punct && ops.contains(&tok.text)
    }

    fn binary(&mut self, level: usize) -> Result<Expr> {
        if level == BINARY_LEVELS.len() {
            return self.postfix();
        }
        let mut left = self.binary(level + 1)?;
        while self.at_operator(BINARY_LEVELS[level]) {
            let id = self.fresh();
            let (op_prefix, tok) = self.bump();
            // Assignment is right-associative.
            let right = if level == 0 {
                self.binary(0)?
            } else {
                self.binary(level + 1)?
            };
            left = Expr::Binary(Arc::new(Binary {
                id,
                left,
                op_prefix,
                op: tok.text.to_string(),
                right,
            }));
        }
        Ok(left)
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        while self.at(".") {
            let id = self.fresh();
            let (dot, _) = self.bump();
            let name = self.segment()?;
            expr = if self.at("(") {
                let args = self.arguments()?;
                Expr::MethodCall(Arc::new(MethodCall {
                    id,
                    target: Some(expr),
                    dot,
                    name,
                    args,
                }))
            } else {
                Expr::FieldAccess(Arc::new(FieldAccess {
                    id,
                    target: expr,
                    dot,
                    name,
                    owner: None,
                }))
            };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr> {
        let tok = self.peek();
        match tok.kind {
            TokKind::Number | TokKind::Str | TokKind::Char => Ok(self.literal_expr()),
            TokKind::Ident if matches!(tok.text, "true" | "false" | "null") => {
                Ok(self.literal_expr())
            }
            TokKind::Ident if tok.text == "new" => {
                let id = self.fresh();
                let (prefix, _) = self.bump();
                let ty = self.type_name()?;
                let args = self.arguments()?;
                Ok(Expr::New(Arc::new(NewClass {
                    id,
                    prefix,
                    ty,
                    args,
                })))
            }
            TokKind::Ident if self.at_name() => {
                if self.peek_at(1).is("(") {
                    let id = self.fresh();
                    let name = self.ident()?;
                    let args = self.arguments()?;
                    Ok(Expr::MethodCall(Arc::new(MethodCall {
                        id,
                        target: None,
                        dot: Space::empty(),
                        name,
                        args,
                    })))
                } else {
                    Ok(Expr::Name(self.ident()?))
                }
            }
            TokKind::Punct if tok.text == "(" => {
                let id = self.fresh();
                let (prefix, _) = self.bump();
                let inner = self.expr()?;
                let close = self.expect(")")?;
                Ok(Expr::Parens(Arc::new(Parens {
                    id,
                    prefix,
                    inner,
                    close,
                })))
            }
            TokKind::Punct if tok.text == "-" => {
                let next = self.peek_at(1);
                if next.kind != TokKind::Number || !next.prefix.is_empty() {
                    return Err(self.unsupported("unary operator"));
                }
                let id = self.fresh();
                let (prefix, _) = self.bump();
                let (_, number) = self.bump();
                Ok(Expr::Literal(Literal {
                    id,
                    prefix,
                    text: format!("-{}", number.text),
                }))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn literal_expr(&mut self) -> Expr {
        let id = self.fresh();
        let (prefix, tok) = self.bump();
        Expr::Literal(Literal {
            id,
            prefix,
            text: tok.text.to_string(),
        })
    }

    fn arguments(&mut self) -> Result<Arguments> {
        let prefix = self.expect("(")?;
        let (args, close) = self.padded_list(")", Self::expr)?;
        Ok(Arguments {
            prefix,
            args,
            close,
        })
    }
}
