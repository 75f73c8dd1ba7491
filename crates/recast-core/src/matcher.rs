// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Pattern matchers.
//!
//! Matchers are predicates: a non-match is an ordinary `false`, never an
//! error. They compare names structurally and use resolved type information
//! when the tree or the symbol table has it, falling back to simple-name
//! equality when it does not.

use recast_tree::{simple_name_of, ClassDecl, CompilationUnit, FieldAccess};

use crate::error::ConfigurationError;
use crate::symbols::{SymbolTable, TypeIndex};

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "true", "false", "null",
];

fn is_identifier_shaped(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Returns true if `name` is a single identifier that is not a keyword.
pub fn is_identifier(name: &str) -> bool {
    is_identifier_shaped(name) && !KEYWORDS.contains(&name)
}

/// Returns true if `name` is a simple or dotted type name.
///
/// Interior segments may be keywords (`com.new.Car`); the first and last
/// may not.
pub fn is_qualified_name(name: &str) -> bool {
    let segments: Vec<&str> = name.split('.').collect();
    let last = segments.len() - 1;
    segments.iter().enumerate().all(|(i, segment)| {
        if i == 0 || i == last {
            is_identifier(segment)
        } else {
            is_identifier_shaped(segment)
        }
    })
}

/// Returns true if a dotted qualifier can name a type: `this.X` and
/// `super.X` refer to members of the current instance.
pub fn is_type_qualifier(qualifier: &str) -> bool {
    let head = qualifier.split('.').next().unwrap_or(qualifier);
    head != "this" && head != "super"
}

/// Check a configured member name.
pub fn validate_member(field: &'static str, value: &str) -> Result<(), ConfigurationError> {
    if value.is_empty() {
        return Err(ConfigurationError::EmptyName { field });
    }
    if !is_identifier(value) {
        return Err(ConfigurationError::InvalidIdentifier {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A configured type name: `Vehicle` or `com.old.Vehicle`.
///
/// A dotted name is taken as fully qualified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypePattern {
    spelled: String,
}

impl TypePattern {
    pub fn parse(field: &'static str, value: &str) -> Result<Self, ConfigurationError> {
        if value.is_empty() {
            return Err(ConfigurationError::EmptyName { field });
        }
        if !is_qualified_name(value) {
            return Err(ConfigurationError::InvalidIdentifier {
                field,
                value: value.to_string(),
            });
        }
        Ok(Self {
            spelled: value.to_string(),
        })
    }

    /// The name as configured.
    pub fn as_str(&self) -> &str {
        &self.spelled
    }

    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.spelled)
    }

    /// The fully-qualified name, if configured.
    pub fn fqn(&self) -> Option<&str> {
        self.spelled.contains('.').then_some(self.spelled.as_str())
    }

    /// Returns true if both patterns can name the same type: the simple
    /// names are equal and, when both are fully qualified, so are the
    /// fully-qualified names.
    pub fn overlaps(&self, other: &TypePattern) -> bool {
        if self.simple_name() != other.simple_name() {
            return false;
        }
        match (self.fqn(), other.fqn()) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    /// Compare against a known fully-qualified name.
    pub fn matches_fqn(&self, fqn: &str) -> bool {
        match self.fqn() {
            Some(expected) => expected == fqn,
            None => simple_name_of(fqn) == self.simple_name(),
        }
    }
}

/// Per-module state that matchers consult.
#[derive(Debug, Clone)]
pub struct MatchContext<'a> {
    symbols: SymbolTable<'a>,
}

impl<'a> MatchContext<'a> {
    pub fn new(unit: &CompilationUnit, index: &'a TypeIndex) -> Self {
        Self {
            symbols: SymbolTable::from_unit(unit, index),
        }
    }

    pub fn symbols(&self) -> &SymbolTable<'a> {
        &self.symbols
    }
}

/// Matches a class whose single superclass is the configured type.
///
/// The simple name must be equal exactly; type arguments are ignored. When
/// the configured name is fully qualified and the superclass resolves, the
/// two fully-qualified names must also be equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupertypeMatcher {
    target: TypePattern,
}

impl SupertypeMatcher {
    pub fn new(target: TypePattern) -> Self {
        Self { target }
    }

    pub fn matches(&self, decl: &ClassDecl, cx: &MatchContext<'_>) -> bool {
        let Some(superclass) = decl.superclass() else {
            return false;
        };
        if superclass.simple_name() != self.target.simple_name() {
            return false;
        }
        let Some(expected) = self.target.fqn() else {
            return true;
        };
        let actual = match &superclass.resolved {
            Some(resolved) => Some(resolved.clone()),
            None => cx.symbols().resolve(&superclass.name).into_type(),
        };
        match actual {
            Some(actual) => actual == expected,
            None => true,
        }
    }
}

/// Matches a member reference `Owner.member`.
///
/// The member name must be equal. The owner is compared, in order of
/// preference, through the reference's resolved owner, through the symbol
/// table's resolution of the qualifier, and finally by simple name. A
/// qualifier spelled with dots in source only matches a fully-qualified
/// pattern, by its full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMatcher {
    owner: TypePattern,
    member: String,
}

impl ReferenceMatcher {
    pub fn new(owner: TypePattern, member: impl Into<String>) -> Self {
        Self {
            owner,
            member: member.into(),
        }
    }

    pub fn matches(&self, access: &FieldAccess, cx: &MatchContext<'_>) -> bool {
        if access.name.name != self.member {
            return false;
        }
        if let Some(owner) = &access.owner {
            return self.owner.matches_fqn(owner);
        }
        let Some(qualifier) = access.target.dotted_name() else {
            return false;
        };
        if qualifier.contains('.') {
            return self.owner.fqn() == Some(qualifier.as_str());
        }
        if qualifier != self.owner.simple_name() {
            return false;
        }
        match (self.owner.fqn(), cx.symbols().resolve(&qualifier).into_type()) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => true,
        }
    }
}
