// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Name resolution for one module.
//!
//! A [`TypeIndex`] is the set of fully-qualified type names the host knows
//! about (its resolver's output). A [`SymbolTable`] combines the index with
//! one module's package, imports and declared types to answer "which type
//! does this simple name refer to here?".
//!
//! Lookup order for a simple name follows the usual scoping rules:
//!
//! 1. types declared in the module,
//! 2. single-type imports,
//! 3. types in the module's own package,
//! 4. on-demand (`.*`) imports and `java.lang`.
//!
//! More than one candidate within the first tier that has any is ambiguous.

use std::collections::{BTreeMap, BTreeSet};

use recast_tree::visitor::{DeclarationCollector, DeclaredType};
use recast_tree::{qualifier_of, simple_name_of, CompilationUnit};
use serde::{Deserialize, Serialize};

/// The implicitly imported package.
pub const IMPLICIT_PACKAGE: &str = "java.lang";

/// Known fully-qualified type names, keyed by simple name.
///
/// Serializes as a sorted list of names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TypeIndex {
    by_simple: BTreeMap<String, BTreeSet<String>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fqn: impl Into<String>) {
        let fqn = fqn.into();
        self.by_simple
            .entry(simple_name_of(&fqn).to_string())
            .or_default()
            .insert(fqn);
    }

    /// Add the types a parsed module declares.
    pub fn extend_from_declarations(&mut self, declared: &[DeclaredType]) {
        for decl in declared {
            self.insert(decl.qualified_name.clone());
        }
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.by_simple
            .get(simple_name_of(fqn))
            .is_some_and(|set| set.contains(fqn))
    }

    /// Every known type with this simple name, sorted.
    pub fn candidates<'a>(&'a self, simple: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.by_simple
            .get(simple)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.by_simple.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_simple.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.by_simple.values().flatten().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TypeIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = TypeIndex::new();
        for fqn in iter {
            index.insert(fqn);
        }
        index
    }
}

impl From<Vec<String>> for TypeIndex {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<TypeIndex> for Vec<String> {
    fn from(index: TypeIndex) -> Self {
        let mut names: Vec<String> = index.by_simple.into_values().flatten().collect();
        names.sort();
        names
    }
}

/// Outcome of resolving a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Type(String),
    Ambiguous(Vec<String>),
    Unknown,
}

impl Resolved {
    /// The fully-qualified name, if resolution was unique.
    pub fn into_type(self) -> Option<String> {
        match self {
            Resolved::Type(fqn) => Some(fqn),
            _ => None,
        }
    }
}

/// Names visible in one module.
#[derive(Debug, Clone)]
pub struct SymbolTable<'a> {
    index: &'a TypeIndex,
    package: Option<String>,
    local: BTreeMap<String, String>,
    explicit: BTreeMap<String, String>,
    on_demand: Vec<String>,
}

impl<'a> SymbolTable<'a> {
    pub fn from_unit(unit: &CompilationUnit, index: &'a TypeIndex) -> Self {
        let mut local = BTreeMap::new();
        for decl in DeclarationCollector::collect(unit) {
            // Outer declarations shadow nested ones with the same name.
            local.entry(decl.simple_name).or_insert(decl.qualified_name);
        }

        let mut explicit = BTreeMap::new();
        let mut on_demand = Vec::new();
        for import in unit.imports.iter().filter(|i| !i.is_static()) {
            match import.simple_name() {
                Some(simple) => {
                    explicit.insert(simple.to_string(), import.name.clone());
                }
                None => on_demand.push(import.name.clone()),
            }
        }

        Self {
            index,
            package: unit.package_name().map(str::to_string),
            local,
            explicit,
            on_demand,
        }
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Returns true if `fqn` is declared in this module.
    pub fn is_local(&self, fqn: &str) -> bool {
        self.local.values().any(|local| local == fqn)
    }

    /// Resolve a name as spelled at a use site.
    ///
    /// A dotted name resolves through its first segment (`Outer.Inner`
    /// with `Outer` imported); when the first segment is not a type in
    /// scope, the name is taken to be fully qualified already.
    pub fn resolve(&self, name: &str) -> Resolved {
        if let Some((head, rest)) = name.split_once('.') {
            return match self.resolve_simple(head) {
                Resolved::Type(fqn) => Resolved::Type(format!("{}.{}", fqn, rest)),
                _ => Resolved::Type(name.to_string()),
            };
        }
        self.resolve_simple(name)
    }

    fn resolve_simple(&self, simple: &str) -> Resolved {
        if let Some(fqn) = self.local.get(simple) {
            return Resolved::Type(fqn.clone());
        }
        if let Some(fqn) = self.explicit.get(simple) {
            return Resolved::Type(fqn.clone());
        }

        let same_package: Vec<String> = self
            .index
            .candidates(simple)
            .filter(|fqn| qualifier_of(fqn) == self.package.as_deref())
            .map(str::to_string)
            .collect();
        if !same_package.is_empty() {
            return unique(same_package);
        }

        let visible: Vec<String> = self
            .index
            .candidates(simple)
            .filter(|fqn| {
                let qualifier = qualifier_of(fqn);
                qualifier == Some(IMPLICIT_PACKAGE)
                    || self.on_demand.iter().any(|p| Some(p.as_str()) == qualifier)
            })
            .map(str::to_string)
            .collect();
        unique(visible)
    }

    /// Determine the fully-qualified name for a configured type name.
    ///
    /// Dotted names are taken as fully qualified. A simple name resolves in
    /// scope first and falls back to a unique match anywhere in the index.
    pub fn qualify(&self, name: &str) -> Resolved {
        if name.contains('.') {
            return Resolved::Type(name.to_string());
        }
        match self.resolve_simple(name) {
            Resolved::Unknown => unique(self.index.candidates(name).map(str::to_string).collect()),
            resolved => resolved,
        }
    }
}

fn unique(mut candidates: Vec<String>) -> Resolved {
    match candidates.len() {
        0 => Resolved::Unknown,
        1 => Resolved::Type(candidates.remove(0)),
        _ => Resolved::Ambiguous(candidates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_tree::parse_compilation_unit;

    fn index() -> TypeIndex {
        [
            "com.acme.Limits",
            "com.acme.Constants",
            "com.old.Vehicle",
            "com.new.Car",
            "com.other.Car",
            "java.util.List",
            "java.lang.String",
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_type_index_lookup() {
        let index = index();
        assert_eq!(index.len(), 7);
        assert!(index.contains("com.new.Car"));
        assert!(!index.contains("com.new.Bus"));
        assert_eq!(
            index.candidates("Car").collect::<Vec<_>>(),
            vec!["com.new.Car", "com.other.Car"]
        );
    }

    #[test]
    fn test_type_index_serde_as_list() {
        let index: TypeIndex = serde_json::from_str(r#"["b.B", "a.A"]"#).unwrap();
        assert!(index.contains("a.A"));
        assert_eq!(serde_json::to_string(&index).unwrap(), r#"["a.A","b.B"]"#);
    }

    #[test]
    fn test_resolve_order() {
        let index = index();
        let unit = parse_compilation_unit(
            "package com.acme;\nimport com.old.Vehicle;\nimport java.util.*;\nclass Foo { static class Inner {} }",
        )
        .unwrap();
        let symbols = SymbolTable::from_unit(&unit, &index);

        assert_eq!(symbols.resolve("Foo"), Resolved::Type("com.acme.Foo".into()));
        assert_eq!(
            symbols.resolve("Inner"),
            Resolved::Type("com.acme.Foo.Inner".into())
        );
        assert_eq!(
            symbols.resolve("Vehicle"),
            Resolved::Type("com.old.Vehicle".into())
        );
        assert_eq!(
            symbols.resolve("Limits"),
            Resolved::Type("com.acme.Limits".into())
        );
        assert_eq!(symbols.resolve("List"), Resolved::Type("java.util.List".into()));
        assert_eq!(
            symbols.resolve("String"),
            Resolved::Type("java.lang.String".into())
        );
        assert_eq!(symbols.resolve("Car"), Resolved::Unknown);
        assert!(symbols.is_local("com.acme.Foo.Inner"));
    }

    #[test]
    fn test_resolve_qualified() {
        let index = index();
        let unit = parse_compilation_unit("import com.old.Vehicle;\nclass Foo {}").unwrap();
        let symbols = SymbolTable::from_unit(&unit, &index);
        assert_eq!(
            symbols.resolve("Vehicle.Wheel"),
            Resolved::Type("com.old.Vehicle.Wheel".into())
        );
        assert_eq!(
            symbols.resolve("com.acme.Limits"),
            Resolved::Type("com.acme.Limits".into())
        );
    }

    #[test]
    fn test_qualify_falls_back_to_index() {
        let index = index();
        let unit = parse_compilation_unit("class Foo {}").unwrap();
        let symbols = SymbolTable::from_unit(&unit, &index);
        assert_eq!(
            symbols.qualify("Limits"),
            Resolved::Type("com.acme.Limits".into())
        );
        assert_eq!(
            symbols.qualify("Car"),
            Resolved::Ambiguous(vec!["com.new.Car".into(), "com.other.Car".into()])
        );
        assert_eq!(symbols.qualify("Bus"), Resolved::Unknown);
        assert_eq!(
            symbols.qualify("com.new.Bus"),
            Resolved::Type("com.new.Bus".into())
        );
    }
}
