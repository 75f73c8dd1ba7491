// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! DeclarationCollector visitor: type declarations in a module, with their
//! qualified names.

use super::dispatch::walk_compilation_unit;
use super::traits::{VisitResult, Visitor};
use crate::nodes::{ClassDecl, ClassKind, CompilationUnit};

/// A type declared in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    pub simple_name: String,
    /// Package plus enclosing types, e.g. `com.acme.Outer.Inner`.
    pub qualified_name: String,
    pub kind: ClassKind,
    /// Nesting depth; 0 for top-level declarations.
    pub depth: usize,
}

/// Collects declared types in source order.
pub struct DeclarationCollector {
    package: Option<String>,
    enclosing: Vec<String>,
    declared: Vec<DeclaredType>,
}

impl DeclarationCollector {
    pub fn collect(unit: &CompilationUnit) -> Vec<DeclaredType> {
        let mut collector = DeclarationCollector {
            package: unit.package_name().map(str::to_string),
            enclosing: Vec::new(),
            declared: Vec::new(),
        };
        walk_compilation_unit(&mut collector, unit);
        collector.declared
    }
}

impl Visitor for DeclarationCollector {
    fn visit_class_decl(&mut self, node: &ClassDecl) -> VisitResult {
        let mut segments: Vec<&str> = Vec::new();
        if let Some(package) = &self.package {
            segments.push(package);
        }
        segments.extend(self.enclosing.iter().map(String::as_str));
        segments.push(&node.name.name);

        self.declared.push(DeclaredType {
            simple_name: node.name.name.clone(),
            qualified_name: segments.join("."),
            kind: node.kind,
            depth: self.enclosing.len(),
        });
        self.enclosing.push(node.name.name.clone());
        VisitResult::Continue
    }

    fn leave_class_decl(&mut self, _node: &ClassDecl) {
        self.enclosing.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_compilation_unit;

    #[test]
    fn test_declarations_nested_and_packaged() {
        let source = "package com.acme;\nclass Outer { static class Inner {} }\ninterface Shape {}\n";
        let unit = parse_compilation_unit(source).unwrap();
        let declared = DeclarationCollector::collect(&unit);
        let names: Vec<(&str, &str, usize)> = declared
            .iter()
            .map(|d| (d.simple_name.as_str(), d.qualified_name.as_str(), d.depth))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Outer", "com.acme.Outer", 0),
                ("Inner", "com.acme.Outer.Inner", 1),
                ("Shape", "com.acme.Shape", 0),
            ]
        );
        assert_eq!(declared[2].kind, ClassKind::Interface);
    }

    #[test]
    fn test_declarations_default_package() {
        let unit = parse_compilation_unit("class Foo {}").unwrap();
        let declared = DeclarationCollector::collect(&unit);
        assert_eq!(declared[0].qualified_name, "Foo");
    }
}
