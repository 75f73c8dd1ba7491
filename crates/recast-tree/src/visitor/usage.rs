// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! NameUsage visitor: which simple names a module's code refers to.
//!
//! A name counts as used when it appears as
//!
//! - the first segment of a type reference (`Map` in `Map<K, V>`, `Outer`
//!   in `Outer.Inner`),
//! - a bare name in expression position (`Constants` in `Constants.MAX`),
//! - a marker annotation (`Override` for `@Override`).
//!
//! Import declarations themselves are not usage. The import resolver uses
//! this set to decide whether an import is still needed, and
//! [`NameUsage::collect_excluding`] to ask which names the references it did
//! not rewrite still depend on.

use std::collections::BTreeSet;

use super::dispatch::walk_compilation_unit;
use super::traits::{VisitResult, Visitor};
use crate::nodes::{CompilationUnit, Ident, NodeId, TypeName};

/// Collects the simple names referenced by a module's code.
#[derive(Debug, Default)]
pub struct NameUsage {
    names: BTreeSet<String>,
    skip: BTreeSet<NodeId>,
}

impl NameUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect used names from a module.
    pub fn collect(unit: &CompilationUnit) -> BTreeSet<String> {
        let mut usage = NameUsage::new();
        walk_compilation_unit(&mut usage, unit);
        usage.names
    }

    /// Collect used names, ignoring the type and expression names at `skip`.
    ///
    /// Children of a skipped type reference (its type arguments) still count.
    pub fn collect_excluding(
        unit: &CompilationUnit,
        skip: &BTreeSet<NodeId>,
    ) -> BTreeSet<String> {
        let mut usage = NameUsage {
            names: BTreeSet::new(),
            skip: skip.clone(),
        };
        walk_compilation_unit(&mut usage, unit);
        usage.names
    }

    fn record(&mut self, dotted: &str) {
        let head = dotted.split('.').next().unwrap_or(dotted);
        if !head.is_empty() && head != "?" {
            self.names.insert(head.to_string());
        }
    }
}

impl Visitor for NameUsage {
    fn visit_type_name(&mut self, node: &TypeName) -> VisitResult {
        if !self.skip.contains(&node.id) {
            self.record(&node.name);
        }
        VisitResult::Continue
    }

    fn visit_name_expr(&mut self, node: &Ident) -> VisitResult {
        if !self.skip.contains(&node.id) {
            self.record(&node.name);
        }
        VisitResult::Continue
    }

    fn visit_annotation(&mut self, node: &Ident) -> VisitResult {
        self.record(node.name.trim_start_matches('@'));
        VisitResult::Continue
    }
}
