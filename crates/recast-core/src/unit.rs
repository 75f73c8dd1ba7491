// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Transformation units.
//!
//! A unit is built once from configuration and is immutable afterwards. Its
//! single operation, [`TransformationUnit::apply`], takes a module tree and
//! returns a new one; the input is never modified. Per-pass state (queued
//! imports, counters, fresh node ids) lives in the traversal, not the unit,
//! so one unit can be applied to many modules from many threads.
//!
//! # Outcomes
//!
//! - No match: `Ok` with a tree equal to the input and `changed == false`.
//! - Match: `Ok` with the rewritten tree and its reconciled imports.
//! - A required import cannot be computed: `Err(ApplyError)` whose
//!   `committed` tree is the unit's input.
//!
//! # Example
//!
//! ```
//! use recast_core::{ChangeSupertype, TransformationUnit, TypeIndex};
//! use recast_tree::{parse_compilation_unit, to_source};
//!
//! let unit = ChangeSupertype::new("Vehicle", "com.new.Car").unwrap();
//! let tree = parse_compilation_unit("class Foo extends Vehicle {}").unwrap();
//! let applied = unit.apply(&tree, &TypeIndex::new()).unwrap();
//!
//! assert_eq!(
//!     to_source(&applied.tree),
//!     "import com.new.Car;\n\nclass Foo extends Car {}"
//! );
//! assert_eq!(applied.report.rewrites, 1);
//! ```

use std::fmt;

use recast_tree::visitor::rewrite_compilation_unit;
use recast_tree::CompilationUnit;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApplyError, ConfigurationError, StructuralMismatch};
use crate::imports::reconcile;
use crate::matcher::MatchContext;
use crate::rules::{
    ConstantMapping, ConstantRule, MappingTable, RewriteState, SupertypeChange, SupertypeRule,
};
use crate::symbols::TypeIndex;

/// A named, independently testable rewrite.
pub trait TransformationUnit: Send + Sync + fmt::Debug {
    /// Short name used in reports and logs.
    fn name(&self) -> &str;

    /// Human-readable summary of what the unit does.
    fn description(&self) -> String;

    /// Rewrite one module. Never modifies `tree`.
    fn apply(&self, tree: &CompilationUnit, types: &TypeIndex) -> Result<Applied, ApplyError>;

    /// Nested units, for composites.
    fn children(&self) -> &[Box<dyn TransformationUnit>] {
        &[]
    }
}

/// A successful `apply`.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub tree: CompilationUnit,
    pub report: UnitReport,
}

/// What a unit did to one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    pub unit: String,
    pub changed: bool,
    pub rewrites: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports_added: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports_removed: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<StructuralMismatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<UnitReport>,
}

impl UnitReport {
    pub fn unchanged(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            ..Self::default()
        }
    }
}

/// Run one rule pass and reconcile imports.
fn apply_rule<F>(
    unit: &str,
    tree: &CompilationUnit,
    types: &TypeIndex,
    pass: F,
) -> Result<Applied, ApplyError>
where
    F: FnOnce(&MatchContext<'_>, &mut RewriteState) -> Option<CompilationUnit>,
{
    let cx = MatchContext::new(tree, types);
    let mut state = RewriteState::new(unit, tree);

    let Some(rewritten) = pass(&cx, &mut state) else {
        debug!(unit, mismatches = state.mismatches().len(), "no match");
        return Ok(Applied {
            tree: tree.clone(),
            report: UnitReport {
                mismatches: state.into_mismatches(),
                ..UnitReport::unchanged(unit)
            },
        });
    };

    let (out, imports) = match reconcile(&rewritten, cx.symbols(), &mut state) {
        Ok(reconciled) => reconciled,
        Err(source) => {
            debug!(unit, error = %source, "import resolution failed");
            return Err(ApplyError::new(unit, source, tree.clone()));
        }
    };

    debug!(
        unit,
        rewrites = state.rewrites(),
        added = imports.added.len(),
        removed = imports.removed.len(),
        "applied"
    );
    Ok(Applied {
        tree: out,
        report: UnitReport {
            unit: unit.to_string(),
            changed: true,
            rewrites: state.rewrites(),
            imports_added: imports.added,
            imports_removed: imports.removed,
            mismatches: state.into_mismatches(),
            children: Vec::new(),
        },
    })
}

/// Retarget every class whose superclass is `old` to extend `new` instead.
#[derive(Debug, Clone)]
pub struct ChangeSupertype {
    change: SupertypeChange,
}

impl ChangeSupertype {
    pub fn new(old: &str, new: &str) -> Result<Self, ConfigurationError> {
        Ok(Self {
            change: SupertypeChange::new(old, new)?,
        })
    }
}

impl TransformationUnit for ChangeSupertype {
    fn name(&self) -> &str {
        "ChangeSupertype"
    }

    fn description(&self) -> String {
        format!(
            "Change supertype `{}` to `{}`",
            self.change.old().as_str(),
            self.change.new_type().as_str()
        )
    }

    fn apply(&self, tree: &CompilationUnit, types: &TypeIndex) -> Result<Applied, ApplyError> {
        apply_rule(self.name(), tree, types, |cx, state| {
            let mut rule = SupertypeRule::new(&self.change, cx, state);
            rewrite_compilation_unit(&mut rule, tree)
        })
    }
}

/// Migrate references to one constant.
#[derive(Debug, Clone)]
pub struct ChangeConstant {
    table: MappingTable,
}

impl ChangeConstant {
    pub fn new(
        old_owner: &str,
        old_member: &str,
        new_owner: &str,
        new_member: &str,
    ) -> Result<Self, ConfigurationError> {
        let mapping = ConstantMapping::new(old_owner, old_member, new_owner, new_member);
        Ok(Self {
            table: MappingTable::new(vec![mapping])?,
        })
    }

    pub fn mapping(&self) -> &ConstantMapping {
        &self.table.mappings()[0]
    }
}

impl TransformationUnit for ChangeConstant {
    fn name(&self) -> &str {
        "ChangeConstant"
    }

    fn description(&self) -> String {
        let m = self.mapping();
        format!(
            "Change `{}.{}` to `{}.{}`",
            m.old_owner, m.old_member, m.new_owner, m.new_member
        )
    }

    fn apply(&self, tree: &CompilationUnit, types: &TypeIndex) -> Result<Applied, ApplyError> {
        apply_rule(self.name(), tree, types, |cx, state| {
            let mut rule = ConstantRule::new(&self.table, cx, state);
            rewrite_compilation_unit(&mut rule, tree)
        })
    }
}

/// Migrate references to a batch of constants in a single pass.
#[derive(Debug, Clone)]
pub struct ChangeConstants {
    table: MappingTable,
}

impl ChangeConstants {
    pub fn new(mappings: Vec<ConstantMapping>) -> Result<Self, ConfigurationError> {
        Ok(Self {
            table: MappingTable::new(mappings)?,
        })
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }
}

impl TransformationUnit for ChangeConstants {
    fn name(&self) -> &str {
        "ChangeConstants"
    }

    fn description(&self) -> String {
        format!("Change {} constant reference(s)", self.table.len())
    }

    fn apply(&self, tree: &CompilationUnit, types: &TypeIndex) -> Result<Applied, ApplyError> {
        apply_rule(self.name(), tree, types, |cx, state| {
            let mut rule = ConstantRule::new(&self.table, cx, state);
            rewrite_compilation_unit(&mut rule, tree)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolutionError;
    use recast_tree::{parse_compilation_unit, to_source};

    #[test]
    fn test_no_match_is_unchanged_success() {
        let unit = ChangeSupertype::new("Vehicle", "com.new.Car").unwrap();
        let tree = parse_compilation_unit("class Foo extends Base {}").unwrap();
        let applied = unit.apply(&tree, &TypeIndex::new()).unwrap();
        assert_eq!(applied.tree, tree);
        assert_eq!(applied.report, UnitReport::unchanged("ChangeSupertype"));
    }

    #[test]
    fn test_resolution_failure_commits_input() {
        let unit = ChangeSupertype::new("Vehicle", "Car").unwrap();
        let tree = parse_compilation_unit("class Foo extends Vehicle {}").unwrap();
        let err = unit.apply(&tree, &TypeIndex::new()).unwrap_err();
        assert_eq!(err.unit, "ChangeSupertype");
        assert_eq!(
            err.source,
            ResolutionError::Unknown {
                name: "Car".to_string()
            }
        );
        assert_eq!(*err.committed, tree);
    }

    #[test]
    fn test_single_constant() {
        let unit = ChangeConstant::new("Constants", "MAX", "com.acme.Limits", "UPPER").unwrap();
        let tree = parse_compilation_unit(
            "package app;\n\nimport com.acme.Constants;\n\nclass A { int a = Constants.MAX; }",
        )
        .unwrap();
        let applied = unit.apply(&tree, &TypeIndex::new()).unwrap();
        assert_eq!(
            to_source(&applied.tree),
            "package app;\n\nimport com.acme.Limits;\n\nclass A { int a = Limits.UPPER; }"
        );
        assert_eq!(applied.report.imports_added, vec!["com.acme.Limits"]);
        assert_eq!(applied.report.imports_removed, vec!["com.acme.Constants"]);
    }

    #[test]
    fn test_descriptions() {
        let unit = ChangeConstant::new("Constants", "MAX", "Limits", "UPPER").unwrap();
        assert_eq!(unit.description(), "Change `Constants.MAX` to `Limits.UPPER`");
        let unit = ChangeSupertype::new("Vehicle", "Car").unwrap();
        assert_eq!(unit.description(), "Change supertype `Vehicle` to `Car`");
        assert!(unit.children().is_empty());
    }

    #[test]
    fn test_report_serializes_compactly() {
        let json = serde_json::to_value(UnitReport::unchanged("ChangeConstants")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"unit": "ChangeConstants", "changed": false, "rewrites": 0})
        );
    }
}
