// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for unit construction and application.
//!
//! - [`ConfigurationError`]: malformed or conflicting unit configuration,
//!   raised while building a unit, before any tree is touched.
//! - [`ResolutionError`]: a required import cannot be computed. Aborts the
//!   unit for one module and leaves that module's tree as it was.
//! - [`StructuralMismatch`]: a pattern matched a shape its rule cannot
//!   rewrite. Not an error: it is logged, reported, and the node is left alone.
//! - [`ApplyError`]: a failed `apply`, carrying the committed tree.

use std::fmt;

use recast_tree::{CompilationUnit, NodeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::unit::UnitReport;

/// Invalid unit configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A required name is empty.
    #[error("`{field}` must not be empty")]
    EmptyName { field: &'static str },

    /// A name is not a valid (possibly dotted) identifier.
    #[error("`{field}` is not a valid name: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },

    /// The rule would rewrite a name to itself.
    #[error("old and new names are identical: {name}")]
    IdenticalNames { name: String },

    /// The same (owner, member) key appears twice in a mapping table.
    #[error("duplicate mapping for {owner}.{member}")]
    DuplicateKey { owner: String, member: String },

    /// A mapping's target is also a source key in the same table.
    #[error("mapping target {owner}.{member} is also mapped; chained mappings are not allowed")]
    ChainedMapping { owner: String, member: String },

    /// A batch migration with no mappings.
    #[error("mapping table is empty")]
    EmptyTable,

    /// The manifest could not be read.
    #[error("malformed manifest: {message}")]
    Manifest { message: String },
}

/// A required fully-qualified name cannot be determined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("cannot resolve `{name}` to a fully-qualified type")]
    Unknown { name: String },

    #[error("`{name}` is ambiguous: {candidates:?}")]
    Ambiguous { name: String, candidates: Vec<String> },

    /// The simple name is already imported from elsewhere.
    #[error("cannot import `{fqn}`: `{existing}` is already imported under the same name")]
    Conflict { fqn: String, existing: String },
}

/// A matched node that the rule could not rewrite safely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralMismatch {
    pub node: NodeId,
    pub reason: String,
}

impl StructuralMismatch {
    pub fn new(node: NodeId, reason: impl Into<String>) -> Self {
        Self {
            node,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StructuralMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.node, self.reason)
    }
}

/// A unit failed on one module.
///
/// Units that already completed inside an enclosing pipeline are not rolled
/// back: `committed` is the tree after them, and `completed` holds their
/// reports. For a failing leaf unit, `committed` is the unit's own input.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unit `{unit}` failed: {source}")]
pub struct ApplyError {
    /// Name of the unit that failed.
    pub unit: String,
    pub source: ResolutionError,
    pub committed: Box<CompilationUnit>,
    pub completed: Vec<UnitReport>,
}

impl ApplyError {
    pub fn new(unit: impl Into<String>, source: ResolutionError, committed: CompilationUnit) -> Self {
        Self {
            unit: unit.into(),
            source,
            committed: Box::new(committed),
            completed: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::DuplicateKey {
            owner: "Constants".to_string(),
            member: "MAX".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate mapping for Constants.MAX");

        let err = ConfigurationError::EmptyName { field: "newOwner" };
        assert_eq!(err.to_string(), "`newOwner` must not be empty");
    }

    #[test]
    fn test_resolution_error_display() {
        let err = ResolutionError::Ambiguous {
            name: "Car".to_string(),
            candidates: vec!["a.Car".to_string(), "b.Car".to_string()],
        };
        assert_eq!(err.to_string(), r#"`Car` is ambiguous: ["a.Car", "b.Car"]"#);
    }

    #[test]
    fn test_apply_error_source() {
        let tree = recast_tree::parse_compilation_unit("class A {}").unwrap();
        let err = ApplyError::new(
            "ChangeSupertype",
            ResolutionError::Unknown {
                name: "Car".to_string(),
            },
            tree.clone(),
        );
        assert_eq!(
            err.to_string(),
            "unit `ChangeSupertype` failed: cannot resolve `Car` to a fully-qualified type"
        );
        assert_eq!(*err.committed, tree);
        assert!(std::error::Error::source(&err).is_some());
    }
}
