// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Transformation units for recast.
//!
//! This crate sits on top of the `recast-tree` model and provides:
//! - Name resolution against a host-supplied type index
//! - Pattern matchers for supertypes and constant references
//! - Rewrite rules and import reconciliation
//! - Transformation units, composite pipelines, and JSON manifests
//! - Error types shared by the units

pub mod config;
pub mod error;
pub mod imports;
pub mod matcher;
pub mod pipeline;
pub mod rules;
pub mod symbols;
pub mod unit;

pub use config::{Manifest, UnitConfig};
pub use error::{ApplyError, ConfigurationError, ResolutionError, StructuralMismatch};
pub use imports::ImportChanges;
pub use pipeline::Pipeline;
pub use rules::{ConstantMapping, MappingTable};
pub use symbols::{SymbolTable, TypeIndex};
pub use unit::{
    Applied, ChangeConstant, ChangeConstants, ChangeSupertype, TransformationUnit, UnitReport,
};
