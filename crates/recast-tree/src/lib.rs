// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A formatting-preserving syntax tree for Java-like source modules.
//!
//! # Overview
//!
//! - **Tree model**: immutable nodes with structural equality; every node
//!   keeps its leading whitespace and comments ([`Space`]).
//! - **Code generation**: print a tree back to source with the [`Codegen`]
//!   trait.
//! - **Parsing**: [`parse_compilation_unit`] reads the supported subset.
//!   Unsupported syntax is an error, never dropped.
//! - **Traversal**: read-only [`Visitor`]s and rewriting [`Transformer`]s.
//!
//! # Quick Start
//!
//! ```
//! use recast_tree::{parse_compilation_unit, to_source};
//!
//! let source = "package a;\n\n// note\nclass Foo extends Bar<T> {}\n";
//! let unit = parse_compilation_unit(source).expect("parse error");
//! assert_eq!(to_source(&unit), source);
//! ```

// ============================================================================
// Public modules and re-exports
// ============================================================================

/// Node types.
pub mod nodes;
pub use nodes::*;

/// Printing trees back to text.
pub mod codegen;
pub use codegen::{to_source, Codegen, CodegenState};

/// Visitor and transformer infrastructure.
pub mod visitor;
pub use visitor::{Rewrite, Transformer, VisitResult, Visitor};

mod parser;
pub use parser::{parse_compilation_unit, tokenize, ParseError, TokKind, Token};
