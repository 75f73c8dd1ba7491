// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor and transformer infrastructure for tree traversal.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order** for `visit_*` and `transform_*` methods
//! - **Post-order** for `leave_*` methods
//! - Children are visited in source order
//!
//! # Transformer Pattern
//!
//! A [`Transformer`] hook returns [`Rewrite::Replaced`] to substitute a node.
//! The `rewrite_*` drivers rebuild only the spine above a replaced node:
//!
//! ```
//! use recast_tree::nodes::TypeName;
//! use recast_tree::visitor::{rewrite_compilation_unit, Rewrite, Transformer};
//! use recast_tree::{parse_compilation_unit, to_source};
//!
//! struct Retarget;
//!
//! impl Transformer for Retarget {
//!     fn transform_type_name(&mut self, node: &TypeName) -> Rewrite<TypeName> {
//!         if node.name == "Vehicle" {
//!             Rewrite::Replaced(node.with_name("Car"))
//!         } else {
//!             Rewrite::Unchanged
//!         }
//!     }
//! }
//!
//! let unit = parse_compilation_unit("class Foo extends Vehicle {}").expect("parse error");
//! let rewritten = rewrite_compilation_unit(&mut Retarget, &unit).expect("changed");
//! assert_eq!(to_source(&rewritten), "class Foo extends Car {}");
//! ```

mod declarations;
mod dispatch;
mod traits;
mod usage;

pub use declarations::{DeclarationCollector, DeclaredType};
pub use dispatch::{
    rewrite_class_decl, rewrite_compilation_unit, rewrite_each, rewrite_expr, rewrite_type_name,
    walk_block, walk_class_decl, walk_compilation_unit, walk_expr, walk_field_decl,
    walk_method_decl, walk_type_name,
};
pub use traits::{Rewrite, Transformer, VisitResult, Visitor};
pub use usage::NameUsage;
