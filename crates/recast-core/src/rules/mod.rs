// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Rewrite rules and the per-pass state they share.
//!
//! A rule is a [`Transformer`](recast_tree::Transformer) built for one pass
//! over one module. It never mutates the tree; it returns replacement nodes
//! and records its side requests (imports to add, imports that may have
//! become unused, mismatches) in a [`RewriteState`].

use std::collections::BTreeSet;

use recast_tree::{CompilationUnit, IdGen, NodeId};
use tracing::warn;

use crate::error::StructuralMismatch;

mod constant;
mod supertype;

pub use constant::{ConstantMapping, MappingTable};
pub use supertype::SupertypeChange;

pub(crate) use constant::ConstantRule;
pub(crate) use supertype::SupertypeRule;

/// Requests and counters accumulated during one pass.
#[derive(Debug)]
pub struct RewriteState {
    unit: String,
    additions: BTreeSet<String>,
    removals: BTreeSet<String>,
    mismatches: Vec<StructuralMismatch>,
    retargeted: BTreeSet<NodeId>,
    rewrites: usize,
    ids: IdGen,
}

impl RewriteState {
    pub fn new(unit: impl Into<String>, tree: &CompilationUnit) -> Self {
        Self {
            unit: unit.into(),
            additions: BTreeSet::new(),
            removals: BTreeSet::new(),
            mismatches: Vec::new(),
            retargeted: BTreeSet::new(),
            rewrites: 0,
            ids: tree.id_gen(),
        }
    }

    /// Ask for an import of `name` (simple or fully qualified).
    pub fn queue_import(&mut self, name: &str) {
        self.additions.insert(name.to_string());
    }

    /// Mark the import of `name` as possibly unused.
    pub fn queue_removal(&mut self, name: &str) {
        self.removals.insert(name.to_string());
    }

    /// Note that the name at `node` now refers to a different type.
    pub fn retarget(&mut self, node: NodeId) {
        self.retargeted.insert(node);
    }

    pub fn record_rewrite(&mut self) {
        self.rewrites += 1;
    }

    pub fn mismatch(&mut self, node: NodeId, reason: impl Into<String>) {
        let mismatch = StructuralMismatch::new(node, reason);
        warn!(unit = %self.unit, node = %mismatch.node, "skipped: {}", mismatch.reason);
        self.mismatches.push(mismatch);
    }

    pub fn fresh_id(&mut self) -> NodeId {
        self.ids.fresh()
    }

    pub fn additions(&self) -> &BTreeSet<String> {
        &self.additions
    }

    pub fn removals(&self) -> &BTreeSet<String> {
        &self.removals
    }

    /// Name nodes the pass pointed at a new type.
    pub fn retargeted(&self) -> &BTreeSet<NodeId> {
        &self.retargeted
    }

    pub fn rewrites(&self) -> usize {
        self.rewrites
    }

    pub fn mismatches(&self) -> &[StructuralMismatch] {
        &self.mismatches
    }

    pub fn into_mismatches(self) -> Vec<StructuralMismatch> {
        self.mismatches
    }

    /// First id not handed out yet.
    pub fn next_id(&self) -> u32 {
        self.ids.peek()
    }
}
