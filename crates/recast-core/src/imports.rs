// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Keep a module's import list consistent with its rewritten references.
//!
//! Rules queue additions (types a rewritten reference now needs) and removal
//! candidates (types a rewritten reference no longer names). [`reconcile`]
//! turns those requests into concrete edits:
//!
//! - an addition is resolved to a fully-qualified name and inserted unless
//!   it is already visible (same package, `java.lang`, declared locally, or
//!   imported) or no longer referenced at all;
//! - a removal candidate is dropped only when no remaining reference in the
//!   module uses its simple name;
//! - an addition whose simple name is already imported from elsewhere is a
//!   conflict, unless that import is a removal candidate that only the
//!   rewritten references used;
//! - new imports are placed in lexicographic order inside the existing group
//!   that shares the longest package prefix, and untouched imports keep their
//!   order and trivia.

use std::collections::BTreeSet;
use std::sync::Arc;

use recast_tree::visitor::NameUsage;
use recast_tree::{qualifier_of, simple_name_of, ClassDecl, CompilationUnit, Import, Space};
use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;
use crate::rules::RewriteState;
use crate::symbols::{Resolved, SymbolTable, IMPLICIT_PACKAGE};

/// Imports actually added and removed for one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ImportChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Apply the queued import requests in `state` to `tree`.
///
/// On error nothing is applied; the caller keeps its input tree.
pub fn reconcile(
    tree: &CompilationUnit,
    symbols: &SymbolTable<'_>,
    state: &mut RewriteState,
) -> Result<(CompilationUnit, ImportChanges), ResolutionError> {
    let used = NameUsage::collect(tree);
    let untouched = NameUsage::collect_excluding(tree, state.retargeted());
    let candidates: BTreeSet<usize> = tree
        .imports
        .iter()
        .enumerate()
        .filter(|(_, import)| {
            state
                .removals()
                .iter()
                .any(|name| is_removal_candidate(import, name))
        })
        .map(|(idx, _)| idx)
        .collect();

    let mut additions = BTreeSet::new();
    let mut replaced = BTreeSet::new();
    for name in state.additions() {
        let fqn = match symbols.qualify(name) {
            Resolved::Type(fqn) => fqn,
            Resolved::Ambiguous(candidates) => {
                return Err(ResolutionError::Ambiguous {
                    name: name.clone(),
                    candidates,
                })
            }
            Resolved::Unknown => return Err(ResolutionError::Unknown { name: name.clone() }),
        };
        let simple = simple_name_of(&fqn);
        let package = qualifier_of(&fqn);
        if !used.contains(simple)
            || package == symbols.package()
            || package == Some(IMPLICIT_PACKAGE)
            || symbols.is_local(&fqn)
        {
            continue;
        }
        if tree.type_imports().any(|import| import.name == fqn) {
            continue;
        }
        let clash = tree.imports.iter().enumerate().find(|(_, import)| {
            !import.is_static() && import.simple_name() == Some(simple) && import.name != fqn
        });
        if let Some((idx, existing)) = clash {
            // A retired import can only give way to the new one when no
            // reference the pass left alone still binds to it.
            if !candidates.contains(&idx) || untouched.contains(simple) {
                return Err(ResolutionError::Conflict {
                    fqn,
                    existing: existing.name.clone(),
                });
            }
            replaced.insert(idx);
        } else if tree
            .imports
            .iter()
            .any(|import| import.wildcard && !import.is_static() && Some(import.name.as_str()) == package)
        {
            continue;
        }
        additions.insert(fqn);
    }

    let removing: BTreeSet<usize> = candidates
        .iter()
        .copied()
        .filter(|idx| {
            replaced.contains(idx)
                || tree.imports[*idx]
                    .simple_name()
                    .is_some_and(|simple| !used.contains(simple))
        })
        .collect();

    if additions.is_empty() && removing.is_empty() {
        return Ok((
            tree.clone().with_next_id(state.next_id()),
            ImportChanges::default(),
        ));
    }

    let eol = line_break(tree);
    let mut changes = ImportChanges::default();
    let (mut imports, mut leftover) = remove_imports(tree, &removing, &mut changes);
    let mut first_prefix = tree.types.first().map(|decl| decl.prefix.clone());

    for fqn in &additions {
        let mut import = Import::single(state.fresh_id(), Space::empty(), fqn.clone());
        if imports.is_empty() {
            match (leftover.take(), &tree.package, first_prefix.as_mut()) {
                (Some(prefix), _, _) => import.prefix = prefix,
                (None, Some(_), first) => {
                    import.prefix = Space::new(eol.repeat(2));
                    if let Some(first) = first {
                        *first = ensure_blank_line(first, eol);
                    }
                }
                (None, None, Some(first)) => {
                    let (header, rest) = split_header(first.as_str(), eol);
                    import.prefix = header;
                    *first = rest;
                }
                (None, None, None) => {}
            }
            imports.push(import);
        } else {
            insert_sorted(&mut imports, import, eol);
        }
        changes.added.push(fqn.clone());
    }

    if imports.is_empty() && tree.package.is_none() {
        if let (Some(prefix), Some(first)) = (leftover, first_prefix.as_mut()) {
            *first = prefix;
        }
    }

    let mut out = tree.with_imports(imports);
    if let (Some(first), Some(decl)) = (first_prefix, tree.types.first()) {
        if first != decl.prefix {
            out.types[0] = Arc::new(ClassDecl {
                prefix: first,
                ..(**decl).clone()
            });
        }
    }
    Ok((out.with_next_id(state.next_id()), changes))
}

fn is_removal_candidate(import: &Import, name: &str) -> bool {
    if import.is_static() || import.wildcard {
        return false;
    }
    if name.contains('.') {
        import.name == name
    } else {
        import.simple_name() == Some(name)
    }
}

/// Drop the imports at `removing`.
///
/// A removed import at the start of the list or of a group hands its prefix
/// to the next surviving import. A prefix with nowhere to go is returned.
fn remove_imports(
    tree: &CompilationUnit,
    removing: &BTreeSet<usize>,
    changes: &mut ImportChanges,
) -> (Vec<Import>, Option<Space>) {
    let mut kept: Vec<Import> = Vec::with_capacity(tree.imports.len());
    let mut carry: Option<Space> = None;
    for (idx, import) in tree.imports.iter().enumerate() {
        if removing.contains(&idx) {
            let starts_group = kept.is_empty() || import.prefix.has_blank_line();
            if starts_group && carry.is_none() {
                carry = Some(import.prefix.clone());
            }
            changes.removed.push(import.name.clone());
            continue;
        }
        match carry.take() {
            Some(prefix) => kept.push(import.with_prefix(prefix)),
            None => kept.push(import.clone()),
        }
    }
    (kept, carry)
}

fn insert_sorted(imports: &mut Vec<Import>, mut import: Import, eol: &str) {
    let (start, end) = best_group(imports, &import.name);
    let pos = imports[start..end]
        .iter()
        .position(|existing| !existing.is_static() && existing.name > import.name)
        .map(|offset| start + offset)
        .or_else(|| {
            imports[start..end]
                .iter()
                .rposition(|existing| !existing.is_static())
                .map(|offset| start + offset + 1)
        })
        .unwrap_or(start);

    if pos == start {
        import.prefix = imports[start].prefix.clone();
        let separator = if end > start {
            Space::new(eol)
        } else {
            Space::new(eol.repeat(2))
        };
        imports[start] = imports[start].with_prefix(separator);
    } else {
        import.prefix = Space::new(eol);
    }
    imports.insert(pos, import);
}

/// The `[start, end)` range of the group whose non-static imports share the
/// longest package prefix with `fqn`. Ties go to the earlier group.
fn best_group(imports: &[Import], fqn: &str) -> (usize, usize) {
    let mut groups = Vec::new();
    let mut start = 0;
    for (idx, import) in imports.iter().enumerate().skip(1) {
        if import.prefix.has_blank_line() {
            groups.push((start, idx));
            start = idx;
        }
    }
    groups.push((start, imports.len()));

    let mut best: Option<((usize, usize), usize)> = None;
    for (start, end) in groups {
        let score = imports[start..end]
            .iter()
            .filter(|import| !import.is_static())
            .map(|import| common_segments(&import.name, fqn))
            .max();
        let Some(score) = score else {
            continue;
        };
        let better = match best {
            Some((_, top)) => score > top,
            None => true,
        };
        if better {
            best = Some(((start, end), score));
        }
    }
    // Only static imports: the new one opens the list.
    best.map(|(range, _)| range).unwrap_or((0, 0))
}

fn common_segments(a: &str, b: &str) -> usize {
    a.split('.')
        .zip(b.split('.'))
        .take_while(|(x, y)| x == y)
        .count()
}

fn line_break(tree: &CompilationUnit) -> &'static str {
    let crlf = tree
        .imports
        .iter()
        .map(|import| &import.prefix)
        .chain(tree.types.iter().map(|decl| &decl.prefix))
        .chain(std::iter::once(&tree.eof))
        .any(|space| space.as_str().contains("\r\n"));
    if crlf {
        "\r\n"
    } else {
        "\n"
    }
}

fn ensure_blank_line(prefix: &Space, eol: &str) -> Space {
    if prefix.has_blank_line() {
        prefix.clone()
    } else if prefix.as_str().starts_with(eol) {
        Space::new(format!("{}{}", eol, prefix.as_str()))
    } else {
        Space::new(format!("{}{}{}", eol, eol, prefix.as_str()))
    }
}

/// Split leading file trivia at its last empty line: the header stays on
/// top of the new import, the rest stays with the declaration.
fn split_header(text: &str, eol: &str) -> (Space, Space) {
    let blank = eol.repeat(2);
    match text.rfind(&blank) {
        Some(idx) => (
            Space::new(&text[..idx + blank.len()]),
            Space::new(format!("{}{}", blank, &text[idx + blank.len()..])),
        ),
        None => (Space::empty(), Space::new(format!("{}{}", blank, text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::TypeIndex;
    use recast_tree::{parse_compilation_unit, to_source};

    fn reconcile_source(
        source: &str,
        index: &TypeIndex,
        add: &[&str],
        remove: &[&str],
    ) -> Result<(String, ImportChanges), ResolutionError> {
        reconcile_with(source, index, add, remove, false)
    }

    /// Like `reconcile_source`, with the superclass marked as retargeted.
    fn reconcile_retargeted(
        source: &str,
        add: &[&str],
        remove: &[&str],
    ) -> Result<(String, ImportChanges), ResolutionError> {
        reconcile_with(source, &TypeIndex::new(), add, remove, true)
    }

    fn reconcile_with(
        source: &str,
        index: &TypeIndex,
        add: &[&str],
        remove: &[&str],
        retarget_superclass: bool,
    ) -> Result<(String, ImportChanges), ResolutionError> {
        let tree = parse_compilation_unit(source).unwrap();
        let symbols = SymbolTable::from_unit(&tree, index);
        let mut state = RewriteState::new("test", &tree);
        if retarget_superclass {
            state.retarget(tree.types[0].superclass().unwrap().id);
        }
        for name in add {
            state.queue_import(name);
        }
        for name in remove {
            state.queue_removal(name);
        }
        let (out, changes) = reconcile(&tree, &symbols, &mut state)?;
        assert!(out.next_id >= tree.next_id);
        Ok((to_source(&out), changes))
    }

    #[test]
    fn test_insert_sorted_within_group() {
        let index: TypeIndex = ["b.B"].into_iter().collect();
        let (out, changes) = reconcile_source(
            "package p;\n\nimport a.A;\nimport c.C;\n\nclass X extends B {}",
            &index,
            &["B"],
            &[],
        )
        .unwrap();
        assert_eq!(
            out,
            "package p;\n\nimport a.A;\nimport b.B;\nimport c.C;\n\nclass X extends B {}"
        );
        assert_eq!(changes.added, vec!["b.B"]);
    }

    #[test]
    fn test_insert_into_matching_group() {
        let (out, _) = reconcile_source(
            "import com.acme.A;\n\nimport java.util.List;\n\nclass X extends Map<String> {}",
            &TypeIndex::new(),
            &["java.util.Map"],
            &[],
        )
        .unwrap();
        assert_eq!(
            out,
            "import com.acme.A;\n\nimport java.util.List;\nimport java.util.Map;\n\nclass X extends Map<String> {}"
        );
    }

    #[test]
    fn test_insert_first_in_group_takes_prefix() {
        let (out, _) = reconcile_source(
            "// header\nimport b.B;\nimport c.C;\nclass X extends A {}",
            &TypeIndex::new(),
            &["a.A"],
            &[],
        )
        .unwrap();
        assert_eq!(
            out,
            "// header\nimport a.A;\nimport b.B;\nimport c.C;\nclass X extends A {}"
        );
    }

    #[test]
    fn test_insert_into_empty_list_with_package() {
        let (out, _) = reconcile_source(
            "package p;\nclass X extends A {}",
            &TypeIndex::new(),
            &["a.A"],
            &[],
        )
        .unwrap();
        assert_eq!(out, "package p;\n\nimport a.A;\n\nclass X extends A {}");
    }

    #[test]
    fn test_insert_into_empty_list_below_header() {
        let (out, _) = reconcile_source(
            "/* h */\n\nclass X extends A {}",
            &TypeIndex::new(),
            &["a.A"],
            &[],
        )
        .unwrap();
        assert_eq!(out, "/* h */\n\nimport a.A;\n\nclass X extends A {}");
    }

    #[test]
    fn test_addition_skipped_when_visible() {
        let index: TypeIndex = ["p.Local", "java.lang.Thread"].into_iter().collect();
        let source = "package p;\nimport com.new.*;\nclass X extends Car { Local a; Thread t; }";
        let (out, changes) = reconcile_source(
            source,
            &index,
            &["com.new.Car", "Local", "java.lang.Thread", "X"],
            &[],
        )
        .unwrap();
        assert_eq!(out, source);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_addition_skipped_when_unused() {
        let source = "class X {}";
        let (out, changes) =
            reconcile_source(source, &TypeIndex::new(), &["a.A"], &[]).unwrap();
        assert_eq!(out, source);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_remove_unused_keeps_used() {
        let (out, changes) = reconcile_source(
            "import a.A;\nimport b.B;\n\nclass X { A a; }",
            &TypeIndex::new(),
            &[],
            &["A", "B"],
        )
        .unwrap();
        assert_eq!(out, "import a.A;\n\nclass X { A a; }");
        assert_eq!(changes.removed, vec!["b.B"]);
    }

    #[test]
    fn test_remove_first_carries_header() {
        let (out, _) = reconcile_source(
            "// header\nimport a.A;\nimport b.B;\nclass X extends B {}",
            &TypeIndex::new(),
            &[],
            &["a.A"],
        )
        .unwrap();
        assert_eq!(out, "// header\nimport b.B;\nclass X extends B {}");
    }

    #[test]
    fn test_remove_all_imports() {
        let (out, _) = reconcile_source(
            "// header\n\nimport a.A;\n\nclass X {}",
            &TypeIndex::new(),
            &[],
            &["A"],
        )
        .unwrap();
        assert_eq!(out, "// header\n\nclass X {}");

        let (out, _) = reconcile_source(
            "package p;\n\nimport a.A;\n\nclass X {}",
            &TypeIndex::new(),
            &[],
            &["A"],
        )
        .unwrap();
        assert_eq!(out, "package p;\n\nclass X {}");
    }

    #[test]
    fn test_same_simple_name_replaces_retired_import_when_unused() {
        let (out, changes) = reconcile_retargeted(
            "import com.old.Vehicle;\nclass X extends Vehicle {}",
            &["com.new.Vehicle"],
            &["com.old.Vehicle"],
        )
        .unwrap();
        assert_eq!(out, "import com.new.Vehicle;\nclass X extends Vehicle {}");
        assert_eq!(changes.added, vec!["com.new.Vehicle"]);
        assert_eq!(changes.removed, vec!["com.old.Vehicle"]);
    }

    #[test]
    fn test_same_simple_name_still_used_is_conflict() {
        let err = reconcile_retargeted(
            "import com.old.Car;\n\nclass Foo extends Car {\n    Car spare;\n}",
            &["com.fresh.Car"],
            &["com.old.Car"],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::Conflict {
                fqn: "com.fresh.Car".to_string(),
                existing: "com.old.Car".to_string()
            }
        );
    }

    #[test]
    fn test_same_simple_name_not_retargeted_is_conflict() {
        let err = reconcile_source(
            "import com.old.Vehicle;\nclass X extends Vehicle {}",
            &TypeIndex::new(),
            &["com.new.Vehicle"],
            &["com.old.Vehicle"],
        )
        .unwrap_err();
        assert!(matches!(err, ResolutionError::Conflict { .. }));
    }

    #[test]
    fn test_conflicting_import_is_error() {
        let err = reconcile_source(
            "import other.Car;\nclass X extends Car {}",
            &TypeIndex::new(),
            &["com.new.Car"],
            &[],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::Conflict {
                fqn: "com.new.Car".to_string(),
                existing: "other.Car".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_and_ambiguous_additions() {
        let err = reconcile_source("class X extends Car {}", &TypeIndex::new(), &["Car"], &[])
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::Unknown {
                name: "Car".to_string()
            }
        );

        let index: TypeIndex = ["a.Car", "b.Car"].into_iter().collect();
        let err = reconcile_source("class X extends Car {}", &index, &["Car"], &[]).unwrap_err();
        assert!(matches!(err, ResolutionError::Ambiguous { .. }));
    }

    #[test]
    fn test_windows_line_breaks() {
        let (out, _) = reconcile_source(
            "import a.A;\r\nimport c.C;\r\nclass X extends B {}",
            &TypeIndex::new(),
            &["b.B"],
            &[],
        )
        .unwrap();
        assert_eq!(
            out,
            "import a.A;\r\nimport b.B;\r\nimport c.C;\r\nclass X extends B {}"
        );
    }
}
