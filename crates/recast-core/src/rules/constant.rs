// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Migrate `Owner.MEMBER` references.

use recast_tree::{Expr, FieldAccess, Ident, Rewrite, Space, Transformer};
use serde::{Deserialize, Serialize};

use super::RewriteState;
use crate::error::ConfigurationError;
use crate::matcher::{
    is_type_qualifier, validate_member, MatchContext, ReferenceMatcher, TypePattern,
};

/// One `(oldOwner, oldMember) -> (newOwner, newMember)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstantMapping {
    pub old_owner: String,
    pub old_member: String,
    pub new_owner: String,
    pub new_member: String,
}

impl ConstantMapping {
    pub fn new(
        old_owner: impl Into<String>,
        old_member: impl Into<String>,
        new_owner: impl Into<String>,
        new_member: impl Into<String>,
    ) -> Self {
        Self {
            old_owner: old_owner.into(),
            old_member: old_member.into(),
            new_owner: new_owner.into(),
            new_member: new_member.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CompiledMapping {
    old_owner: TypePattern,
    old_member: String,
    new_owner: TypePattern,
    new_member: String,
    matcher: ReferenceMatcher,
}

impl CompiledMapping {
    fn compile(mapping: &ConstantMapping) -> Result<Self, ConfigurationError> {
        let old_owner = TypePattern::parse("oldOwner", &mapping.old_owner)?;
        validate_member("oldMember", &mapping.old_member)?;
        let new_owner = TypePattern::parse("newOwner", &mapping.new_owner)?;
        validate_member("newMember", &mapping.new_member)?;
        if old_owner == new_owner && mapping.old_member == mapping.new_member {
            return Err(ConfigurationError::IdenticalNames {
                name: format!("{}.{}", mapping.old_owner, mapping.old_member),
            });
        }
        Ok(Self {
            matcher: ReferenceMatcher::new(old_owner.clone(), mapping.old_member.clone()),
            old_owner,
            old_member: mapping.old_member.clone(),
            new_owner,
            new_member: mapping.new_member.clone(),
        })
    }

    fn owner_changes(&self) -> bool {
        self.old_owner != self.new_owner
    }

    /// Both entries can match the same reference.
    fn same_key(&self, other: &CompiledMapping) -> bool {
        self.old_member == other.old_member && self.old_owner.overlaps(&other.old_owner)
    }

    /// This entry's output can be matched by `other`.
    fn feeds(&self, other: &CompiledMapping) -> bool {
        self.new_member == other.old_member && self.new_owner.overlaps(&other.old_owner)
    }
}

/// A validated set of constant mappings, applied in a single pass.
///
/// Keys are unique and no target is also a key, so the result of a pass
/// does not depend on the order references are visited in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    mappings: Vec<ConstantMapping>,
    compiled: Vec<CompiledMapping>,
}

impl MappingTable {
    pub fn new(mappings: Vec<ConstantMapping>) -> Result<Self, ConfigurationError> {
        if mappings.is_empty() {
            return Err(ConfigurationError::EmptyTable);
        }

        let mut compiled: Vec<CompiledMapping> = Vec::with_capacity(mappings.len());
        for mapping in &mappings {
            let entry = CompiledMapping::compile(mapping)?;
            if compiled.iter().any(|earlier| earlier.same_key(&entry)) {
                return Err(ConfigurationError::DuplicateKey {
                    owner: mapping.old_owner.clone(),
                    member: mapping.old_member.clone(),
                });
            }
            compiled.push(entry);
        }
        for (i, target) in compiled.iter().enumerate() {
            let chained = compiled
                .iter()
                .enumerate()
                .any(|(j, key)| i != j && target.feeds(key));
            if chained {
                return Err(ConfigurationError::ChainedMapping {
                    owner: mappings[i].new_owner.clone(),
                    member: target.new_member.clone(),
                });
            }
        }

        Ok(Self { mappings, compiled })
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn mappings(&self) -> &[ConstantMapping] {
        &self.mappings
    }

    fn find(&self, access: &FieldAccess, cx: &MatchContext<'_>) -> Option<&CompiledMapping> {
        self.compiled.iter().find(|m| m.matcher.matches(access, cx))
    }
}

pub(crate) struct ConstantRule<'r, 'a> {
    table: &'r MappingTable,
    cx: &'r MatchContext<'a>,
    state: &'r mut RewriteState,
}

impl<'r, 'a> ConstantRule<'r, 'a> {
    pub(crate) fn new(
        table: &'r MappingTable,
        cx: &'r MatchContext<'a>,
        state: &'r mut RewriteState,
    ) -> Self {
        Self { table, cx, state }
    }

    fn new_owner_fqn(&self, mapping: &CompiledMapping) -> Option<String> {
        match mapping.new_owner.fqn() {
            Some(fqn) => Some(fqn.to_string()),
            None => self
                .cx
                .symbols()
                .qualify(mapping.new_owner.simple_name())
                .into_type(),
        }
    }

    /// Build `a.b.C` as nested field accesses with fresh ids.
    fn name_chain(&mut self, dotted: &str, prefix: Space) -> Expr {
        let mut segments = dotted.split('.');
        let head = segments.next().unwrap_or(dotted);
        let mut expr = Expr::Name(Ident::new(self.state.fresh_id(), prefix, head));
        for segment in segments {
            let id = self.state.fresh_id();
            let name = Ident::new(self.state.fresh_id(), Space::empty(), segment);
            expr = Expr::FieldAccess(
                FieldAccess {
                    id,
                    target: expr,
                    dot: Space::empty(),
                    name,
                    owner: None,
                }
                .into(),
            );
        }
        expr
    }
}

impl Transformer for ConstantRule<'_, '_> {
    fn transform_field_access(&mut self, node: &FieldAccess) -> Rewrite<Expr> {
        let Some(mapping) = self.table.find(node, self.cx) else {
            return Rewrite::Unchanged;
        };
        if !node
            .target
            .dotted_name()
            .is_some_and(|qualifier| is_type_qualifier(&qualifier))
        {
            self.state.mismatch(
                node.id,
                format!(
                    "qualifier of `.{}` is not a type name; cannot retarget to `{}`",
                    node.name.name,
                    mapping.new_owner.as_str()
                ),
            );
            return Rewrite::Unchanged;
        }

        let target = match &node.target {
            _ if !mapping.owner_changes() => node.target.clone(),
            Expr::Name(ident) => {
                self.state.queue_import(mapping.new_owner.as_str());
                self.state.queue_removal(mapping.old_owner.as_str());
                self.state.retarget(ident.id);
                Expr::Name(ident.with_name(mapping.new_owner.simple_name()))
            }
            qualified => {
                let Some(fqn) = self.new_owner_fqn(mapping) else {
                    self.state.mismatch(
                        node.id,
                        format!(
                            "owner of `.{}` is spelled qualified but `{}` has no known fully-qualified name",
                            node.name.name,
                            mapping.new_owner.as_str()
                        ),
                    );
                    return Rewrite::Unchanged;
                };
                self.name_chain(&fqn, qualified.prefix().clone())
            }
        };

        let owner = match &node.owner {
            Some(_) => self.new_owner_fqn(mapping),
            None => None,
        };
        self.state.record_rewrite();
        Rewrite::Replaced(Expr::FieldAccess(
            FieldAccess {
                id: node.id,
                target,
                dot: node.dot.clone(),
                name: node.name.with_name(mapping.new_member.clone()),
                owner,
            }
            .into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::TypeIndex;
    use recast_tree::visitor::rewrite_compilation_unit;
    use recast_tree::{parse_compilation_unit, to_source, Arguments, MethodCall, NodeId};

    fn table(entries: &[(&str, &str, &str, &str)]) -> Result<MappingTable, ConfigurationError> {
        MappingTable::new(
            entries
                .iter()
                .map(|(a, b, c, d)| ConstantMapping::new(*a, *b, *c, *d))
                .collect(),
        )
    }

    fn run(table: &MappingTable, source: &str, index: &TypeIndex) -> (String, RewriteState) {
        let unit = parse_compilation_unit(source).unwrap();
        let cx = MatchContext::new(&unit, index);
        let mut state = RewriteState::new("test", &unit);
        let rewritten = {
            let mut rule = ConstantRule::new(table, &cx, &mut state);
            rewrite_compilation_unit(&mut rule, &unit)
        };
        (to_source(&rewritten.unwrap_or(unit)), state)
    }

    #[test]
    fn test_table_validation() {
        assert_eq!(table(&[]), Err(ConfigurationError::EmptyTable));
        assert_eq!(
            table(&[
                ("Constants", "MAX", "Limits", "MAX"),
                ("Constants", "MAX", "Limits", "UPPER"),
            ]),
            Err(ConfigurationError::DuplicateKey {
                owner: "Constants".to_string(),
                member: "MAX".to_string()
            })
        );
        assert_eq!(
            table(&[
                ("Constants", "MAX", "Limits", "MAX"),
                ("Limits", "MAX", "Bounds", "MAX"),
            ]),
            Err(ConfigurationError::ChainedMapping {
                owner: "Limits".to_string(),
                member: "MAX".to_string()
            })
        );
        assert!(matches!(
            table(&[("Constants", "MAX", "Constants", "MAX")]),
            Err(ConfigurationError::IdenticalNames { .. })
        ));
        assert_eq!(
            table(&[("Constants", "", "Limits", "MAX")]),
            Err(ConfigurationError::EmptyName { field: "oldMember" })
        );
    }

    #[test]
    fn test_chain_through_qualified_target_is_rejected() {
        assert_eq!(
            table(&[
                ("Constants", "MAX", "com.acme.Limits", "MAX_VALUE"),
                ("Limits", "MAX_VALUE", "com.acme.Bounds", "TOP"),
            ]),
            Err(ConfigurationError::ChainedMapping {
                owner: "com.acme.Limits".to_string(),
                member: "MAX_VALUE".to_string()
            })
        );
        assert!(table(&[
            ("Constants", "MAX", "com.acme.Limits", "MAX_VALUE"),
            ("com.other.Limits", "MAX_VALUE", "com.acme.Bounds", "TOP"),
        ])
        .is_ok());
    }

    #[test]
    fn test_duplicate_key_across_spellings_is_rejected() {
        assert_eq!(
            table(&[
                ("Constants", "MAX", "Limits", "MAX"),
                ("com.acme.Constants", "MAX", "Bounds", "TOP"),
            ]),
            Err(ConfigurationError::DuplicateKey {
                owner: "com.acme.Constants".to_string(),
                member: "MAX".to_string()
            })
        );
        assert!(table(&[
            ("com.acme.Constants", "MAX", "Limits", "MAX"),
            ("com.other.Constants", "MAX", "Bounds", "TOP"),
        ])
        .is_ok());
    }

    #[test]
    fn test_swap_is_rejected_as_chain() {
        let table = table(&[
            ("Constants", "MAX", "Constants", "MIN"),
            ("Constants", "MIN", "Constants", "MAX"),
        ]);
        assert!(matches!(table, Err(ConfigurationError::ChainedMapping { .. })));
    }

    #[test]
    fn test_rule_rewrites_owner_and_member() {
        let table = table(&[("Constants", "MAX", "Limits", "UPPER")]).unwrap();
        let (out, state) = run(
            &table,
            "class A { int a = Constants . MAX; }",
            &TypeIndex::new(),
        );
        assert_eq!(out, "class A { int a = Limits . UPPER; }");
        assert_eq!(state.rewrites(), 1);
        assert!(state.additions().contains("Limits"));
        assert!(state.removals().contains("Constants"));
        assert_eq!(state.retargeted().len(), 1);
    }

    #[test]
    fn test_rule_member_only() {
        let table = table(&[("Constants", "MAX", "Constants", "UPPER")]).unwrap();
        let (out, state) = run(&table, "class A { int a = Constants.MAX; }", &TypeIndex::new());
        assert_eq!(out, "class A { int a = Constants.UPPER; }");
        assert!(state.additions().is_empty());
        assert!(state.removals().is_empty());
    }

    #[test]
    fn test_rule_qualified_owner_becomes_qualified_chain() {
        let table = table(&[("com.acme.Constants", "MAX", "com.acme.Limits", "MAX")]).unwrap();
        let (out, state) = run(
            &table,
            "class A { int a = com.acme.Constants.MAX; }",
            &TypeIndex::new(),
        );
        assert_eq!(out, "class A { int a = com.acme.Limits.MAX; }");
        assert!(state.additions().is_empty());
    }

    #[test]
    fn test_rule_leaves_other_members() {
        let table = table(&[("Constants", "MAX", "Limits", "MAX")]).unwrap();
        let source = "class A { int a = Constants.MIN; int b = Other.MAX; }";
        let (out, state) = run(&table, source, &TypeIndex::new());
        assert_eq!(out, source);
        assert_eq!(state.rewrites(), 0);
    }

    #[test]
    fn test_rule_call_qualifier_with_resolved_owner_is_mismatch() {
        let table = table(&[("com.acme.Constants", "MAX", "com.acme.Limits", "MAX")]).unwrap();
        let unit = parse_compilation_unit("class A {}").unwrap();
        let index = TypeIndex::new();
        let cx = MatchContext::new(&unit, &index);
        let mut state = RewriteState::new("test", &unit);
        let access = FieldAccess {
            id: NodeId(100),
            target: Expr::MethodCall(
                MethodCall {
                    id: NodeId(101),
                    target: None,
                    dot: Space::empty(),
                    name: Ident::new(NodeId(102), Space::empty(), "constants"),
                    args: Arguments {
                        prefix: Space::empty(),
                        args: Vec::new(),
                        close: Space::empty(),
                    },
                }
                .into(),
            ),
            dot: Space::empty(),
            name: Ident::new(NodeId(103), Space::empty(), "MAX"),
            owner: Some("com.acme.Constants".to_string()),
        };
        let mut rule = ConstantRule::new(&table, &cx, &mut state);
        assert!(!rule.transform_field_access(&access).is_replaced());
        assert_eq!(state.mismatches().len(), 1);
        assert_eq!(state.mismatches()[0].node, NodeId(100));
    }

    #[test]
    fn test_rule_updates_resolved_owner() {
        let table = table(&[("com.acme.Constants", "MAX", "com.acme.Limits", "MAX")]).unwrap();
        let unit = parse_compilation_unit("class A {}").unwrap();
        let index = TypeIndex::new();
        let cx = MatchContext::new(&unit, &index);
        let mut state = RewriteState::new("test", &unit);
        let access = FieldAccess {
            id: NodeId(100),
            target: Expr::Name(Ident::new(NodeId(101), Space::single(), "Constants")),
            dot: Space::empty(),
            name: Ident::new(NodeId(102), Space::empty(), "MAX"),
            owner: Some("com.acme.Constants".to_string()),
        };
        let mut rule = ConstantRule::new(&table, &cx, &mut state);
        let Rewrite::Replaced(Expr::FieldAccess(rewritten)) = rule.transform_field_access(&access)
        else {
            panic!("expected a rewritten field access");
        };
        assert_eq!(rewritten.owner.as_deref(), Some("com.acme.Limits"));
        assert_eq!(rewritten.target.dotted_name().as_deref(), Some("Limits"));
        assert_eq!(rewritten.target.prefix(), &Space::single());
    }
}
