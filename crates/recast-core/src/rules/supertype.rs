// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Retarget a class's superclass.

use recast_tree::{ClassDecl, Rewrite, Transformer};

use super::RewriteState;
use crate::error::ConfigurationError;
use crate::matcher::{MatchContext, SupertypeMatcher, TypePattern};

/// `old` superclass becomes `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupertypeChange {
    old: TypePattern,
    new: TypePattern,
    matcher: SupertypeMatcher,
}

impl SupertypeChange {
    pub fn new(old: &str, new: &str) -> Result<Self, ConfigurationError> {
        let old = TypePattern::parse("old", old)?;
        let new = TypePattern::parse("new", new)?;
        if old == new {
            return Err(ConfigurationError::IdenticalNames {
                name: old.as_str().to_string(),
            });
        }
        Ok(Self {
            matcher: SupertypeMatcher::new(old.clone()),
            old,
            new,
        })
    }

    pub fn old(&self) -> &TypePattern {
        &self.old
    }

    pub fn new_type(&self) -> &TypePattern {
        &self.new
    }
}

pub(crate) struct SupertypeRule<'r, 'a> {
    change: &'r SupertypeChange,
    cx: &'r MatchContext<'a>,
    state: &'r mut RewriteState,
}

impl<'r, 'a> SupertypeRule<'r, 'a> {
    pub(crate) fn new(
        change: &'r SupertypeChange,
        cx: &'r MatchContext<'a>,
        state: &'r mut RewriteState,
    ) -> Self {
        Self { change, cx, state }
    }

    fn new_fqn(&self) -> Option<String> {
        match self.change.new.fqn() {
            Some(fqn) => Some(fqn.to_string()),
            None => self
                .cx
                .symbols()
                .qualify(self.change.new.simple_name())
                .into_type(),
        }
    }
}

impl Transformer for SupertypeRule<'_, '_> {
    fn transform_class_decl(&mut self, node: &ClassDecl) -> Rewrite<ClassDecl> {
        if !self.change.matcher.matches(node, self.cx) {
            return Rewrite::Unchanged;
        }
        let Some(superclass) = node.superclass() else {
            return Rewrite::Unchanged;
        };

        let spelled = if superclass.is_qualified() {
            let Some(fqn) = self.new_fqn() else {
                self.state.mismatch(
                    superclass.id,
                    format!(
                        "superclass `{}` is spelled qualified but `{}` has no known fully-qualified name",
                        superclass.name,
                        self.change.new.as_str()
                    ),
                );
                return Rewrite::Unchanged;
            };
            fqn
        } else {
            self.state.queue_import(self.change.new.as_str());
            self.state.queue_removal(self.change.old.as_str());
            self.state.retarget(superclass.id);
            self.change.new.simple_name().to_string()
        };

        match node.with_superclass(superclass.with_name(spelled)) {
            Some(decl) => {
                self.state.record_rewrite();
                Rewrite::Replaced(decl)
            }
            None => Rewrite::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::TypeIndex;
    use recast_tree::visitor::rewrite_compilation_unit;
    use recast_tree::{parse_compilation_unit, to_source};

    fn run(change: &SupertypeChange, source: &str, index: &TypeIndex) -> (String, RewriteState) {
        let unit = parse_compilation_unit(source).unwrap();
        let cx = MatchContext::new(&unit, index);
        let mut state = RewriteState::new("test", &unit);
        let rewritten = {
            let mut rule = SupertypeRule::new(change, &cx, &mut state);
            rewrite_compilation_unit(&mut rule, &unit)
        };
        (to_source(&rewritten.unwrap_or(unit)), state)
    }

    #[test]
    fn test_change_rejects_identical_names() {
        assert_eq!(
            SupertypeChange::new("Vehicle", "Vehicle"),
            Err(ConfigurationError::IdenticalNames {
                name: "Vehicle".to_string()
            })
        );
        assert!(SupertypeChange::new("", "Car").is_err());
    }

    #[test]
    fn test_rule_keeps_type_arguments_and_queues_imports() {
        let change = SupertypeChange::new("Vehicle", "Car").unwrap();
        let (out, state) = run(
            &change,
            "class Foo<T> extends  Vehicle<T> /* x */ {}",
            &TypeIndex::new(),
        );
        assert_eq!(out, "class Foo<T> extends  Car<T> /* x */ {}");
        assert_eq!(state.rewrites(), 1);
        assert!(state.additions().contains("Car"));
        assert!(state.removals().contains("Vehicle"));
        assert_eq!(state.retargeted().len(), 1);
    }

    #[test]
    fn test_rule_qualified_spelling() {
        let change = SupertypeChange::new("com.old.Vehicle", "com.new.Car").unwrap();
        let (out, state) = run(
            &change,
            "class Foo extends com.old.Vehicle {}",
            &TypeIndex::new(),
        );
        assert_eq!(out, "class Foo extends com.new.Car {}");
        assert!(state.additions().is_empty());
        assert!(state.removals().is_empty());
        assert!(state.retargeted().is_empty());
    }

    #[test]
    fn test_rule_qualified_spelling_without_fqn_is_mismatch() {
        let change = SupertypeChange::new("Vehicle", "Car").unwrap();
        let source = "class Foo extends com.old.Vehicle {}";
        let (out, state) = run(&change, source, &TypeIndex::new());
        assert_eq!(out, source);
        assert_eq!(state.rewrites(), 0);
        assert_eq!(state.mismatches().len(), 1);
    }

    #[test]
    fn test_rule_nested_class() {
        let change = SupertypeChange::new("Vehicle", "Car").unwrap();
        let (out, _) = run(
            &change,
            "class Outer extends Base { static class Inner extends Vehicle {} }",
            &TypeIndex::new(),
        );
        assert_eq!(
            out,
            "class Outer extends Base { static class Inner extends Car {} }"
        );
    }
}
