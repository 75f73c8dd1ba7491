// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Composite pipelines.
//!
//! A [`Pipeline`] is itself a [`TransformationUnit`]. Each child completes
//! its full pass before the next starts, and each child sees the output of
//! the one before it. When a child fails, the pipeline stops there; the
//! trees produced by the children before it are not rolled back and travel
//! in [`ApplyError::committed`].

use recast_tree::CompilationUnit;
use tracing::debug;

use crate::error::{ApplyError, ConfigurationError};
use crate::symbols::TypeIndex;
use crate::unit::{Applied, TransformationUnit, UnitReport};

#[derive(Debug)]
pub struct Pipeline {
    name: String,
    units: Vec<Box<dyn TransformationUnit>>,
}

impl Pipeline {
    pub fn new(
        name: impl Into<String>,
        units: Vec<Box<dyn TransformationUnit>>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyName { field: "name" });
        }
        Ok(Self { name, units })
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl TransformationUnit for Pipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        format!("{} unit(s) in order", self.units.len())
    }

    fn apply(&self, tree: &CompilationUnit, types: &TypeIndex) -> Result<Applied, ApplyError> {
        let mut current = tree.clone();
        let mut reports: Vec<UnitReport> = Vec::with_capacity(self.units.len());

        for unit in &self.units {
            match unit.apply(&current, types) {
                Ok(applied) => {
                    current = applied.tree;
                    reports.push(applied.report);
                }
                Err(mut err) => {
                    debug!(
                        pipeline = %self.name,
                        unit = %err.unit,
                        completed = reports.len(),
                        "pipeline aborted"
                    );
                    reports.append(&mut err.completed);
                    err.completed = reports;
                    return Err(err);
                }
            }
        }

        let report = UnitReport {
            unit: self.name.clone(),
            changed: reports.iter().any(|r| r.changed),
            rewrites: reports.iter().map(|r| r.rewrites).sum(),
            children: reports,
            ..UnitReport::default()
        };
        Ok(Applied {
            tree: current,
            report,
        })
    }

    fn children(&self) -> &[Box<dyn TransformationUnit>] {
        &self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{ChangeConstant, ChangeSupertype};
    use recast_tree::{parse_compilation_unit, to_source};

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(
            Pipeline::new("", Vec::new()).unwrap_err(),
            ConfigurationError::EmptyName { field: "name" }
        );
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let pipeline = Pipeline::new("empty", Vec::new()).unwrap();
        let tree = parse_compilation_unit("class A extends B {}").unwrap();
        let applied = pipeline.apply(&tree, &TypeIndex::new()).unwrap();
        assert_eq!(applied.tree, tree);
        assert!(!applied.report.changed);
    }

    #[test]
    fn test_later_unit_sees_earlier_output() {
        let pipeline = Pipeline::new(
            "retarget",
            vec![
                Box::new(ChangeSupertype::new("Vehicle", "com.new.Car").unwrap()),
                Box::new(ChangeSupertype::new("Car", "com.new.Truck").unwrap()),
            ],
        )
        .unwrap();
        let tree = parse_compilation_unit("class Foo extends Vehicle {}").unwrap();
        let applied = pipeline.apply(&tree, &TypeIndex::new()).unwrap();
        assert_eq!(
            to_source(&applied.tree),
            "import com.new.Truck;\n\nclass Foo extends Truck {}"
        );
        assert_eq!(applied.report.rewrites, 2);
        assert_eq!(applied.report.children.len(), 2);
        assert_eq!(applied.report.children[1].imports_removed, vec!["com.new.Car"]);
    }

    #[test]
    fn test_failure_keeps_committed_prefix() {
        let pipeline = Pipeline::new(
            "mixed",
            vec![
                Box::new(ChangeSupertype::new("Vehicle", "com.new.Car").unwrap()),
                Box::new(ChangeConstant::new("Constants", "MAX", "Limits", "MAX").unwrap()),
            ],
        )
        .unwrap();
        let tree =
            parse_compilation_unit("class Foo extends Vehicle { int a = Constants.MAX; }").unwrap();
        let err = pipeline.apply(&tree, &TypeIndex::new()).unwrap_err();
        assert_eq!(err.unit, "ChangeConstant");
        assert_eq!(err.completed.len(), 1);
        assert_eq!(
            to_source(err.committed.as_ref()),
            "import com.new.Car;\n\nclass Foo extends Car { int a = Constants.MAX; }"
        );
    }
}
