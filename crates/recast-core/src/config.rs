// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declarative unit configuration.
//!
//! A manifest is JSON:
//!
//! ```json
//! {
//!   "name": "migrate-vehicles",
//!   "units": [
//!     { "type": "ChangeSupertype", "old": "com.old.Vehicle", "new": "com.new.Car" },
//!     { "type": "ChangeConstant", "oldOwner": "Constants", "oldMember": "MAX",
//!       "newOwner": "Limits", "newMember": "MAX_VALUE" },
//!     { "type": "ChangeConstants", "mappings": [
//!       { "oldOwner": "Constants", "oldMember": "MIN",
//!         "newOwner": "Limits", "newMember": "MIN_VALUE" }
//!     ] },
//!     { "type": "Pipeline", "units": [] }
//!   ]
//! }
//! ```
//!
//! Building validates everything up front; no tree is touched by a
//! configuration that fails to build.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::pipeline::Pipeline;
use crate::rules::ConstantMapping;
use crate::unit::{ChangeConstant, ChangeConstants, ChangeSupertype, TransformationUnit};

const DEFAULT_PIPELINE_NAME: &str = "Pipeline";

/// Configuration for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum UnitConfig {
    ChangeSupertype {
        old: String,
        new: String,
    },
    ChangeConstant {
        old_owner: String,
        old_member: String,
        new_owner: String,
        new_member: String,
    },
    ChangeConstants {
        mappings: Vec<ConstantMapping>,
    },
    Pipeline {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        units: Vec<UnitConfig>,
    },
}

impl UnitConfig {
    pub fn build(&self) -> Result<Box<dyn TransformationUnit>, ConfigurationError> {
        Ok(match self {
            UnitConfig::ChangeSupertype { old, new } => Box::new(ChangeSupertype::new(old, new)?),
            UnitConfig::ChangeConstant {
                old_owner,
                old_member,
                new_owner,
                new_member,
            } => Box::new(ChangeConstant::new(
                old_owner, old_member, new_owner, new_member,
            )?),
            UnitConfig::ChangeConstants { mappings } => {
                Box::new(ChangeConstants::new(mappings.clone())?)
            }
            UnitConfig::Pipeline { name, units } => Box::new(build_pipeline(name.as_deref(), units)?),
        })
    }
}

fn build_pipeline(name: Option<&str>, units: &[UnitConfig]) -> Result<Pipeline, ConfigurationError> {
    let units = units
        .iter()
        .map(UnitConfig::build)
        .collect::<Result<Vec<_>, _>>()?;
    Pipeline::new(name.unwrap_or(DEFAULT_PIPELINE_NAME), units)
}

/// The ordered list of units to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub units: Vec<UnitConfig>,
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(text).map_err(|e| ConfigurationError::Manifest {
            message: e.to_string(),
        })
    }

    /// Build every unit, in order, as one pipeline.
    pub fn build(&self) -> Result<Pipeline, ConfigurationError> {
        build_pipeline(self.name.as_deref(), &self.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "name": "migrate",
        "units": [
            { "type": "ChangeSupertype", "old": "com.old.Vehicle", "new": "com.new.Car" },
            { "type": "ChangeConstant", "oldOwner": "Constants", "oldMember": "MAX",
              "newOwner": "Limits", "newMember": "MAX_VALUE" },
            { "type": "Pipeline", "name": "inner", "units": [
                { "type": "ChangeConstants", "mappings": [
                    { "oldOwner": "Constants", "oldMember": "MIN",
                      "newOwner": "Limits", "newMember": "MIN_VALUE" }
                ] }
            ] }
        ]
    }"#;

    #[test]
    fn test_manifest_parses_and_builds() {
        let manifest = Manifest::from_json(MANIFEST).unwrap();
        assert_eq!(manifest.units.len(), 3);
        assert_eq!(
            manifest.units[0],
            UnitConfig::ChangeSupertype {
                old: "com.old.Vehicle".to_string(),
                new: "com.new.Car".to_string()
            }
        );

        let pipeline = manifest.build().unwrap();
        assert_eq!(pipeline.name(), "migrate");
        let names: Vec<&str> = pipeline.children().iter().map(|u| u.name()).collect();
        assert_eq!(names, vec!["ChangeSupertype", "ChangeConstant", "inner"]);
        assert_eq!(pipeline.children()[2].children()[0].name(), "ChangeConstants");
    }

    #[test]
    fn test_manifest_roundtrips_through_json() {
        let manifest = Manifest::from_json(MANIFEST).unwrap();
        let text = serde_json::to_string(&manifest).unwrap();
        assert_eq!(Manifest::from_json(&text).unwrap(), manifest);
    }

    #[test]
    fn test_malformed_manifest() {
        let err = Manifest::from_json(r#"{ "units": [ { "type": "Rename" } ] }"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::Manifest { .. }));
    }

    #[test]
    fn test_invalid_unit_fails_build() {
        let manifest = Manifest::from_json(
            r#"{ "units": [ { "type": "ChangeConstants", "mappings": [
                { "oldOwner": "A", "oldMember": "X", "newOwner": "B", "newMember": "X" },
                { "oldOwner": "A", "oldMember": "X", "newOwner": "C", "newMember": "X" }
            ] } ] }"#,
        )
        .unwrap();
        assert_eq!(
            manifest.build().unwrap_err(),
            ConfigurationError::DuplicateKey {
                owner: "A".to_string(),
                member: "X".to_string()
            }
        );
    }

    #[test]
    fn test_default_pipeline_name() {
        let manifest = Manifest::from_json(r#"{ "units": [] }"#).unwrap();
        assert_eq!(manifest.build().unwrap().name(), "Pipeline");
    }
}
