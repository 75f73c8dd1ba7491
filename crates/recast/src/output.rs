// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! JSON output types for CLI responses.
//!
//! Every response starts with `status` and `schema_version`. Output is
//! deterministic: files are reported in the order they were given.

use std::io::{self, Write};

use recast_core::{TransformationUnit, UnitReport};
use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, RecastError};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Error information for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: u8,
    pub message: String,
}

impl ErrorInfo {
    pub fn from_error(err: &RecastError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// Response for a failed command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &RecastError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Outcome for one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub path: String,
    /// "changed", "unchanged", or "error".
    pub status: String,
    /// True if the new source was written back.
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<UnitReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl FileResult {
    pub fn applied(path: impl Into<String>, report: UnitReport, written: bool) -> Self {
        let status = if report.changed { "changed" } else { "unchanged" };
        FileResult {
            path: path.into(),
            status: status.to_string(),
            written,
            report: Some(report),
            error: None,
        }
    }

    pub fn failed(path: impl Into<String>, err: &RecastError) -> Self {
        FileResult {
            path: path.into(),
            status: "error".to_string(),
            written: false,
            report: None,
            error: Some(ErrorInfo::from_error(err)),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Totals across all files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub files: usize,
    pub changed: usize,
    pub failed: usize,
    pub rewrites: usize,
}

/// Response for `recast apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    /// "ok" if every file succeeded, "error" otherwise.
    pub status: String,
    pub schema_version: String,
    pub pipeline: String,
    pub files: Vec<FileResult>,
    pub summary: ApplySummary,
}

impl ApplyResponse {
    pub fn new(pipeline: impl Into<String>, files: Vec<FileResult>) -> Self {
        let mut summary = ApplySummary {
            files: files.len(),
            ..ApplySummary::default()
        };
        for file in &files {
            if file.is_error() {
                summary.failed += 1;
            }
            if let Some(report) = &file.report {
                summary.changed += usize::from(report.changed);
                summary.rewrites += report.rewrites;
            }
        }
        let status = if summary.failed == 0 { "ok" } else { "error" };
        ApplyResponse {
            status: status.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            pipeline: pipeline.into(),
            files,
            summary,
        }
    }

    /// The most severe error code among failed files.
    pub fn error_code(&self) -> Option<u8> {
        self.files
            .iter()
            .filter_map(|file| file.error.as_ref().map(|e| e.code))
            .max()
    }
}

/// One configured unit, for `recast list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitInfo {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<UnitInfo>,
}

impl UnitInfo {
    pub fn from_unit(unit: &dyn TransformationUnit) -> Self {
        UnitInfo {
            name: unit.name().to_string(),
            description: unit.description(),
            units: unit
                .children()
                .iter()
                .map(|child| UnitInfo::from_unit(child.as_ref()))
                .collect(),
        }
    }
}

/// Response for `recast list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub status: String,
    pub schema_version: String,
    pub pipeline: UnitInfo,
}

impl ListResponse {
    pub fn new(pipeline: UnitInfo) -> Self {
        ListResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            pipeline,
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_response_summary() {
        let changed = UnitReport {
            unit: "p".to_string(),
            changed: true,
            rewrites: 3,
            ..UnitReport::default()
        };
        let files = vec![
            FileResult::applied("a.java", changed, true),
            FileResult::applied("b.java", UnitReport::unchanged("p"), false),
            FileResult::failed("c.java", &RecastError::invalid_args("bad")),
        ];
        let response = ApplyResponse::new("p", files);
        assert_eq!(response.status, "error");
        assert_eq!(
            response.summary,
            ApplySummary {
                files: 3,
                changed: 1,
                failed: 1,
                rewrites: 3
            }
        );
        assert_eq!(response.error_code(), Some(2));
        assert_eq!(response.files[0].status, "changed");
        assert_eq!(response.files[1].status, "unchanged");
    }

    #[test]
    fn test_emit_response_is_json_with_status_first() {
        let response = ListResponse::new(UnitInfo {
            name: "p".to_string(),
            description: "0 unit(s) in order".to_string(),
            units: Vec::new(),
        });
        let mut out = Vec::new();
        emit_response(&response, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.trim_start().starts_with("{\n  \"status\": \"ok\""));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert!(value["pipeline"].get("units").is_none());
    }
}
