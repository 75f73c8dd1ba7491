// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Error types and exit codes for the recast CLI.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments or configuration (bad manifest, unparsable input)
//! - `3`: Resolution errors (a required import cannot be determined)
//! - `4`: Apply errors (reading or writing files)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! `RecastError` bridges the library errors (`ConfigurationError`,
//! `ApplyError`, `ParseError`) into one type with a stable code.

use std::fmt;
use std::path::Path;

use recast_core::{ApplyError, ConfigurationError};
use recast_tree::ParseError;
use thiserror::Error;

/// Stable codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OutputErrorCode {
    InvalidArguments = 2,
    ResolutionError = 3,
    ApplyError = 4,
    InternalError = 10,
}

impl OutputErrorCode {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum RecastError {
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("cannot parse {path}: {message}")]
    Parse { path: String, message: String },

    /// A unit could not compute the imports it needs for one file.
    #[error("{path}: {unit}: {message}")]
    Resolution {
        path: String,
        unit: String,
        message: String,
    },

    #[error("{path}: {message}")]
    Io { path: String, message: String },

    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl From<&RecastError> for OutputErrorCode {
    fn from(err: &RecastError) -> Self {
        match err {
            RecastError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            RecastError::Configuration(_) => OutputErrorCode::InvalidArguments,
            RecastError::Parse { .. } => OutputErrorCode::InvalidArguments,
            RecastError::Resolution { .. } => OutputErrorCode::ResolutionError,
            RecastError::Io { .. } => OutputErrorCode::ApplyError,
            RecastError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl RecastError {
    pub fn invalid_args(message: impl Into<String>) -> Self {
        RecastError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        RecastError::InternalError {
            message: message.into(),
        }
    }

    pub fn io(path: &Path, err: impl fmt::Display) -> Self {
        RecastError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub fn parse(path: &Path, err: &ParseError) -> Self {
        RecastError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub fn apply(path: &Path, err: &ApplyError) -> Self {
        RecastError::Resolution {
            path: path.display().to_string(),
            unit: err.unit.clone(),
            message: err.source.to_string(),
        }
    }

    pub fn code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(RecastError::invalid_args("x").code().code(), 2);
        assert_eq!(
            RecastError::from(ConfigurationError::EmptyTable).code(),
            OutputErrorCode::InvalidArguments
        );
        assert_eq!(
            RecastError::io(Path::new("a.java"), "denied").code().code(),
            4
        );
        assert_eq!(RecastError::internal("bug").code().to_string(), "10");
    }

    #[test]
    fn test_configuration_display() {
        let err = RecastError::from(ConfigurationError::EmptyTable);
        assert_eq!(err.to_string(), "invalid configuration: mapping table is empty");
    }

    #[test]
    fn test_resolution_is_more_severe_than_arguments() {
        assert!(OutputErrorCode::ResolutionError > OutputErrorCode::InvalidArguments);
        assert!(OutputErrorCode::InternalError > OutputErrorCode::ApplyError);
    }
}
