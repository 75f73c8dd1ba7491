// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! recast - structural source rewrites from the command line.
//!
//! ## Modules
//!
//! - `cli` - command implementations
//! - `error` - unified error type and exit codes
//! - `output` - JSON response types

pub mod cli;
pub mod error;
pub mod output;

pub use error::{OutputErrorCode, RecastError};
pub use output::{emit_response, ApplyResponse, ErrorResponse, ListResponse, SCHEMA_VERSION};
