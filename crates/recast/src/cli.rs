// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Command implementations for the recast CLI.
//!
//! - `apply` - run a manifest's pipeline over source files
//! - `list` - show the units a manifest builds
//!
//! Files are parsed and rewritten in parallel. Every file is processed
//! against the same pipeline and the same type index; a failure in one file
//! does not stop the others. Types declared in any input file are added to
//! the index before rewriting starts.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use recast_core::{Manifest, Pipeline, TransformationUnit, TypeIndex};
use recast_tree::visitor::DeclarationCollector;
use recast_tree::{parse_compilation_unit, to_source, CompilationUnit};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::RecastError;
use crate::output::{ApplyResponse, FileResult, ListResponse, UnitInfo};

/// Inputs for `recast apply`.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Path to the JSON manifest.
    pub config: PathBuf,
    /// Optional JSON list of known fully-qualified type names.
    pub types: Option<PathBuf>,
    /// Write changed files back in place.
    pub write: bool,
    pub files: Vec<PathBuf>,
}

/// Read a manifest and build its pipeline.
pub fn load_pipeline(path: &Path) -> Result<Pipeline, RecastError> {
    let text = fs::read_to_string(path).map_err(|e| RecastError::io(path, e))?;
    let manifest = Manifest::from_json(&text)?;
    Ok(manifest.build()?)
}

/// Read a type index, or start from an empty one.
pub fn load_types(path: Option<&Path>) -> Result<TypeIndex, RecastError> {
    let Some(path) = path else {
        return Ok(TypeIndex::new());
    };
    let text = fs::read_to_string(path).map_err(|e| RecastError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| {
        RecastError::invalid_args(format!(
            "{} is not a JSON list of type names: {}",
            path.display(),
            e
        ))
    })
}

fn parse_file(path: &Path) -> Result<CompilationUnit, RecastError> {
    let source = fs::read_to_string(path).map_err(|e| RecastError::io(path, e))?;
    parse_compilation_unit(&source).map_err(|e| RecastError::parse(path, &e))
}

/// Replace `path` with `contents` through a temp file in the same directory.
fn write_atomic(path: &Path, contents: &str) -> Result<(), RecastError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| RecastError::io(path, e))?;
    temp.write_all(contents.as_bytes()).map_err(|e| RecastError::io(path, e))?;
    temp.persist(path).map_err(|e| RecastError::io(path, e.error))?;
    Ok(())
}

fn apply_file(
    pipeline: &Pipeline,
    path: &Path,
    tree: &CompilationUnit,
    types: &TypeIndex,
    write: bool,
) -> Result<FileResult, RecastError> {
    let applied = pipeline
        .apply(tree, types)
        .map_err(|err| RecastError::apply(path, &err))?;

    let written = write && applied.report.changed;
    if written {
        write_atomic(path, &to_source(&applied.tree))?;
    }
    info!(
        path = %path.display(),
        changed = applied.report.changed,
        rewrites = applied.report.rewrites,
        written,
        "processed"
    );
    Ok(FileResult::applied(
        path.display().to_string(),
        applied.report,
        written,
    ))
}

/// Run `recast apply`.
///
/// Returns an error only for problems with the command itself (manifest,
/// type index, no inputs). Per-file failures are reported in the response.
/// A file whose pipeline fails is never written.
pub fn run_apply(options: &ApplyOptions) -> Result<ApplyResponse, RecastError> {
    if options.files.is_empty() {
        return Err(RecastError::invalid_args("no input files"));
    }
    let pipeline = load_pipeline(&options.config)?;
    let mut types = load_types(options.types.as_deref())?;

    let parsed: Vec<Result<CompilationUnit, RecastError>> =
        options.files.par_iter().map(|path| parse_file(path.as_path())).collect();
    for tree in parsed.iter().flatten() {
        types.extend_from_declarations(&DeclarationCollector::collect(tree));
    }

    let results: Vec<FileResult> = options
        .files
        .par_iter()
        .zip(parsed)
        .map(|(path, parsed)| {
            let outcome =
                parsed.and_then(|tree| apply_file(&pipeline, path, &tree, &types, options.write));
            match outcome {
                Ok(result) => result,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "file failed");
                    FileResult::failed(path.display().to_string(), &err)
                }
            }
        })
        .collect();

    Ok(ApplyResponse::new(pipeline.name(), results))
}

/// Run `recast list`.
pub fn run_list(config: &Path) -> Result<ListResponse, RecastError> {
    let pipeline = load_pipeline(config)?;
    Ok(ListResponse::new(UnitInfo::from_unit(&pipeline)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_types_defaults_to_empty() {
        assert!(load_types(None).unwrap().is_empty());
    }

    #[test]
    fn test_load_types_rejects_non_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("types.json");
        fs::write(&path, r#"{"a": 1}"#).unwrap();
        let err = load_types(Some(&path)).unwrap_err();
        assert_eq!(err.code().code(), 2);
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("A.java");
        fs::write(&path, "class A {}").unwrap();
        write_atomic(&path, "class B {}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "class B {}");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_run_apply_requires_files() {
        let err = run_apply(&ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, RecastError::InvalidArguments { .. }));
    }
}
