// File boundary: read fully, normalize fully, write fully.
//
// A file is only ever written when its normalized bytes differ from what is
// on disk, and the write goes through a sibling temporary file that is
// renamed over the original. An interrupted run therefore leaves every file
// either untouched or completely rewritten.

use crate::change::{content_hash, detect_change};
use crate::rules::RuleEngine;
use crate::types::{Document, FileFailure, FileReport, WriteMode};
use crate::NormalizeError;
use std::fs;
use std::io::Write;
use std::path::Path;

pub struct FileNormalizer<'a> {
    engine: &'a RuleEngine,
}

impl<'a> FileNormalizer<'a> {
    pub fn new(engine: &'a RuleEngine) -> Self {
        Self { engine }
    }

    /// Normalize one file. Failures are captured in the report, never raised.
    pub fn normalize_file(&self, path: &Path, mode: WriteMode) -> FileReport {
        match self.try_normalize_file(path, mode) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!("{}: {err}", path.display());
                failure_report(path, &err)
            }
        }
    }

    pub fn try_normalize_file(&self, path: &Path, mode: WriteMode) -> Result<FileReport, NormalizeError> {
        let raw = fs::read(path).map_err(|e| NormalizeError::io(path, e))?;
        let document = Document::from_bytes(&raw)?;
        let result = self.engine.normalize(&document)?;

        let output = result.output_text.as_bytes();
        let changed = detect_change(&raw, output);

        if changed && mode == WriteMode::Write {
            write_atomic(path, output)?;
            tracing::info!(iterations = result.iterations, "rewrote {}", path.display());
        } else if changed {
            tracing::debug!("{} needs normalization", path.display());
        } else {
            tracing::debug!("{} already normalized", path.display());
        }

        Ok(FileReport {
            path: path.to_path_buf(),
            changed,
            converged: result.converged,
            iterations: result.iterations,
            applied_rules: result.applied_rules,
            line_ending: Some(document.line_ending),
            content_hash: Some(content_hash(output)),
            error: None,
        })
    }
}

pub(crate) fn failure_report(path: &Path, err: &NormalizeError) -> FileReport {
    let iterations = match err {
        NormalizeError::NonConvergence { iterations, .. } => *iterations,
        _ => 0,
    };
    FileReport {
        path: path.to_path_buf(),
        changed: false,
        converged: false,
        iterations,
        applied_rules: Vec::new(),
        line_ending: None,
        content_hash: None,
        error: Some(FileFailure::from(err)),
    }
}

/// Replace `path` with `bytes` via a temporary file in the same directory.
/// The temporary file is removed on every error path when it is dropped.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), NormalizeError> {
    let io_err = |e| NormalizeError::io(path, e);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path).map_err(io_err)?.permissions();

    let mut tmp = tempfile::Builder::new()
        .prefix(".mdnorm-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    fs::set_permissions(tmp.path(), permissions).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
