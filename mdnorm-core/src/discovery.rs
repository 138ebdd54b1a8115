use crate::config::DiscoveryConfig;
use crate::NormalizeError;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Files found by a walk, plus the paths that could not be walked
#[derive(Debug, Default)]
pub struct Discovered {
    pub files: Vec<PathBuf>,
    pub errors: Vec<(PathBuf, NormalizeError)>,
}

/// Expand inputs into Markdown files. Explicit file arguments are kept
/// whatever their extension; directories are walked recursively.
pub fn discover(inputs: &[PathBuf], config: &DiscoveryConfig) -> Discovered {
    let mut found = Discovered::default();

    for input in inputs {
        if input.is_file() {
            found.files.push(input.clone());
            continue;
        }
        if !input.exists() {
            let err = io::Error::new(io::ErrorKind::NotFound, "no such file or directory");
            found.errors.push((input.clone(), NormalizeError::io(input, err)));
            continue;
        }

        let walker = WalkDir::new(input).follow_links(config.follow_links).into_iter();
        for entry in walker.filter_entry(|e| e.depth() == 0 || !is_excluded(e, config)) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && has_markdown_extension(entry.path(), config) {
                        found.files.push(entry.into_path());
                    }
                }
                Err(err) => {
                    let path = err.path().unwrap_or(input.as_path()).to_path_buf();
                    tracing::warn!("cannot walk {}: {err}", path.display());
                    let source = io::Error::from(err);
                    found.errors.push((path.clone(), NormalizeError::io(path, source)));
                }
            }
        }
    }

    found.files.sort();
    found.files.dedup();
    found
}

fn is_excluded(entry: &DirEntry, config: &DiscoveryConfig) -> bool {
    let name = entry.file_name().to_string_lossy();
    if !config.include_hidden && name.starts_with('.') {
        return true;
    }
    entry.file_type().is_dir() && config.exclude_dirs.iter().any(|dir| *dir == name)
}

fn has_markdown_extension(path: &Path, config: &DiscoveryConfig) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| config.extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}
