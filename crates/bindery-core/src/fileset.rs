//! Virtual file set and output writer.
//!
//! Generators accumulate rendered files as relative path → content entries,
//! then one [`FileSet::write_to`] call persists the whole set. Nothing
//! touches the filesystem before that call.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to clear {path}: {source}")]
    Clear {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Relative paths written by one [`FileSet::write_to`] call, in write order.
#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: Vec<String>,
}

/// In-memory set of generated files, keyed by relative output path.
#[derive(Debug, Default)]
pub struct FileSet {
    files: BTreeMap<String, String>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one file. Inserting the same path twice keeps the later
    /// content and logs a warning.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        if self.files.insert(path.clone(), content.into()).is_some() {
            tracing::warn!(path, "duplicate output path, keeping the later content");
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Relative paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_str()))
    }

    /// Persist every entry under `dir`, in sorted path order.
    ///
    /// With `clear` set, everything already inside `dir` is deleted first;
    /// the directory itself is kept. Missing ancestor directories are
    /// created per entry. There is no rollback: a failure mid-write leaves
    /// the files already written in place and returns the failing path.
    pub fn write_to(&self, dir: &Path, clear: bool) -> Result<WriteReport, WriteError> {
        fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        if clear {
            clear_tree(dir)?;
        }

        let mut report = WriteReport::default();
        for (rel, content) in &self.files {
            let target = dir.join(rel);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&target, content).map_err(|source| WriteError::WriteFile {
                path: target.clone(),
                source,
            })?;
            report.written.push(rel.clone());
        }
        tracing::info!(
            dir = %dir.display(),
            files = report.written.len(),
            "wrote file set"
        );
        Ok(report)
    }
}

/// Delete every entry inside `dir`, keeping `dir` itself.
fn clear_tree(dir: &Path) -> Result<(), WriteError> {
    let entries = fs::read_dir(dir).map_err(|source| WriteError::Clear {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| WriteError::Clear {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|source| WriteError::Clear { path, source })?;
    }
    Ok(())
}
