//! Upstream symbol sources.
//!
//! [`SymbolSource`] is the seam between the pipeline and whatever produces
//! symbol tables. Two sources ship here: a preparsed-table loader for
//! `.json` files written by an external parser, and a minimal header
//! scanner for a common declaration subset.

use std::path::PathBuf;

use crate::symbols::Namespace;

mod header_scanner;

pub use header_scanner::HeaderScanner;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}:{line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("failed to parse symbol table {path}: {source}")]
    Table {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Anything that can produce a symbol table.
pub trait SymbolSource {
    fn parse(&self) -> Result<Namespace, ParseError>;
}

/// Loader for preparsed `.json` symbol tables.
///
/// The table is the serde shape of [`Namespace`]; qualified names may be
/// omitted and are assigned after loading.
#[derive(Debug)]
pub struct SymbolTableFile {
    path: PathBuf,
}

impl SymbolTableFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SymbolSource for SymbolTableFile {
    fn parse(&self) -> Result<Namespace, ParseError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| ParseError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut root: Namespace =
            serde_json::from_str(&text).map_err(|source| ParseError::Table {
                path: self.path.clone(),
                source,
            })?;
        root.qualify();
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_table_loads_and_qualifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        std::fs::write(
            &path,
            r#"{
                "symbols": [{ "name": "ping", "kind": "function" }],
                "children": [{
                    "name": "api",
                    "symbols": [{ "name": "Session", "kind": "class" }]
                }]
            }"#,
        )
        .unwrap();

        let root = SymbolTableFile::new(&path).parse().unwrap();
        assert_eq!(root.symbols[0].full_name, "ping");
        assert_eq!(root.children[0].symbols[0].full_name, "api::Session");
    }

    #[test]
    fn test_malformed_table_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SymbolTableFile::new(&path).parse().unwrap_err();
        assert!(matches!(err, ParseError::Table { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_missing_table_is_an_io_error() {
        let err = SymbolTableFile::new("/nonexistent/table.json")
            .parse()
            .unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
