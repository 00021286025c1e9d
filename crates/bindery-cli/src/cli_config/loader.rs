//! Config file loading for `bindery.toml`.
//!
//! An explicit `--config` path must exist and parse; the implicit
//! `./bindery.toml` may be absent, but when present it must parse too.

use std::path::{Path, PathBuf};

use super::ProjectConfig;

const CONFIG_FILENAME: &str = "bindery.toml";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Load the project config from the explicit path, or from `./bindery.toml`
/// when one exists, or fall back to defaults.
pub(crate) fn load_project_config(explicit: Option<&Path>) -> Result<ProjectConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(CONFIG_FILENAME), false),
    };
    if !required && !path.is_file() {
        return Ok(ProjectConfig::default());
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded project config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_full_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
output-dir = "build/glue"
stub-dir = "{output_dir}/stubs"
include-paths = ["include", "vendor/include"]
ignore-names = [".*_internal"]
no-callback-names = ["on_.*"]
macro-vars = false
exclude-underscored = true
drop-unsupported = true
clear-output = false
max-lines-per-file = 300
template-root = "templates"
"#,
        );

        let config = load_project_config(Some(&path)).unwrap();
        assert_eq!(config.output_dir.as_deref(), Some("build/glue"));
        assert_eq!(config.stub_dir.as_deref(), Some("{output_dir}/stubs"));
        assert_eq!(config.include_paths, vec!["include", "vendor/include"]);
        assert_eq!(config.ignore_names, vec![".*_internal"]);
        assert_eq!(config.no_callback_names, vec!["on_.*"]);
        assert_eq!(config.macro_vars, Some(false));
        assert_eq!(config.exclude_underscored, Some(true));
        assert_eq!(config.drop_unsupported, Some(true));
        assert_eq!(config.clear_output, Some(false));
        assert_eq!(config.max_lines_per_file, Some(300));
        assert_eq!(config.template_root.as_deref(), Some("templates"));
    }

    #[test]
    fn test_parse_minimal_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "output-dir = \"out\"\n");

        let config = load_project_config(Some(&path)).unwrap();
        assert_eq!(config.output_dir.as_deref(), Some("out"));
        assert!(config.ignore_names.is_empty());
        assert!(config.macro_vars.is_none());
    }

    #[test]
    fn test_unknown_key_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "output-dri = \"out\"\n");

        let err = load_project_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");

        let err = load_project_config(Some(&missing)).unwrap_err();
        match err {
            ConfigError::Read { path, .. } => assert_eq!(path, missing),
            other => panic!("expected read error, got {other:?}"),
        }
    }
}
