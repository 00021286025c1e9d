//! Project configuration for `bindery.toml`.
//!
//! Config values supply defaults only: scalar CLI flags override them, and
//! the repeatable lists concatenate with the config entries first.

pub(crate) mod loader;

pub(crate) use loader::{load_project_config, ConfigError};

use serde::Deserialize;

/// Keys mirror the CLI flags in kebab-case. Unknown keys are rejected so a
/// typoed option fails loudly instead of being silently ignored.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct ProjectConfig {
    /// Glue output tree.
    pub output_dir: Option<String>,

    /// Stub output tree; `{output_dir}` and `{module_name}` are substituted.
    pub stub_dir: Option<String>,

    /// Search paths for quoted includes.
    #[serde(default)]
    pub include_paths: Vec<String>,

    /// Patterns marking matching symbols do-not-generate.
    #[serde(default)]
    pub ignore_names: Vec<String>,

    /// Patterns marking matching methods final.
    #[serde(default)]
    pub no_callback_names: Vec<String>,

    /// Convert constant object-like macros into variables. Default: on.
    pub macro_vars: Option<bool>,

    /// Drop underscore-prefixed globals. Default: off.
    pub exclude_underscored: Option<bool>,

    /// Exclude symbols with unsupported types instead of binding them
    /// best-effort. Default: off.
    pub drop_unsupported: Option<bool>,

    /// Clear the output trees before writing. Default: on.
    pub clear_output: Option<bool>,

    /// Per-file line budget for split glue files.
    pub max_lines_per_file: Option<usize>,

    /// On-disk template root overriding the built-in set.
    pub template_root: Option<String>,
}
