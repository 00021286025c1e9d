//! Minimal `$name` template rendering.
//!
//! Templates are plain text with `$identifier` placeholders. Rendering is a
//! single literal-substitution pass with no nesting and no in-template
//! control flow; looping over symbols is the calling generator's job.
//! Placeholders without a binding stay in the output verbatim and log a
//! warning.

use std::collections::BTreeMap;
use std::path::PathBuf;

mod builtin;

/// Logical path of the main binding-module template.
pub const MODULE_TEMPLATE: &str = "module.cpp";
/// Logical path of the chunked part-file template.
pub const MODULE_PART_TEMPLATE: &str = "module_part.cpp";
/// Logical path of the stub-file header template.
pub const STUB_HEADER_TEMPLATE: &str = "stub_header.pyi";

/// Where template text comes from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// The compiled-in template set.
    Builtin,
    /// An explicit directory; logical paths resolve beneath it.
    Dir(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown built-in template `{0}`")]
    UnknownBuiltin(String),
    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Template lookup for one run.
#[derive(Debug)]
pub struct TemplateEngine {
    source: TemplateSource,
}

impl TemplateEngine {
    pub fn new(source: TemplateSource) -> Self {
        Self { source }
    }

    /// Engine over the compiled-in template set.
    pub fn builtin() -> Self {
        Self::new(TemplateSource::Builtin)
    }

    /// Fetch template text by logical path (e.g. `module.cpp`).
    pub fn load(&self, name: &str) -> Result<String, TemplateError> {
        match &self.source {
            TemplateSource::Builtin => builtin::lookup(name)
                .map(str::to_string)
                .ok_or_else(|| TemplateError::UnknownBuiltin(name.to_string())),
            TemplateSource::Dir(root) => {
                let path = root.join(name);
                std::fs::read_to_string(&path)
                    .map_err(|source| TemplateError::Io { path, source })
            }
        }
    }
}

/// Named values for one render call.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: BTreeMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding, replacing any previous value for the name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Chainable variant of [`Bindings::set`] for construction sites.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Replace every `$identifier` placeholder with its bound value.
///
/// Identifiers are `[A-Za-z_][A-Za-z0-9_]*` and are taken greedily, so a
/// binding named `module` never truncates a `$module_name` placeholder. A
/// `$` not followed by an identifier is literal text. Unbound placeholders
/// stay in the output verbatim; bindings are never mutated, and identical
/// inputs always render identical output.
pub fn render(template: &str, bindings: &Bindings) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let len = placeholder_len(tail);
        if len == 0 {
            out.push('$');
            rest = tail;
            continue;
        }
        let name = &tail[..len];
        match bindings.get(name) {
            Some(value) => out.push_str(value),
            None => {
                tracing::warn!(placeholder = name, "unresolved template placeholder");
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &tail[len..];
    }
    out.push_str(rest);
    out
}

/// Byte length of the identifier at the start of `tail`, or 0.
fn placeholder_len(tail: &str) -> usize {
    let bytes = tail.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}
