//! Immutable per-run generation options.

use std::sync::Arc;

use crate::symbols::{Namespace, ObjectRegistry};

/// Default per-file line budget for chunked generator output.
pub const DEFAULT_MAX_LINES_PER_FILE: usize = 500;

/// Enforced floor for the per-file line budget.
pub const MIN_LINES_PER_FILE: usize = 200;

const TAG_PREFIX: &str = "tag_";
const CLASS_PREFIX: &str = "module_";

/// The generation context shared read-only by every generator in one run.
///
/// Construction projects the namespace onto symbols passing the should-emit
/// predicate, exactly once. Filter rules must run before this point; nothing
/// re-reads the unfiltered table afterward.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    module_name: String,
    namespace: Namespace,
    registry: Arc<ObjectRegistry>,
    include_files: Vec<String>,
    max_lines_per_file: usize,
}

impl GeneratorOptions {
    pub fn new(
        module_name: impl Into<String>,
        namespace: Namespace,
        registry: Arc<ObjectRegistry>,
        include_files: Vec<String>,
    ) -> Self {
        Self {
            module_name: module_name.into(),
            namespace: namespace.filtered(),
            registry,
            include_files,
            max_lines_per_file: DEFAULT_MAX_LINES_PER_FILE,
        }
    }

    /// Override the per-file line budget, clamped to the enforced floor.
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines_per_file = max_lines.max(MIN_LINES_PER_FILE);
        self
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// The filtered projection of the symbol table.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn include_files(&self) -> &[String] {
        &self.include_files
    }

    pub fn max_lines_per_file(&self) -> usize {
        self.max_lines_per_file
    }

    /// `tag_<module>` identity string, stable for the whole run.
    pub fn module_tag(&self) -> String {
        format!("{TAG_PREFIX}{}", self.module_name)
    }

    /// `module_<module>` identity string, stable for the whole run.
    pub fn module_class(&self) -> String {
        format!("{CLASS_PREFIX}{}", self.module_name)
    }
}
