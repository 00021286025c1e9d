//! The downstream generator contract.
//!
//! A [`Generator`] sees one [`Emitter`]: shared read-only options, the
//! template engine, and a private [`FileSet`] it fills. Nothing else is
//! shared between generators, so any number of them can run over the same
//! options within one invocation.

use crate::fileset::FileSet;
use crate::options::GeneratorOptions;
use crate::templates::{self, Bindings, TemplateEngine, TemplateError};

mod cxx;
mod stub;

pub use cxx::CxxGenerator;
pub use stub::StubGenerator;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// One output format.
pub trait Generator {
    /// Short name used in logs and CLI reporting.
    fn name(&self) -> &'static str;

    /// Fill the emitter's file set from the options' symbol table.
    fn populate(&self, emitter: &mut Emitter<'_>) -> Result<(), GenerateError>;
}

/// Per-run bundle handed to [`Generator::populate`].
#[derive(Debug)]
pub struct Emitter<'a> {
    options: &'a GeneratorOptions,
    engine: &'a TemplateEngine,
    files: FileSet,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(options: &'a GeneratorOptions, engine: &'a TemplateEngine) -> Self {
        Self {
            options,
            engine,
            files: FileSet::new(),
        }
    }

    pub fn options(&self) -> &'a GeneratorOptions {
        self.options
    }

    /// Store raw content under a relative output path.
    pub fn save_file(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path, content);
    }

    /// Load a template by logical path and render it with the module
    /// identity bindings injected.
    pub fn render_template(
        &self,
        template: &str,
        bindings: Bindings,
    ) -> Result<String, GenerateError> {
        let text = self.engine.load(template)?;
        Ok(templates::render(&text, &self.inject(bindings)))
    }

    /// Render a template and store it; the output path defaults to the
    /// template's logical path.
    pub fn save_template(
        &mut self,
        template: &str,
        output_path: Option<&str>,
        bindings: Bindings,
    ) -> Result<(), GenerateError> {
        let rendered = self.render_template(template, bindings)?;
        self.save_file(output_path.unwrap_or(template), rendered);
        Ok(())
    }

    /// Module identity and include bindings, overriding any caller binding
    /// of the same name.
    fn inject(&self, mut bindings: Bindings) -> Bindings {
        bindings
            .set("includes", self.generate_includes())
            .set("module_name", self.options.module_name())
            .set("module_tag", self.options.module_tag())
            .set("module_class", self.options.module_class());
        bindings
    }

    /// One quoted `#include` line per configured include file, in order.
    fn generate_includes(&self) -> String {
        let mut code = String::new();
        for file in self.options.include_files() {
            code.push_str(&format!("#include \"{file}\"\n"));
        }
        code
    }
}

/// Drive one generator run and hand back its populated file set.
pub fn run_generator(
    generator: &dyn Generator,
    options: &GeneratorOptions,
    engine: &TemplateEngine,
) -> Result<FileSet, GenerateError> {
    let mut emitter = Emitter::new(options, engine);
    generator.populate(&mut emitter)?;
    tracing::info!(
        generator = generator.name(),
        files = emitter.files.len(),
        "generator finished"
    );
    Ok(emitter.files)
}
