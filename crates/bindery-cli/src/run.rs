//! One-shot orchestration of the generation pipeline.
//!
//! Stages run strictly in sequence: config merge, rule compilation, parsing,
//! preprocessing, filter rules, option freezing, generation, output writing.
//! The first failing stage aborts the run with an error naming it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bindery_core::fileset::{WriteError, WriteReport};
use bindery_core::filter::{apply_rules, compile_rules, FilterError};
use bindery_core::generators::{
    run_generator, CxxGenerator, GenerateError, Generator, StubGenerator,
};
use bindery_core::options::{GeneratorOptions, MIN_LINES_PER_FILE};
use bindery_core::parser::{HeaderScanner, ParseError, SymbolSource, SymbolTableFile};
use bindery_core::preprocess::{preprocess, PreprocessOptions};
use bindery_core::symbols::{Namespace, ObjectRegistry};
use bindery_core::templates::{TemplateEngine, TemplateSource};

use crate::cli_config::{load_project_config, ConfigError, ProjectConfig};
use crate::output;
use crate::Cli;

const DEFAULT_OUTPUT_DIR: &str = "generated_files";
const DEFAULT_STUB_DIR: &str = "{output_dir}/{module_name}";

/// Pipeline failure, named after the stage that produced it.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RunError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("filter rules: {0}")]
    Rules(#[from] FilterError),
    #[error("parse: {0}")]
    Parse(#[from] ParseError),
    #[error("generate: {0}")]
    Generate(#[from] GenerateError),
    #[error("write: {0}")]
    Write(#[from] WriteError),
}

pub(crate) fn run(cli: Cli) -> Result<(), RunError> {
    let config = load_project_config(cli.config.as_deref())?;
    let settings = Settings::merge(cli, config);

    // Rules compile before any parsing so a malformed pattern fails fast.
    let rules = compile_rules(&settings.ignore_names, &settings.no_callback_names)?;

    let mut table = Namespace::root();
    for file in &settings.files {
        table.merge(parse_input(file, &settings.include_paths)?);
    }
    table.qualify();
    tracing::info!(symbols = table.symbol_count(), "symbol table assembled");

    let result = preprocess(
        table,
        &PreprocessOptions {
            macros_as_variables: settings.macro_vars,
            exclude_underscored_globals: settings.exclude_underscored,
            drop_unsupported: settings.drop_unsupported,
        },
    );
    for symbol in &result.unsupported {
        output::warning(format!(
            "unsupported symbol `{}`: {}",
            symbol.full_name, symbol.detail
        ));
    }

    let mut table = result.namespace;
    for rule in apply_rules(&mut table, &rules) {
        if rule.matched == 0 {
            output::warning(format!(
                "rule `{}` ({}) matched no symbols",
                rule.pattern, rule.action
            ));
        }
    }

    let registry = Arc::new(ObjectRegistry::from_namespace(&table));
    let include_files = settings
        .files
        .iter()
        .filter(|file| !is_symbol_table(file))
        .map(|file| file.display().to_string())
        .collect();
    let mut options =
        GeneratorOptions::new(&settings.module_name, table, registry, include_files);
    if let Some(max_lines) = settings.max_lines_per_file {
        if max_lines < MIN_LINES_PER_FILE {
            output::warning(format!(
                "max-lines-per-file {max_lines} raised to the floor of {MIN_LINES_PER_FILE}"
            ));
        }
        options = options.with_max_lines(max_lines);
    }

    let engine = match &settings.template_root {
        Some(dir) => TemplateEngine::new(TemplateSource::Dir(dir.clone())),
        None => TemplateEngine::builtin(),
    };

    let cxx = CxxGenerator;
    let stub = StubGenerator;
    let glue_files = run_generator(&cxx, &options, &engine)?;
    let stub_files = run_generator(&stub, &options, &engine)?;

    // Glue first: with the default stub layout the stub tree nests inside
    // the output tree, so clearing must happen before the stubs land.
    let output_dir = Path::new(&settings.output_dir);
    let glue_report = glue_files.write_to(output_dir, settings.clear_output)?;
    report_files(cxx.name(), output_dir, &glue_report);

    let stub_dir = settings.stub_path();
    let stub_report = stub_files.write_to(&stub_dir, settings.clear_output)?;
    report_files(stub.name(), &stub_dir, &stub_report);

    output::success(format!(
        "{} bindings generated ({} files)",
        settings.module_name,
        glue_report.written.len() + stub_report.written.len()
    ));
    Ok(())
}

/// Effective settings: CLI flags merged over project config. Scalars take
/// the CLI value when given; the repeatable lists concatenate config-first.
struct Settings {
    module_name: String,
    files: Vec<PathBuf>,
    output_dir: String,
    stub_dir: String,
    include_paths: Vec<PathBuf>,
    ignore_names: Vec<String>,
    no_callback_names: Vec<String>,
    macro_vars: bool,
    exclude_underscored: bool,
    drop_unsupported: bool,
    clear_output: bool,
    max_lines_per_file: Option<usize>,
    template_root: Option<PathBuf>,
}

impl Settings {
    fn merge(cli: Cli, config: ProjectConfig) -> Self {
        let mut include_paths: Vec<PathBuf> =
            config.include_paths.iter().map(PathBuf::from).collect();
        include_paths.extend(cli.include_paths);

        let mut ignore_names = config.ignore_names;
        ignore_names.extend(cli.ignore_names);

        let mut no_callback_names = config.no_callback_names;
        no_callback_names.extend(cli.no_callback_names);

        Settings {
            module_name: cli.module_name,
            files: cli.files,
            output_dir: cli
                .output_dir
                .or(config.output_dir)
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            stub_dir: cli
                .stub_dir
                .or(config.stub_dir)
                .unwrap_or_else(|| DEFAULT_STUB_DIR.to_string()),
            include_paths,
            ignore_names,
            no_callback_names,
            macro_vars: !cli.no_macro_vars && config.macro_vars.unwrap_or(true),
            exclude_underscored: cli.exclude_underscored
                || config.exclude_underscored.unwrap_or(false),
            drop_unsupported: cli.drop_unsupported || config.drop_unsupported.unwrap_or(false),
            clear_output: !cli.no_clear && config.clear_output.unwrap_or(true),
            max_lines_per_file: cli.max_lines_per_file.or(config.max_lines_per_file),
            template_root: cli
                .template_root
                .or(config.template_root.map(PathBuf::from)),
        }
    }

    /// Stub tree destination with `{output_dir}` / `{module_name}` resolved.
    fn stub_path(&self) -> PathBuf {
        PathBuf::from(
            self.stub_dir
                .replace("{output_dir}", &self.output_dir)
                .replace("{module_name}", &self.module_name),
        )
    }
}

/// `.json` inputs are preparsed symbol tables; everything else is scanned
/// as a C/C++ header.
fn is_symbol_table(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse_input(path: &Path, include_paths: &[PathBuf]) -> Result<Namespace, ParseError> {
    if is_symbol_table(path) {
        SymbolTableFile::new(path).parse()
    } else {
        HeaderScanner::new(path)
            .with_include_paths(include_paths.to_vec())
            .parse()
    }
}

fn report_files(name: &str, dir: &Path, report: &WriteReport) {
    output::header(format!(
        "# of {name} files generated : {}",
        report.written.len()
    ));
    for path in &report.written {
        output::item(dir.join(path).display());
    }
}
