//! `bindery` — generate pybind11 glue code and Python interface stubs from
//! C/C++ headers or preparsed symbol tables.

mod cli_config;
mod output;
mod run;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Generate pybind11 glue code and Python interface stubs.
#[derive(Debug, Parser)]
#[command(name = "bindery", version, about, styles = output::clap_styles())]
pub(crate) struct Cli {
    /// Name of the native module to generate.
    pub(crate) module_name: String,

    /// Input files: `.json` preparsed symbol tables, anything else is
    /// scanned as a C/C++ header.
    #[arg(required = true)]
    pub(crate) files: Vec<PathBuf>,

    /// Directory receiving the generated glue sources [default: generated_files]
    #[arg(short, long, value_name = "DIR")]
    pub(crate) output_dir: Option<String>,

    /// Directory receiving the stub package; `{output_dir}` and
    /// `{module_name}` are substituted [default: {output_dir}/{module_name}]
    #[arg(short, long, value_name = "DIR")]
    pub(crate) stub_dir: Option<String>,

    /// Search path for quoted includes (repeatable).
    #[arg(short = 'I', long = "include-path", value_name = "DIR")]
    pub(crate) include_paths: Vec<PathBuf>,

    /// Mark symbols matching the pattern do-not-generate (repeatable).
    #[arg(short = 'i', long = "ignore-name", value_name = "REGEX")]
    pub(crate) ignore_names: Vec<String>,

    /// Mark methods matching the pattern final, suppressing their virtual
    /// callback dispatch (repeatable).
    #[arg(long = "no-callback-name", value_name = "REGEX")]
    pub(crate) no_callback_names: Vec<String>,

    /// Keep constant macros as macros instead of converting them to
    /// module variables.
    #[arg(long)]
    pub(crate) no_macro_vars: bool,

    /// Drop underscore-prefixed globals.
    #[arg(long)]
    pub(crate) exclude_underscored: bool,

    /// Exclude symbols with unsupported types instead of binding them
    /// best-effort.
    #[arg(long)]
    pub(crate) drop_unsupported: bool,

    /// Keep pre-existing files in the output trees.
    #[arg(long)]
    pub(crate) no_clear: bool,

    /// Split generated glue so no file exceeds this many lines; values
    /// below 200 are raised to 200 [default: 500]
    #[arg(short, long, value_name = "N")]
    pub(crate) max_lines_per_file: Option<usize>,

    /// On-disk template root overriding the built-in template set.
    #[arg(long, value_name = "DIR")]
    pub(crate) template_root: Option<PathBuf>,

    /// Explicit project config path [default: ./bindery.toml when present]
    #[arg(long, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bindery=info,bindery_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run::run(cli) {
        output::error(&err);
        std::process::exit(1);
    }
}
