//! Core pipeline for generating pybind11 glue and Python stubs from C/C++ headers.
//!
//! This crate turns a parsed symbol table into two artifact trees: a set of
//! `.cpp` translation units that bind the symbols through pybind11, and a
//! `.pyi` stub package describing the same surface to Python tooling. It is
//! consumed by the `bindery` CLI and contains no terminal or argument-parsing
//! logic.
//!
//! # Modules
//!
//! - [`ctype`] — C type normalization and Python annotation mapping
//! - [`fileset`] — In-memory virtual file set and disk writer
//! - [`filter`] — Pattern rules that unbind symbols or strip callback dispatch
//! - [`generators`] — The pybind11 glue and `.pyi` stub generators
//! - [`options`] — Frozen per-run generation options
//! - [`parser`] — Header scanner and JSON symbol-table loader
//! - [`preprocess`] — Macro, underscore, and unsupported-type policies
//! - [`symbols`] — Symbol table model and the object registry
//! - [`templates`] — Minimal `$name` substitution engine and built-in templates

pub mod ctype;
pub mod fileset;
pub mod filter;
pub mod generators;
pub mod options;
pub mod parser;
pub mod preprocess;
pub mod symbols;
pub mod templates;
