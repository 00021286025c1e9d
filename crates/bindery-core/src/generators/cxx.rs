//! pybind11 glue-code generator.
//!
//! Each symbol becomes one block: an optional file-scope prelude (trampoline
//! classes) plus a run of statements for the bind function. Blocks are
//! packed into part files so every rendered file stays at or under the
//! configured line bound, and `module.cpp` ties the parts together.

use heck::{ToSnakeCase, ToUpperCamelCase};

use crate::symbols::{EnumValue, Namespace, Symbol, SymbolKind};
use crate::templates::{Bindings, MODULE_PART_TEMPLATE, MODULE_TEMPLATE};

use super::{Emitter, GenerateError, Generator};

#[derive(Debug, Default)]
pub struct CxxGenerator;

impl Generator for CxxGenerator {
    fn name(&self) -> &'static str {
        "cxx"
    }

    fn populate(&self, emitter: &mut Emitter<'_>) -> Result<(), GenerateError> {
        let options = emitter.options();
        let module_snake = options.module_name().to_snake_case();

        // Template overhead is measured, not assumed: render one part with
        // empty substitutions and count its lines.
        let overhead = emitter
            .render_template(
                MODULE_PART_TEMPLATE,
                Bindings::new()
                    .with("part_function", format!("{module_snake}_bind_part_1"))
                    .with("class_definitions", "")
                    .with("part_body", ""),
            )?
            .lines()
            .count();

        let blocks = collect_blocks(options.namespace());
        let chunks = pack_blocks(blocks, options.max_lines_per_file(), overhead);

        let mut declarations = Vec::with_capacity(chunks.len());
        let mut calls = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let function = format!("{module_snake}_bind_part_{}", index + 1);
            declarations.push(format!("void {function}(pybind11::module_ &m);"));
            calls.push(format!("    {function}(m);"));

            let file = format!("{}_part_{}.cpp", options.module_name(), index + 1);
            emitter.save_template(
                MODULE_PART_TEMPLATE,
                Some(&file),
                Bindings::new()
                    .with("part_function", function)
                    .with("class_definitions", chunk.preludes.join("\n\n"))
                    .with("part_body", chunk.bodies.join("\n")),
            )?;
        }

        emitter.save_template(
            MODULE_TEMPLATE,
            None,
            Bindings::new()
                .with("part_declarations", declarations.join("\n"))
                .with("part_calls", calls.join("\n")),
        )?;
        Ok(())
    }
}

/// Everything one symbol contributes to a part file.
struct Block {
    /// File-scope text above the bind function (trampoline classes).
    prelude: Option<String>,
    /// Statements inside the bind function, already indented.
    body: String,
}

#[derive(Default)]
struct Chunk {
    preludes: Vec<String>,
    bodies: Vec<String>,
    prelude_lines: usize,
    body_lines: usize,
}

impl Chunk {
    fn push(&mut self, block: Block) {
        if let Some(prelude) = block.prelude {
            self.prelude_lines += count_lines(&prelude);
            self.preludes.push(prelude);
        }
        self.body_lines += count_lines(&block.body);
        self.bodies.push(block.body);
    }

    fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Rendered size of this chunk's part file with `block` appended.
    fn lines_with(&self, overhead: usize, block: &Block) -> usize {
        let body = self.body_lines + count_lines(&block.body);
        let (count, lines) = match &block.prelude {
            Some(p) => (self.preludes.len() + 1, self.prelude_lines + count_lines(p)),
            None => (self.preludes.len(), self.prelude_lines),
        };
        rendered_lines(overhead, body, lines, count)
    }
}

/// Line count of a rendered part file given its substitution sizes.
///
/// The part template keeps `$class_definitions` and `$part_body` alone on
/// dedicated lines, so substituting an n-line value grows the file by
/// n - 1; an empty value leaves the placeholder line blank. Preludes are
/// joined with one blank line between them.
fn rendered_lines(
    overhead: usize,
    body_lines: usize,
    prelude_lines: usize,
    prelude_count: usize,
) -> usize {
    let mut total = overhead;
    if body_lines > 0 {
        total += body_lines - 1;
    }
    if prelude_count > 0 {
        total += prelude_lines + (prelude_count - 1) - 1;
    }
    total
}

fn count_lines(text: &str) -> usize {
    text.lines().count()
}

/// Greedy packing: a block joins the current chunk unless that would push
/// the rendered file past the bound; a block too large for any chunk still
/// gets a file of its own.
fn pack_blocks(blocks: Vec<Block>, max_lines: usize, overhead: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = Chunk::default();
    for block in blocks {
        if !current.is_empty() && current.lines_with(overhead, &block) > max_lines {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(block);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn collect_blocks(namespace: &Namespace) -> Vec<Block> {
    let mut blocks = Vec::new();
    collect_namespace(namespace, &mut blocks);
    blocks
}

fn collect_namespace(namespace: &Namespace, blocks: &mut Vec<Block>) {
    for symbol in &namespace.symbols {
        if let Some(block) = symbol_block(symbol) {
            blocks.push(block);
        }
    }
    for child in &namespace.children {
        collect_namespace(child, blocks);
    }
}

fn symbol_block(symbol: &Symbol) -> Option<Block> {
    match &symbol.kind {
        SymbolKind::Function { .. } => Some(Block {
            prelude: None,
            body: format!("    m.def(\"{}\", &{});", symbol.name, symbol.full_name),
        }),
        SymbolKind::Variable { from_macro, .. } => {
            // Converted macros are referenced by bare name; the include of
            // the defining header makes the token visible.
            let target: &str = if *from_macro {
                &symbol.name
            } else {
                &symbol.full_name
            };
            Some(Block {
                prelude: None,
                body: format!("    m.attr(\"{}\") = {};", symbol.name, target),
            })
        }
        SymbolKind::Enum { is_scoped, values } => Some(enum_block(symbol, *is_scoped, values)),
        SymbolKind::Class { members } => Some(class_block(symbol, members)),
        // Typedefs surface only in the stub; macros that survived the macro
        // policy unconverted produce no glue.
        SymbolKind::Typedef { .. } | SymbolKind::Macro { .. } | SymbolKind::Method { .. } => None,
    }
}

fn enum_block(symbol: &Symbol, is_scoped: bool, values: &[EnumValue]) -> Block {
    let mut lines = vec![format!(
        "    py::enum_<{}>(m, \"{}\")",
        symbol.full_name, symbol.name
    )];
    for value in values {
        lines.push(format!(
            "        .value(\"{}\", {}::{})",
            value.name, symbol.full_name, value.name
        ));
    }
    if is_scoped {
        if let Some(last) = lines.last_mut() {
            last.push(';');
        }
    } else {
        // unscoped enumerators also live at module scope, as in C++
        lines.push("        .export_values();".to_string());
    }
    Block {
        prelude: None,
        body: lines.join("\n"),
    }
}

fn class_block(symbol: &Symbol, members: &[Symbol]) -> Block {
    let qualified = &symbol.full_name;
    let overridable: Vec<&Symbol> = members.iter().filter(|m| is_overridable(m)).collect();
    let has_pure = members.iter().any(|m| {
        matches!(
            &m.kind,
            SymbolKind::Method {
                is_pure_virtual: true,
                ..
            }
        )
    });

    let prelude = (!overridable.is_empty()).then(|| trampoline_class(symbol, &overridable));

    let mut lines = vec![match &prelude {
        Some(_) => format!(
            "    py::class_<{qualified}, {}>(m, \"{}\")",
            trampoline_name(&symbol.name),
            symbol.name
        ),
        None => format!("    py::class_<{qualified}>(m, \"{}\")", symbol.name),
    }];

    // An abstract class with no trampoline cannot be constructed from
    // Python at all, so no init is declared.
    if !(has_pure && prelude.is_none()) {
        lines.push("        .def(py::init<>())".to_string());
    }

    for member in members {
        match &member.kind {
            SymbolKind::Method { is_static, .. } => {
                let def = if *is_static { "def_static" } else { "def" };
                lines.push(format!(
                    "        .{def}(\"{}\", &{qualified}::{})",
                    member.name, member.name
                ));
            }
            SymbolKind::Variable { is_const, .. } => {
                let def = if *is_const {
                    "def_readonly"
                } else {
                    "def_readwrite"
                };
                lines.push(format!(
                    "        .{def}(\"{}\", &{qualified}::{})",
                    member.name, member.name
                ));
            }
            _ => {}
        }
    }

    if let Some(last) = lines.last_mut() {
        last.push(';');
    }
    Block {
        prelude,
        body: lines.join("\n"),
    }
}

fn is_overridable(member: &Symbol) -> bool {
    matches!(
        &member.kind,
        SymbolKind::Method {
            is_virtual,
            is_pure_virtual,
            is_final,
            ..
        } if (*is_virtual || *is_pure_virtual) && !*is_final
    )
}

fn trampoline_name(class_name: &str) -> String {
    format!("Py{}", class_name.to_upper_camel_case())
}

/// Trampoline subclass forwarding each overridable virtual into Python.
fn trampoline_class(symbol: &Symbol, methods: &[&Symbol]) -> String {
    let qualified = &symbol.full_name;
    let mut text = format!(
        "class {} : public {qualified} {{\npublic:\n    using {qualified}::{};\n",
        trampoline_name(&symbol.name),
        symbol.name
    );
    for method in methods {
        let SymbolKind::Method {
            params,
            ret,
            is_pure_virtual,
            is_const,
            ..
        } = &method.kind
        else {
            continue;
        };
        let args: Vec<(String, &str)> = params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let name = if p.name.is_empty() {
                    format!("arg{i}")
                } else {
                    p.name.clone()
                };
                (name, p.ty.as_str())
            })
            .collect();
        let signature = args
            .iter()
            .map(|(name, ty)| format!("{ty} {name}"))
            .collect::<Vec<_>>()
            .join(", ");
        let forwarded: String = args.iter().map(|(name, _)| format!(", {name}")).collect();
        let overrider = if *is_pure_virtual {
            "PYBIND11_OVERRIDE_PURE"
        } else {
            "PYBIND11_OVERRIDE"
        };
        let const_kw = if *is_const { " const" } else { "" };
        text.push_str(&format!(
            "    {ret} {name}({signature}){const_kw} override {{\n        {overrider}({ret}, {qualified}, {name}{forwarded});\n    }}\n",
            name = method.name,
        ));
    }
    text.push_str("};");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileset::FileSet;
    use crate::generators::run_generator;
    use crate::options::GeneratorOptions;
    use crate::symbols::{ObjectRegistry, Param};
    use crate::templates::TemplateEngine;
    use std::sync::Arc;

    fn generate(root: Namespace) -> FileSet {
        generate_with_max(root, 500)
    }

    fn generate_with_max(mut root: Namespace, max_lines: usize) -> FileSet {
        root.qualify();
        let registry = Arc::new(ObjectRegistry::from_namespace(&root));
        let options = GeneratorOptions::new("sample", root, registry, vec![])
            .with_max_lines(max_lines);
        run_generator(&CxxGenerator, &options, &TemplateEngine::builtin()).unwrap()
    }

    fn function(name: &str) -> Symbol {
        Symbol::new(
            name,
            SymbolKind::Function {
                params: vec![],
                ret: "void".to_string(),
            },
        )
    }

    fn method(name: &str, is_virtual: bool, is_pure: bool, is_final: bool) -> Symbol {
        Symbol::new(
            name,
            SymbolKind::Method {
                params: vec![],
                ret: "void".to_string(),
                is_virtual,
                is_pure_virtual: is_pure,
                is_static: false,
                is_const: false,
                is_final,
            },
        )
    }

    #[test]
    fn test_module_file_ties_parts_together() {
        let mut root = Namespace::root();
        root.symbols.push(function("connect"));

        let files = generate(root);
        let module = files.get("module.cpp").unwrap();
        assert!(module.contains("struct tag_sample {};"));
        assert!(module.contains("void sample_bind_part_1(pybind11::module_ &m);"));
        assert!(module.contains("PYBIND11_MODULE(sample, m)"));
        assert!(module.contains("    sample_bind_part_1(m);"));

        let part = files.get("sample_part_1.cpp").unwrap();
        assert!(part.contains("void sample_bind_part_1(py::module_ &m)"));
        assert!(part.contains("    m.def(\"connect\", &connect);"));
    }

    #[test]
    fn test_variable_and_macro_statements() {
        let mut root = Namespace::root();
        root.symbols.push(Symbol::new(
            "g_count",
            SymbolKind::Variable {
                ty: "int".to_string(),
                value: None,
                is_const: false,
                from_macro: false,
            },
        ));
        let mut converted = Symbol::new(
            "MAX_CLIENTS",
            SymbolKind::Variable {
                ty: "int".to_string(),
                value: Some("64".to_string()),
                is_const: true,
                from_macro: true,
            },
        );
        converted.full_name = "MAX_CLIENTS".to_string();
        root.symbols.push(converted);

        let files = generate(root);
        let part = files.get("sample_part_1.cpp").unwrap();
        assert!(part.contains("m.attr(\"g_count\") = g_count;"));
        assert!(part.contains("m.attr(\"MAX_CLIENTS\") = MAX_CLIENTS;"));
    }

    #[test]
    fn test_enum_scoping_controls_export_values() {
        let mut root = Namespace::root();
        root.symbols.push(Symbol::new(
            "Color",
            SymbolKind::Enum {
                is_scoped: false,
                values: vec![
                    EnumValue {
                        name: "RED".to_string(),
                        value: 0,
                    },
                    EnumValue {
                        name: "GREEN".to_string(),
                        value: 1,
                    },
                ],
            },
        ));
        root.symbols.push(Symbol::new(
            "Mode",
            SymbolKind::Enum {
                is_scoped: true,
                values: vec![EnumValue {
                    name: "Fast".to_string(),
                    value: 0,
                }],
            },
        ));

        let files = generate(root);
        let part = files.get("sample_part_1.cpp").unwrap();
        assert!(part.contains("py::enum_<Color>(m, \"Color\")"));
        assert!(part.contains(".value(\"RED\", Color::RED)"));
        assert!(part.contains(".export_values();"));
        assert!(part.contains(".value(\"Fast\", Mode::Fast);"));
    }

    #[test]
    fn test_virtual_methods_get_a_trampoline() {
        let mut area = method("area", true, false, false);
        if let SymbolKind::Method { ret, is_const, .. } = &mut area.kind {
            *ret = "double".to_string();
            *is_const = true;
        }
        let mut scale = method("scale", false, false, false);
        if let SymbolKind::Method { params, .. } = &mut scale.kind {
            params.push(Param {
                name: "factor".to_string(),
                ty: "double".to_string(),
            });
        }
        let mut root = Namespace::root();
        root.child_mut("geo").symbols.push(Symbol::new(
            "Shape",
            SymbolKind::Class {
                members: vec![area, scale],
            },
        ));

        let files = generate(root);
        let part = files.get("sample_part_1.cpp").unwrap();
        assert!(part.contains("class PyShape : public geo::Shape {"));
        assert!(part.contains("using geo::Shape::Shape;"));
        assert!(part.contains("double area() const override {"));
        assert!(part.contains("PYBIND11_OVERRIDE(double, geo::Shape, area);"));
        assert!(part.contains("py::class_<geo::Shape, PyShape>(m, \"Shape\")"));
        assert!(part.contains(".def(py::init<>())"));
        assert!(part.contains(".def(\"scale\", &geo::Shape::scale)"));
    }

    #[test]
    fn test_final_virtuals_suppress_the_trampoline() {
        let mut root = Namespace::root();
        root.symbols.push(Symbol::new(
            "Ticker",
            SymbolKind::Class {
                members: vec![method("on_tick", true, false, true)],
            },
        ));

        let files = generate(root);
        let part = files.get("sample_part_1.cpp").unwrap();
        assert!(!part.contains("PyTicker"));
        assert!(!part.contains("PYBIND11_OVERRIDE"));
        assert!(part.contains("py::class_<Ticker>(m, \"Ticker\")"));
        assert!(part.contains(".def(\"on_tick\", &Ticker::on_tick)"));
    }

    #[test]
    fn test_pure_virtual_emits_override_pure_and_keeps_init() {
        let mut root = Namespace::root();
        root.symbols.push(Symbol::new(
            "Handler",
            SymbolKind::Class {
                members: vec![method("handle", true, true, false)],
            },
        ));

        let files = generate(root);
        let part = files.get("sample_part_1.cpp").unwrap();
        assert!(part.contains("PYBIND11_OVERRIDE_PURE(void, Handler, handle);"));
        assert!(part.contains(".def(py::init<>())"));
    }

    #[test]
    fn test_abstract_class_without_trampoline_skips_init() {
        let mut root = Namespace::root();
        root.symbols.push(Symbol::new(
            "Sink",
            SymbolKind::Class {
                members: vec![method("consume", true, true, true)],
            },
        ));

        let files = generate(root);
        let part = files.get("sample_part_1.cpp").unwrap();
        assert!(!part.contains("py::init<>"));
        assert!(part.contains("py::class_<Sink>(m, \"Sink\")"));
        assert!(part.contains(".def(\"consume\", &Sink::consume)"));
    }

    #[test]
    fn test_static_and_field_members() {
        let field = Symbol::new(
            "label",
            SymbolKind::Variable {
                ty: "std::string".to_string(),
                value: None,
                is_const: false,
                from_macro: false,
            },
        );
        let frozen = Symbol::new(
            "id",
            SymbolKind::Variable {
                ty: "int".to_string(),
                value: None,
                is_const: true,
                from_macro: false,
            },
        );
        let mut make = method("make", false, false, false);
        if let SymbolKind::Method { is_static, .. } = &mut make.kind {
            *is_static = true;
        }
        let mut root = Namespace::root();
        root.symbols.push(Symbol::new(
            "Widget",
            SymbolKind::Class {
                members: vec![make, field, frozen],
            },
        ));

        let files = generate(root);
        let part = files.get("sample_part_1.cpp").unwrap();
        assert!(part.contains(".def_static(\"make\", &Widget::make)"));
        assert!(part.contains(".def_readwrite(\"label\", &Widget::label)"));
        assert!(part.contains(".def_readonly(\"id\", &Widget::id);"));
    }

    #[test]
    fn test_typedefs_produce_no_glue() {
        let mut root = Namespace::root();
        root.symbols.push(Symbol::new(
            "Handle",
            SymbolKind::Typedef {
                target: "int".to_string(),
            },
        ));

        let files = generate(root);
        assert!(files.get("sample_part_1.cpp").is_none());
        assert!(files.get("module.cpp").is_some());
    }

    #[test]
    fn test_packing_splits_at_the_line_bound() {
        let mut root = Namespace::root();
        for i in 0..400 {
            root.symbols.push(function(&format!("f_{i}")));
        }

        let files = generate_with_max(root, 200);
        let parts: Vec<&str> = files
            .paths()
            .filter(|p| p.contains("_part_"))
            .collect();
        assert!(parts.len() > 1, "expected a split, got {parts:?}");
        for path in parts {
            let content = files.get(path).unwrap();
            assert!(
                content.lines().count() <= 200,
                "{path} exceeds the bound"
            );
        }
    }
}
