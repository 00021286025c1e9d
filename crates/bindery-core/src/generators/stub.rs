//! Python interface-stub generator.
//!
//! Emits a single `__init__.pyi` describing the bound module. Types the
//! annotation table cannot map degrade to `Any`; the stub always covers
//! every emitted symbol.

use crate::ctype;
use crate::symbols::{EnumValue, Namespace, ObjectRegistry, Param, Symbol, SymbolKind};
use crate::templates::{Bindings, STUB_HEADER_TEMPLATE};

use super::{Emitter, GenerateError, Generator};

#[derive(Debug, Default)]
pub struct StubGenerator;

impl Generator for StubGenerator {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn populate(&self, emitter: &mut Emitter<'_>) -> Result<(), GenerateError> {
        let options = emitter.options();
        let mut entries = Vec::new();
        collect_namespace(options.namespace(), options.registry(), &mut entries);

        emitter.save_template(
            STUB_HEADER_TEMPLATE,
            Some("__init__.pyi"),
            Bindings::new().with("body", entries.join("\n")),
        )?;
        Ok(())
    }
}

fn collect_namespace(namespace: &Namespace, registry: &ObjectRegistry, entries: &mut Vec<String>) {
    for symbol in &namespace.symbols {
        if let Some(entry) = symbol_entry(symbol, registry) {
            entries.push(entry);
        }
    }
    for child in &namespace.children {
        collect_namespace(child, registry, entries);
    }
}

fn symbol_entry(symbol: &Symbol, registry: &ObjectRegistry) -> Option<String> {
    match &symbol.kind {
        SymbolKind::Function { params, ret } => Some(format!(
            "def {}({}) -> {}: ...",
            symbol.name,
            stub_args(params, registry).join(", "),
            annotation(ret, registry)
        )),
        SymbolKind::Variable { ty, .. } => {
            Some(format!("{}: {}", symbol.name, annotation(ty, registry)))
        }
        SymbolKind::Class { members } => Some(class_entry(symbol, members, registry)),
        SymbolKind::Enum { values, .. } => Some(enum_entry(symbol, values)),
        // Aliases surface only when the target maps to a Python type.
        SymbolKind::Typedef { target } => ctype::python_annotation(target, registry)
            .map(|py| format!("{} = {}", symbol.name, py)),
        SymbolKind::Macro { .. } | SymbolKind::Method { .. } => None,
    }
}

fn class_entry(symbol: &Symbol, members: &[Symbol], registry: &ObjectRegistry) -> String {
    let mut lines = vec![format!("class {}:", symbol.name)];
    for member in members {
        match &member.kind {
            SymbolKind::Method {
                params,
                ret,
                is_static,
                ..
            } => {
                let mut args = stub_args(params, registry);
                if *is_static {
                    lines.push("    @staticmethod".to_string());
                } else {
                    args.insert(0, "self".to_string());
                }
                lines.push(format!(
                    "    def {}({}) -> {}: ...",
                    member.name,
                    args.join(", "),
                    annotation(ret, registry)
                ));
            }
            SymbolKind::Variable { ty, .. } => {
                lines.push(format!("    {}: {}", member.name, annotation(ty, registry)));
            }
            _ => {}
        }
    }
    if lines.len() == 1 {
        return format!("class {}: ...", symbol.name);
    }
    lines.join("\n")
}

/// pybind11 exposes enumerators as class attributes of the enum type.
fn enum_entry(symbol: &Symbol, values: &[EnumValue]) -> String {
    if values.is_empty() {
        return format!("class {}: ...", symbol.name);
    }
    let mut lines = vec![format!("class {}:", symbol.name)];
    for value in values {
        lines.push(format!("    {}: {}", value.name, symbol.name));
    }
    lines.join("\n")
}

fn stub_args(params: &[Param], registry: &ObjectRegistry) -> Vec<String> {
    params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let name = if param.name.is_empty() {
                format!("arg{i}")
            } else {
                param.name.clone()
            };
            format!("{name}: {}", annotation(&param.ty, registry))
        })
        .collect()
}

fn annotation(ty: &str, registry: &ObjectRegistry) -> String {
    ctype::python_annotation(ty, registry).unwrap_or_else(|| "Any".to_string())
}
