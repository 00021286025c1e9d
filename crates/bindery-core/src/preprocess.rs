//! Semantic preprocessing between parsing and filter rules.
//!
//! Normalizes the raw symbol table per policy: constant macros become module
//! variables, underscore-prefixed globals can be excluded, and symbols whose
//! signatures have no supported binding are flagged and reported (dropped up
//! front only in strict mode).

use crate::ctype;
use crate::symbols::{Namespace, ObjectRegistry, Symbol, SymbolKind};

/// Policy toggles for one preprocessing pass.
#[derive(Debug, Clone)]
pub struct PreprocessOptions {
    /// Convert object-like macros with literal bodies into module variables.
    pub macros_as_variables: bool,
    /// Drop underscore-prefixed global variables from generation.
    pub exclude_underscored_globals: bool,
    /// Exclude flagged symbols up front instead of only reporting them.
    pub drop_unsupported: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            macros_as_variables: true,
            exclude_underscored_globals: false,
            drop_unsupported: false,
        }
    }
}

/// A symbol the binding generators cannot fully support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedSymbol {
    pub full_name: String,
    pub detail: String,
}

/// Output of one preprocessing pass.
#[derive(Debug)]
pub struct PreprocessResult {
    pub namespace: Namespace,
    /// Advisory diagnostics; never abort generation by themselves.
    pub unsupported: Vec<UnsupportedSymbol>,
}

/// Run the configured policies over a parsed symbol table.
pub fn preprocess(mut namespace: Namespace, options: &PreprocessOptions) -> PreprocessResult {
    apply_macro_policy(&mut namespace, options.macros_as_variables);
    if options.exclude_underscored_globals {
        exclude_underscored(&mut namespace);
    }
    let unsupported = flag_unsupported(&mut namespace, options.drop_unsupported);
    PreprocessResult {
        namespace,
        unsupported,
    }
}

fn apply_macro_policy(namespace: &mut Namespace, convert: bool) {
    namespace.visit_symbols_mut(&mut |symbol| {
        let SymbolKind::Macro { body } = &symbol.kind else {
            return;
        };
        if convert {
            if let Some((ty, value)) = classify_literal(body) {
                symbol.kind = SymbolKind::Variable {
                    ty: ty.to_string(),
                    value: Some(value),
                    is_const: true,
                    from_macro: true,
                };
                return;
            }
        }
        // Macros that stay macros have no binding representation.
        symbol.generate = false;
    });
}

/// Classify a macro body as a C++ literal, returning the variable type and
/// the literal text as written.
fn classify_literal(body: &str) -> Option<(&'static str, String)> {
    let text = body.trim();
    if text.is_empty() {
        return None;
    }
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Some(("const char *", text.to_string()));
    }
    if text.len() >= 3 && text.starts_with('\'') && text.ends_with('\'') {
        return Some(("char", text.to_string()));
    }
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let digits = unsigned.trim_end_matches(['u', 'U', 'l', 'L']);
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Some(("int", text.to_string()));
        }
    }
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return Some(("int", text.to_string()));
    }
    // f64 parsing also accepts bare words like "inf" and "NaN"; requiring a
    // '.' or exponent keeps those from classifying as literals.
    let mantissa = unsigned.trim_end_matches(['f', 'F', 'l', 'L']);
    if mantissa.contains(['.', 'e', 'E']) && mantissa.parse::<f64>().is_ok() {
        return Some(("double", text.to_string()));
    }
    None
}

fn exclude_underscored(namespace: &mut Namespace) {
    for symbol in &mut namespace.symbols {
        if symbol.name.starts_with('_') && matches!(symbol.kind, SymbolKind::Variable { .. }) {
            symbol.generate = false;
        }
    }
}

fn flag_unsupported(namespace: &mut Namespace, drop: bool) -> Vec<UnsupportedSymbol> {
    let registry = ObjectRegistry::from_namespace(namespace);
    let mut unsupported = Vec::new();
    namespace.visit_symbols_mut(&mut |symbol| {
        let Some(detail) = unsupported_detail(symbol, &registry) else {
            return;
        };
        tracing::debug!(symbol = %symbol.full_name, %detail, "unsupported symbol");
        unsupported.push(UnsupportedSymbol {
            full_name: symbol.full_name.clone(),
            detail,
        });
        if drop {
            symbol.generate = false;
        }
    });
    unsupported
}

fn unsupported_detail(symbol: &Symbol, registry: &ObjectRegistry) -> Option<String> {
    let (params, ret) = match &symbol.kind {
        SymbolKind::Function { params, ret }
        | SymbolKind::Method { params, ret, .. } => (params, ret),
        _ => return None,
    };
    for param in params {
        if ctype::python_annotation(&param.ty, registry).is_none() {
            let name = if param.name.is_empty() {
                "<unnamed>"
            } else {
                param.name.as_str()
            };
            return Some(format!(
                "parameter `{name}` has unsupported type `{}`",
                param.ty
            ));
        }
    }
    if ctype::python_annotation(ret, registry).is_none() {
        return Some(format!("unsupported return type `{ret}`"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Param;

    fn macro_symbol(name: &str, body: &str) -> Symbol {
        Symbol::new(
            name,
            SymbolKind::Macro {
                body: body.to_string(),
            },
        )
    }

    fn table_with(symbols: Vec<Symbol>) -> Namespace {
        let mut root = Namespace::root();
        root.symbols = symbols;
        root.qualify();
        root
    }

    #[test]
    fn test_literal_macros_become_const_variables() {
        let table = table_with(vec![
            macro_symbol("MAX_ORDERS", "128"),
            macro_symbol("API_VERSION", "\"6.3.15\""),
            macro_symbol("TICK_SIZE", "0.5"),
            macro_symbol("CALL(x)", "do_call(x)"),
        ]);
        let result = preprocess(table, &PreprocessOptions::default());

        match &result.namespace.symbols[0].kind {
            SymbolKind::Variable {
                ty,
                value,
                is_const,
                from_macro,
            } => {
                assert_eq!(ty, "int");
                assert_eq!(value.as_deref(), Some("128"));
                assert!(*is_const);
                assert!(*from_macro);
            }
            other => panic!("expected variable, got {other:?}"),
        }
        match &result.namespace.symbols[1].kind {
            SymbolKind::Variable { ty, .. } => assert_eq!(ty, "const char *"),
            other => panic!("expected variable, got {other:?}"),
        }
        match &result.namespace.symbols[2].kind {
            SymbolKind::Variable { ty, .. } => assert_eq!(ty, "double"),
            other => panic!("expected variable, got {other:?}"),
        }
        // Non-literal macros keep their kind but drop out of generation.
        assert!(!result.namespace.symbols[3].generate);
    }

    #[test]
    fn test_char_and_exponent_float_macros_convert() {
        let table = table_with(vec![
            macro_symbol("FIELD_SEP", "';'"),
            macro_symbol("NEWLINE", "'\\n'"),
            macro_symbol("SCALE", "1e6"),
            macro_symbol("EPS", "2.5E-3f"),
        ]);
        let result = preprocess(table, &PreprocessOptions::default());

        match &result.namespace.symbols[0].kind {
            SymbolKind::Variable {
                ty,
                value,
                from_macro,
                ..
            } => {
                assert_eq!(ty, "char");
                assert_eq!(value.as_deref(), Some("';'"));
                assert!(*from_macro);
            }
            other => panic!("expected variable, got {other:?}"),
        }
        assert!(result.namespace.symbols[0].generate);
        match &result.namespace.symbols[1].kind {
            SymbolKind::Variable { ty, .. } => assert_eq!(ty, "char"),
            other => panic!("expected variable, got {other:?}"),
        }
        match &result.namespace.symbols[2].kind {
            SymbolKind::Variable { ty, .. } => assert_eq!(ty, "double"),
            other => panic!("expected variable, got {other:?}"),
        }
        match &result.namespace.symbols[3].kind {
            SymbolKind::Variable { ty, .. } => assert_eq!(ty, "double"),
            other => panic!("expected variable, got {other:?}"),
        }
    }

    #[test]
    fn test_macro_conversion_disabled() {
        let table = table_with(vec![macro_symbol("MAX_ORDERS", "128")]);
        let options = PreprocessOptions {
            macros_as_variables: false,
            ..PreprocessOptions::default()
        };
        let result = preprocess(table, &options);
        assert!(!result.namespace.symbols[0].generate);
        assert!(matches!(
            result.namespace.symbols[0].kind,
            SymbolKind::Macro { .. }
        ));
    }

    #[test]
    fn test_underscored_globals_excluded_only_when_enabled() {
        let variable = |name: &str| {
            Symbol::new(
                name,
                SymbolKind::Variable {
                    ty: "int".to_string(),
                    value: None,
                    is_const: false,
                    from_macro: false,
                },
            )
        };
        let table = table_with(vec![variable("_hidden"), variable("visible")]);
        let result = preprocess(table.clone(), &PreprocessOptions::default());
        assert!(result.namespace.symbols[0].generate);

        let options = PreprocessOptions {
            exclude_underscored_globals: true,
            ..PreprocessOptions::default()
        };
        let result = preprocess(table, &options);
        assert!(!result.namespace.symbols[0].generate);
        assert!(result.namespace.symbols[1].generate);
    }

    #[test]
    fn test_unsupported_function_reported_not_dropped_by_default() {
        let callback = Symbol::new(
            "set_handler",
            SymbolKind::Function {
                params: vec![Param {
                    name: "handler".to_string(),
                    ty: "void (*)(int)".to_string(),
                }],
                ret: "void".to_string(),
            },
        );
        let table = table_with(vec![callback]);

        let result = preprocess(table.clone(), &PreprocessOptions::default());
        assert_eq!(result.unsupported.len(), 1);
        assert_eq!(result.unsupported[0].full_name, "set_handler");
        assert!(result.unsupported[0].detail.contains("handler"));
        assert!(result.namespace.symbols[0].generate);

        let strict = PreprocessOptions {
            drop_unsupported: true,
            ..PreprocessOptions::default()
        };
        let result = preprocess(table, &strict);
        assert_eq!(result.unsupported.len(), 1);
        assert!(!result.namespace.symbols[0].generate);
    }

    #[test]
    fn test_supported_signatures_produce_no_diagnostics() {
        let add = Symbol::new(
            "add",
            SymbolKind::Function {
                params: vec![
                    Param {
                        name: "a".to_string(),
                        ty: "int".to_string(),
                    },
                    Param {
                        name: "b".to_string(),
                        ty: "const char *".to_string(),
                    },
                ],
                ret: "double".to_string(),
            },
        );
        let result = preprocess(table_with(vec![add]), &PreprocessOptions::default());
        assert!(result.unsupported.is_empty());
    }
}
