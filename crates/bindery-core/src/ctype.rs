//! C++ type-string helpers shared by preprocessing and the generators.
//!
//! Types arrive as raw declaration text (`const char *`, `api::Session &`).
//! [`normalize`] reduces them to a canonical spelling so the rest of the
//! pipeline can match on strings, and [`python_annotation`] maps canonical
//! spellings to Python stub annotations where a mapping exists.

use crate::symbols::ObjectRegistry;

/// Integer-family spellings that map to Python `int`.
const INT_TYPES: &[&str] = &[
    "signed char",
    "unsigned char",
    "short",
    "short int",
    "unsigned short",
    "int",
    "unsigned",
    "unsigned int",
    "long",
    "unsigned long",
    "long int",
    "long long",
    "unsigned long long",
    "int8_t",
    "uint8_t",
    "int16_t",
    "uint16_t",
    "int32_t",
    "uint32_t",
    "int64_t",
    "uint64_t",
    "size_t",
    "ssize_t",
    "ptrdiff_t",
    "intptr_t",
    "uintptr_t",
];

/// Canonicalize a type spelling: drop `const`/`volatile`, collapse
/// whitespace, and attach `*`/`&` to the base (`const char *` → `char*`).
pub fn normalize(ty: &str) -> String {
    let joined: String = ty
        .split_whitespace()
        .filter(|word| *word != "const" && *word != "volatile")
        .collect::<Vec<_>>()
        .join(" ");
    joined.replace(" *", "*").replace(" &", "&")
}

pub fn is_void(ty: &str) -> bool {
    normalize(ty) == "void"
}

/// Last `::` segment of a qualified name.
pub fn simple_name(full_name: &str) -> &str {
    full_name.rsplit("::").next().unwrap_or(full_name)
}

/// Python annotation for a C++ type, or `None` when the type has no
/// supported mapping (function pointers, unknown aggregates, raw buffers).
///
/// References bind like their referent; pointers are supported only when
/// they point at a registered class. Registered classes and enums map to
/// their unqualified name.
pub fn python_annotation(ty: &str, registry: &ObjectRegistry) -> Option<String> {
    let mut canonical = normalize(ty);
    if let Some(referent) = canonical.strip_suffix('&') {
        canonical = referent.to_string();
    }
    // Typedef targets may themselves carry qualifiers.
    let resolved = normalize(registry.resolve_typedef(&canonical));

    if resolved.contains('(') {
        return None;
    }

    match resolved.as_str() {
        "void" => Some("None".to_string()),
        "bool" => Some("bool".to_string()),
        // C++ `char` round-trips as a one-character string.
        "char" => Some("str".to_string()),
        "char*" => Some("str".to_string()),
        "std::string" | "string" => Some("str".to_string()),
        "float" | "double" | "long double" => Some("float".to_string()),
        _ if INT_TYPES.contains(&resolved.as_str()) => Some("int".to_string()),
        _ => {
            if registry.is_class(&resolved) || registry.is_enum(&resolved) {
                return Some(simple_name(&resolved).to_string());
            }
            if let Some(pointee) = resolved.strip_suffix('*') {
                let pointee = registry.resolve_typedef(pointee);
                if registry.is_class(pointee) {
                    return Some(simple_name(pointee).to_string());
                }
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{Namespace, Symbol, SymbolKind};

    fn registry_with(symbols: Vec<Symbol>) -> ObjectRegistry {
        let mut root = Namespace::root();
        root.symbols = symbols;
        root.qualify();
        ObjectRegistry::from_namespace(&root)
    }

    #[test]
    fn test_normalize_strips_qualifiers_and_spacing() {
        assert_eq!(normalize("const char *"), "char*");
        assert_eq!(normalize("unsigned   long long"), "unsigned long long");
        assert_eq!(normalize("api::Session &"), "api::Session&");
        assert_eq!(normalize("volatile int"), "int");
    }

    #[test]
    fn test_primitive_annotations() {
        let registry = ObjectRegistry::default();
        assert_eq!(
            python_annotation("int", &registry),
            Some("int".to_string())
        );
        assert_eq!(
            python_annotation("const char *", &registry),
            Some("str".to_string())
        );
        assert_eq!(
            python_annotation("double &", &registry),
            Some("float".to_string())
        );
        assert_eq!(
            python_annotation("void", &registry),
            Some("None".to_string())
        );
        assert_eq!(python_annotation("void *", &registry), None);
        assert_eq!(python_annotation("int (*)(int, int)", &registry), None);
    }

    #[test]
    fn test_registered_class_and_pointer() {
        let registry = registry_with(vec![Symbol::new(
            "Session",
            SymbolKind::Class { members: vec![] },
        )]);
        assert_eq!(
            python_annotation("Session", &registry),
            Some("Session".to_string())
        );
        assert_eq!(
            python_annotation("Session *", &registry),
            Some("Session".to_string())
        );
        assert_eq!(python_annotation("Unknown *", &registry), None);
    }

    #[test]
    fn test_typedef_resolves_before_mapping() {
        let registry = registry_with(vec![Symbol::new(
            "Handle",
            SymbolKind::Typedef {
                target: "unsigned int".to_string(),
            },
        )]);
        assert_eq!(
            python_annotation("Handle", &registry),
            Some("int".to_string())
        );
    }
}
