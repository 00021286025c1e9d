//! Read-only index from qualified names to generation metadata.

use std::collections::BTreeMap;

use super::{Namespace, Symbol, SymbolKind};

/// Coarse symbol classification carried by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolCategory {
    Function,
    Method,
    Variable,
    Class,
    Enum,
    Macro,
    Typedef,
}

/// Qualified-name lookup shared read-only across one generation run.
///
/// Built after preprocessing and filter rules, then referenced (behind
/// `Arc`) by the generation options. Generators use it to resolve typedef
/// chains and to decide whether a type name refers to a bound class or enum.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    entries: BTreeMap<String, SymbolCategory>,
    typedefs: BTreeMap<String, String>,
}

impl ObjectRegistry {
    pub fn from_namespace(namespace: &Namespace) -> Self {
        let mut registry = Self::default();
        namespace.visit_symbols(&mut |symbol| registry.insert(symbol));
        registry
    }

    fn insert(&mut self, symbol: &Symbol) {
        if symbol.full_name.is_empty() {
            return;
        }
        let category = category_of(&symbol.kind);
        if let SymbolKind::Typedef { target } = &symbol.kind {
            self.typedefs
                .insert(symbol.full_name.clone(), target.clone());
        }
        self.entries.insert(symbol.full_name.clone(), category);

        // Header text spells in-namespace types by their bare name, so the
        // trailing segment is aliased for the kinds that can appear in a
        // type position. Full names win on collision.
        if matches!(
            category,
            SymbolCategory::Class | SymbolCategory::Enum | SymbolCategory::Typedef
        ) {
            if let Some((_, simple)) = symbol.full_name.rsplit_once("::") {
                if let SymbolKind::Typedef { target } = &symbol.kind {
                    self.typedefs
                        .entry(simple.to_string())
                        .or_insert_with(|| target.clone());
                }
                self.entries.entry(simple.to_string()).or_insert(category);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn category_of(&self, full_name: &str) -> Option<SymbolCategory> {
        self.entries.get(full_name).copied()
    }

    pub fn is_class(&self, full_name: &str) -> bool {
        self.category_of(full_name) == Some(SymbolCategory::Class)
    }

    pub fn is_enum(&self, full_name: &str) -> bool {
        self.category_of(full_name) == Some(SymbolCategory::Enum)
    }

    /// Follow a typedef chain to its terminal target.
    ///
    /// Unknown names resolve to themselves; a cycle stops once every typedef
    /// has been followed once.
    pub fn resolve_typedef<'a>(&'a self, name: &'a str) -> &'a str {
        let mut current = name;
        for _ in 0..=self.typedefs.len() {
            match self.typedefs.get(current) {
                Some(target) => current = target.as_str(),
                None => break,
            }
        }
        current
    }
}

fn category_of(kind: &SymbolKind) -> SymbolCategory {
    match kind {
        SymbolKind::Function { .. } => SymbolCategory::Function,
        SymbolKind::Method { .. } => SymbolCategory::Method,
        SymbolKind::Variable { .. } => SymbolCategory::Variable,
        SymbolKind::Class { .. } => SymbolCategory::Class,
        SymbolKind::Enum { .. } => SymbolCategory::Enum,
        SymbolKind::Macro { .. } => SymbolCategory::Macro,
        SymbolKind::Typedef { .. } => SymbolCategory::Typedef,
    }
}
