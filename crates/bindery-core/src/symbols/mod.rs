//! Symbol table model shared by every pipeline stage.
//!
//! The parser produces a [`Namespace`] tree mirroring C++ lexical scoping;
//! the preprocessor and filter rules flip flags on it; the options builder
//! freezes a filtered projection that the generators consume.

use serde::{Deserialize, Serialize};

pub mod registry;

pub use registry::{ObjectRegistry, SymbolCategory};

fn default_true() -> bool {
    true
}

fn default_void() -> String {
    "void".to_string()
}

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name; empty when the declaration omits one.
    #[serde(default)]
    pub name: String,
    /// C++ type as written in the declaration.
    #[serde(rename = "type")]
    pub ty: String,
}

/// A single enumerator inside an enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    #[serde(default)]
    pub value: i64,
}

/// Kind-specific payload of a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolKind {
    /// Free function at namespace scope.
    Function {
        #[serde(default)]
        params: Vec<Param>,
        #[serde(default = "default_void")]
        ret: String,
    },
    /// Member function of a class.
    Method {
        #[serde(default)]
        params: Vec<Param>,
        #[serde(default = "default_void")]
        ret: String,
        #[serde(default)]
        is_virtual: bool,
        #[serde(default)]
        is_pure_virtual: bool,
        #[serde(default)]
        is_static: bool,
        #[serde(default)]
        is_const: bool,
        /// Suppresses virtual-callback (trampoline) generation when set.
        #[serde(default)]
        is_final: bool,
    },
    /// Global, namespace-scope, or member variable.
    Variable {
        #[serde(rename = "type")]
        ty: String,
        /// Literal initializer when known (always set for converted macros).
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        is_const: bool,
        /// Set when macro policy converted a constant macro.
        #[serde(default)]
        from_macro: bool,
    },
    /// Class or struct; members are methods, member variables, and nested
    /// classes.
    Class {
        #[serde(default)]
        members: Vec<Symbol>,
    },
    /// Enumeration.
    Enum {
        #[serde(default)]
        is_scoped: bool,
        #[serde(default)]
        values: Vec<EnumValue>,
    },
    /// Object-like preprocessor macro, kept until macro policy runs.
    Macro {
        #[serde(default)]
        body: String,
    },
    /// Type alias (`typedef` or `using`).
    Typedef { target: String },
}

/// A named, generatable unit of the symbol table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    /// `::`-joined qualified name; assigned by [`Namespace::qualify`] when
    /// the producer leaves it empty.
    #[serde(default)]
    pub full_name: String,
    /// Cleared by filter rules and preprocessor policies to suppress
    /// emission.
    #[serde(default = "default_true")]
    pub generate: bool,
    #[serde(flatten)]
    pub kind: SymbolKind,
}

impl Symbol {
    /// Build a symbol with an unassigned qualified name.
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            full_name: String::new(),
            generate: true,
            kind,
        }
    }

    /// The should-emit predicate: marked for generation and named.
    pub fn should_emit(&self) -> bool {
        self.generate && !self.name.is_empty()
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, SymbolKind::Method { .. })
    }
}

/// Recursive, ordered container of symbols mirroring C++ scoping.
///
/// Insertion order is preserved but carries no meaning for generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    /// Empty for the root (global) namespace.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub children: Vec<Namespace>,
}

impl Namespace {
    /// The root (global) namespace.
    pub fn root() -> Self {
        Self::default()
    }

    /// A named namespace with no contents yet.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Find or create a direct child namespace.
    pub fn child_mut(&mut self, name: &str) -> &mut Namespace {
        let idx = match self.children.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.children.push(Namespace::named(name));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    /// Merge another table into this one: symbols append in order, children
    /// merge by name.
    pub fn merge(&mut self, other: Namespace) {
        self.symbols.extend(other.symbols);
        for child in other.children {
            self.child_mut(&child.name).merge(child);
        }
    }

    /// Assign `::`-joined qualified names wherever the producer left them
    /// empty. Explicit names from a preparsed table are kept as-is.
    pub fn qualify(&mut self) {
        if self.full_name.is_empty() {
            self.full_name = self.name.clone();
        }
        let parent = self.full_name.clone();
        for symbol in &mut self.symbols {
            qualify_symbol(symbol, &parent);
        }
        for child in &mut self.children {
            if child.full_name.is_empty() && !child.name.is_empty() {
                child.full_name = join_scope(&parent, &child.name);
            }
            child.qualify();
        }
    }

    /// Visit every symbol in the tree, class members included.
    pub fn visit_symbols<F: FnMut(&Symbol)>(&self, f: &mut F) {
        for symbol in &self.symbols {
            visit_symbol(symbol, f);
        }
        for child in &self.children {
            child.visit_symbols(f);
        }
    }

    /// Mutable traversal used by filter rules and preprocessor policies.
    pub fn visit_symbols_mut<F: FnMut(&mut Symbol)>(&mut self, f: &mut F) {
        for symbol in &mut self.symbols {
            visit_symbol_mut(symbol, f);
        }
        for child in &mut self.children {
            child.visit_symbols_mut(f);
        }
    }

    /// Project onto symbols passing the should-emit predicate.
    ///
    /// Child namespaces are kept even when emptied; generation iterates
    /// symbols, so an empty namespace is inert.
    pub fn filtered(&self) -> Namespace {
        Namespace {
            name: self.name.clone(),
            full_name: self.full_name.clone(),
            symbols: self
                .symbols
                .iter()
                .filter(|s| s.should_emit())
                .map(filter_symbol)
                .collect(),
            children: self.children.iter().map(|c| c.filtered()).collect(),
        }
    }

    /// Number of symbols in the tree, class members included.
    pub fn symbol_count(&self) -> usize {
        let mut count = 0;
        self.visit_symbols(&mut |_| count += 1);
        count
    }
}

fn join_scope(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}::{name}")
    }
}

fn qualify_symbol(symbol: &mut Symbol, parent: &str) {
    if symbol.full_name.is_empty() && !symbol.name.is_empty() {
        symbol.full_name = join_scope(parent, &symbol.name);
    }
    if let SymbolKind::Class { members } = &mut symbol.kind {
        let class_scope = symbol.full_name.clone();
        for member in members {
            qualify_symbol(member, &class_scope);
        }
    }
}

fn visit_symbol<F: FnMut(&Symbol)>(symbol: &Symbol, f: &mut F) {
    f(symbol);
    if let SymbolKind::Class { members } = &symbol.kind {
        for member in members {
            visit_symbol(member, f);
        }
    }
}

fn visit_symbol_mut<F: FnMut(&mut Symbol)>(symbol: &mut Symbol, f: &mut F) {
    f(symbol);
    if let SymbolKind::Class { members } = &mut symbol.kind {
        for member in members {
            visit_symbol_mut(member, f);
        }
    }
}

fn filter_symbol(symbol: &Symbol) -> Symbol {
    let mut filtered = symbol.clone();
    filter_members(&mut filtered);
    filtered
}

fn filter_members(symbol: &mut Symbol) {
    if let SymbolKind::Class { members } = &mut symbol.kind {
        members.retain(Symbol::should_emit);
        for member in members {
            filter_members(member);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str) -> Symbol {
        Symbol::new(
            name,
            SymbolKind::Function {
                params: vec![],
                ret: "void".to_string(),
            },
        )
    }

    fn method(name: &str) -> Symbol {
        Symbol::new(
            name,
            SymbolKind::Method {
                params: vec![],
                ret: "void".to_string(),
                is_virtual: false,
                is_pure_virtual: false,
                is_static: false,
                is_const: false,
                is_final: false,
            },
        )
    }

    #[test]
    fn test_qualify_assigns_scoped_names() {
        let mut root = Namespace::root();
        root.symbols.push(function("foo"));

        let api = root.child_mut("api");
        api.symbols.push(function("connect"));
        api.symbols.push(Symbol::new(
            "Session",
            SymbolKind::Class {
                members: vec![method("login")],
            },
        ));

        root.qualify();

        assert_eq!(root.symbols[0].full_name, "foo");
        let api = &root.children[0];
        assert_eq!(api.full_name, "api");
        assert_eq!(api.symbols[0].full_name, "api::connect");
        let session = &api.symbols[1];
        assert_eq!(session.full_name, "api::Session");
        match &session.kind {
            SymbolKind::Class { members } => {
                assert_eq!(members[0].full_name, "api::Session::login");
            }
            other => panic!("expected class, got {other:?}"),
        }
    }

    #[test]
    fn test_qualify_keeps_explicit_names() {
        let mut root = Namespace::root();
        let mut sym = function("foo");
        sym.full_name = "legacy::foo".to_string();
        root.symbols.push(sym);

        root.qualify();
        assert_eq!(root.symbols[0].full_name, "legacy::foo");
    }

    #[test]
    fn test_merge_appends_symbols_and_joins_children_by_name() {
        let mut first = Namespace::root();
        first.symbols.push(function("a"));
        first.child_mut("api").symbols.push(function("one"));

        let mut second = Namespace::root();
        second.symbols.push(function("b"));
        second.child_mut("api").symbols.push(function("two"));
        second.child_mut("net").symbols.push(function("three"));

        first.merge(second);
        first.qualify();

        assert_eq!(first.symbols.len(), 2);
        assert_eq!(first.children.len(), 2);
        let api = &first.children[0];
        assert_eq!(api.symbols.len(), 2);
        assert_eq!(api.symbols[1].full_name, "api::two");
        assert_eq!(first.children[1].symbols[0].full_name, "net::three");
    }

    #[test]
    fn test_filtered_drops_unnamed_and_unmarked_symbols() {
        let mut root = Namespace::root();
        root.symbols.push(function("keep"));
        let mut skipped = function("skipped");
        skipped.generate = false;
        root.symbols.push(skipped);
        root.symbols.push(function(""));

        let filtered = root.filtered();
        assert_eq!(filtered.symbols.len(), 1);
        assert_eq!(filtered.symbols[0].name, "keep");
    }

    #[test]
    fn test_filtered_applies_to_class_members() {
        let mut hidden = method("internal");
        hidden.generate = false;
        let class = Symbol::new(
            "Widget",
            SymbolKind::Class {
                members: vec![method("show"), hidden],
            },
        );
        let mut root = Namespace::root();
        root.symbols.push(class);

        let filtered = root.filtered();
        match &filtered.symbols[0].kind {
            SymbolKind::Class { members } => {
                assert_eq!(members.len(), 1);
                assert_eq!(members[0].name, "show");
            }
            other => panic!("expected class, got {other:?}"),
        }
    }

    #[test]
    fn test_visit_symbols_mut_reaches_class_members() {
        let mut root = Namespace::root();
        root.symbols.push(Symbol::new(
            "Widget",
            SymbolKind::Class {
                members: vec![method("show")],
            },
        ));
        root.child_mut("detail").symbols.push(function("helper"));

        let mut seen = Vec::new();
        root.visit_symbols_mut(&mut |s| seen.push(s.name.clone()));
        assert_eq!(seen, vec!["Widget", "show", "helper"]);
        assert_eq!(root.symbol_count(), 3);
    }

    #[test]
    fn test_symbol_table_json_shape() {
        let table = serde_json::json!({
            "symbols": [
                { "name": "VERSION", "kind": "macro", "body": "3" },
                { "name": "init", "kind": "function", "ret": "int",
                  "params": [{ "name": "flags", "type": "int" }] }
            ],
            "children": [
                {
                    "name": "api",
                    "symbols": [
                        { "name": "Session", "kind": "class", "members": [
                            { "name": "login", "kind": "method",
                              "is_virtual": true }
                        ] }
                    ]
                }
            ]
        });

        let mut ns: Namespace = serde_json::from_value(table).unwrap();
        ns.qualify();

        assert!(ns.symbols[0].generate);
        assert_eq!(ns.symbols[1].full_name, "init");
        match &ns.symbols[1].kind {
            SymbolKind::Function { params, ret } => {
                assert_eq!(ret, "int");
                assert_eq!(params[0].ty, "int");
            }
            other => panic!("expected function, got {other:?}"),
        }
        assert_eq!(ns.children[0].symbols[0].full_name, "api::Session");
    }
}
