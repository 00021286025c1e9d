//! Minimal C/C++ header declaration scanner.
//!
//! Brace- and statement-oriented: comments are stripped up front, then the
//! source is consumed as a sequence of directives, declarations ending in
//! `;`, and `{ ... }` blocks. Recognized constructs become symbols;
//! everything else is skipped with a debug log. This is not a C++ parser.
//! The [`SymbolSource`](super::SymbolSource) trait is the real boundary and
//! a full-fidelity parser can feed the pipeline through preparsed tables.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::symbols::{EnumValue, Namespace, Param, Symbol, SymbolKind};

use super::{ParseError, SymbolSource};

/// Spellings that can end a type but never name a declaration.
const TYPE_KEYWORDS: &[&str] = &[
    "void", "bool", "char", "short", "int", "long", "signed", "unsigned", "float", "double",
    "auto", "wchar_t", "size_t",
];

/// Scanner over one entry header and the quoted includes reachable from it.
#[derive(Debug)]
pub struct HeaderScanner {
    entry: PathBuf,
    include_paths: Vec<PathBuf>,
}

impl HeaderScanner {
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            include_paths: Vec::new(),
        }
    }

    /// Search roots for quoted includes, tried after the including file's
    /// own directory.
    pub fn with_include_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.include_paths = paths;
        self
    }
}

impl SymbolSource for HeaderScanner {
    fn parse(&self) -> Result<Namespace, ParseError> {
        let mut root = Namespace::root();
        let mut visited = BTreeSet::new();
        scan_file(&self.entry, &self.include_paths, &mut visited, &mut root)?;
        root.qualify();
        Ok(root)
    }
}

struct Ctx<'a> {
    dir: PathBuf,
    include_paths: &'a [PathBuf],
    visited: &'a mut BTreeSet<PathBuf>,
}

fn scan_file(
    path: &Path,
    include_paths: &[PathBuf],
    visited: &mut BTreeSet<PathBuf>,
    ns: &mut Namespace,
) -> Result<(), ParseError> {
    let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Ok(());
    }
    let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "scanning header");

    let stripped = strip_comments(&text);
    let mut cursor = Cursor::new(&stripped, path);
    let mut ctx = Ctx {
        dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        include_paths,
        visited,
    };
    parse_scope(&mut cursor, ns, &mut ctx, false)
}

// ============================================================================
// Scope parsing
// ============================================================================

fn parse_scope(
    cursor: &mut Cursor<'_>,
    ns: &mut Namespace,
    ctx: &mut Ctx<'_>,
    nested: bool,
) -> Result<(), ParseError> {
    loop {
        cursor.skip_ws();
        match cursor.peek() {
            None => {
                return if nested {
                    Err(cursor.error("unexpected end of file inside a block"))
                } else {
                    Ok(())
                };
            }
            Some('}') => {
                cursor.bump();
                return if nested {
                    Ok(())
                } else {
                    Err(cursor.error("unbalanced `}`"))
                };
            }
            Some('#') => directive(cursor, ns, ctx)?,
            Some(';') => {
                cursor.bump();
            }
            _ => match cursor.read_statement()? {
                Stmt::Decl(text) => {
                    if let Some(symbol) = classify_declaration(&normalize_decl(&text)) {
                        ns.symbols.push(symbol);
                    }
                }
                Stmt::Block(header) => dispatch_block(cursor, ns, ctx, &header)?,
            },
        }
    }
}

fn dispatch_block(
    cursor: &mut Cursor<'_>,
    ns: &mut Namespace,
    ctx: &mut Ctx<'_>,
    header: &str,
) -> Result<(), ParseError> {
    let header = normalize_decl(header);

    if let Some(rest) = strip_prefix_word(&header, "namespace") {
        if rest.is_empty() {
            // anonymous namespace: contents stay in the enclosing scope
            return parse_scope(cursor, ns, ctx, true);
        }
        let mut target = ns;
        for part in rest.split("::") {
            target = target.child_mut(part.trim());
        }
        return parse_scope(cursor, target, ctx, true);
    }

    if header == "extern \"C\"" || header == "extern \"C++\"" {
        return parse_scope(cursor, ns, ctx, true);
    }

    if let Some(rest) = strip_prefix_word(&header, "enum") {
        let body = cursor.read_block_raw()?;
        cursor.skip_ws();
        cursor.eat(';');
        ns.symbols.push(parse_enum(rest, &body));
        return Ok(());
    }

    let class_like =
        strip_prefix_word(&header, "class").or_else(|| strip_prefix_word(&header, "struct"));
    if let Some(rest) = class_like {
        let public_default = header.starts_with("struct");
        let name = class_name(rest);
        if name.is_empty() {
            tracing::debug!(header, "skipping anonymous aggregate");
            cursor.read_block_raw()?;
        } else {
            let members = parse_class_body(cursor, &name, public_default)?;
            ns.symbols
                .push(Symbol::new(name, SymbolKind::Class { members }));
        }
        cursor.skip_ws();
        cursor.eat(';');
        return Ok(());
    }

    if header.contains('(') {
        // inline function definition; the body itself is irrelevant
        cursor.read_block_raw()?;
        if let Some(symbol) = classify_declaration(&header) {
            ns.symbols.push(symbol);
        }
        return Ok(());
    }

    tracing::debug!(header, "skipping unrecognized block");
    cursor.read_block_raw()?;
    cursor.skip_ws();
    cursor.eat(';');
    Ok(())
}

/// Class name from the text between the keyword and `{`: the last token of
/// the pre-inheritance segment, ignoring a trailing `final` and any export
/// macros before the name.
fn class_name(rest: &str) -> String {
    rest.split(':')
        .next()
        .unwrap_or("")
        .split_whitespace()
        .filter(|t| *t != "final")
        .next_back()
        .unwrap_or("")
        .to_string()
}

fn parse_class_body(
    cursor: &mut Cursor<'_>,
    class_name: &str,
    public_default: bool,
) -> Result<Vec<Symbol>, ParseError> {
    let mut members = Vec::new();
    let mut public = public_default;
    loop {
        cursor.skip_ws();
        match cursor.peek() {
            None => return Err(cursor.error("unexpected end of file inside a class")),
            Some('}') => {
                cursor.bump();
                return Ok(members);
            }
            Some('#') => {
                // conditional compilation inside a class body is ignored
                let line = cursor.read_line();
                tracing::debug!(directive = line.trim(), "skipping directive in class body");
            }
            Some(';') => {
                cursor.bump();
            }
            _ => {
                if let Some(access) = cursor.eat_access_label() {
                    public = access;
                    continue;
                }
                match cursor.read_statement()? {
                    Stmt::Decl(text) => {
                        if public {
                            if let Some(member) =
                                classify_member(&normalize_decl(&text), class_name)
                            {
                                members.push(member);
                            }
                        }
                    }
                    Stmt::Block(header) => {
                        let header = normalize_decl(&header);
                        cursor.read_block_raw()?;
                        if header.starts_with("class ")
                            || header.starts_with("struct ")
                            || header.starts_with("enum ")
                            || header.starts_with("union ")
                        {
                            tracing::debug!(header, "skipping nested type");
                            cursor.skip_ws();
                            cursor.eat(';');
                        } else if public {
                            // method defined inline; only the signature counts
                            if let Some(member) = classify_member(&header, class_name) {
                                members.push(member);
                            }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Directives
// ============================================================================

fn directive(
    cursor: &mut Cursor<'_>,
    ns: &mut Namespace,
    ctx: &mut Ctx<'_>,
) -> Result<(), ParseError> {
    let mut line = cursor.read_line();
    while line.trim_end().ends_with('\\') && !cursor.eof() {
        let trimmed = line.trim_end().trim_end_matches('\\').to_string();
        line = format!("{trimmed} {}", cursor.read_line());
    }
    let body = line.trim_start().trim_start_matches('#').trim();

    if let Some(rest) = strip_prefix_word(body, "include").or_else(|| {
        // `#include"x.h"` without a space is legal
        body.strip_prefix("include")
            .filter(|r| r.starts_with('"') || r.starts_with('<'))
    }) {
        let rest = rest.trim();
        if let Some(file) = rest.strip_prefix('"').and_then(|r| r.split('"').next()) {
            follow_include(file, ns, ctx)?;
        }
        // angle-bracket includes are system headers, never followed
        return Ok(());
    }

    if let Some(rest) = strip_prefix_word(body, "define") {
        let name: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if name.is_empty() {
            return Ok(());
        }
        let after = &rest[name.len()..];
        if after.starts_with('(') {
            tracing::debug!(name, "skipping function-like macro");
            return Ok(());
        }
        ns.symbols.push(Symbol::new(
            name,
            SymbolKind::Macro {
                body: normalize_decl(after),
            },
        ));
    }
    Ok(())
}

fn follow_include(file: &str, ns: &mut Namespace, ctx: &mut Ctx<'_>) -> Result<(), ParseError> {
    let mut candidates = vec![ctx.dir.join(file)];
    candidates.extend(ctx.include_paths.iter().map(|root| root.join(file)));

    match candidates.into_iter().find(|c| c.is_file()) {
        Some(resolved) => scan_file(&resolved, ctx.include_paths, ctx.visited, ns),
        None => {
            tracing::debug!(file, "quoted include not found on the search path");
            Ok(())
        }
    }
}

// ============================================================================
// Declaration classification
// ============================================================================

fn classify_declaration(text: &str) -> Option<Symbol> {
    let mut rest = text.trim();
    if rest.is_empty() {
        return None;
    }
    let mut is_const = false;
    loop {
        if let Some(r) = strip_prefix_word(rest, "inline")
            .or_else(|| strip_prefix_word(rest, "static"))
            .or_else(|| strip_prefix_word(rest, "extern"))
        {
            rest = strip_linkage_string(r);
            continue;
        }
        if let Some(r) = strip_prefix_word(rest, "constexpr") {
            is_const = true;
            rest = r;
            continue;
        }
        break;
    }

    if let Some(r) = strip_prefix_word(rest, "typedef") {
        return parse_typedef(r);
    }
    if let Some(r) = strip_prefix_word(rest, "using") {
        return parse_using(r);
    }
    if rest.starts_with("template")
        || strip_prefix_word(rest, "friend").is_some()
        || strip_prefix_word(rest, "namespace").is_some()
    {
        tracing::debug!(decl = text, "skipping unsupported declaration");
        return None;
    }
    if strip_prefix_word(rest, "class").is_some()
        || strip_prefix_word(rest, "struct").is_some()
        || strip_prefix_word(rest, "enum").is_some()
        || strip_prefix_word(rest, "union").is_some()
    {
        tracing::debug!(decl = text, "skipping forward declaration");
        return None;
    }

    if rest.contains('(') {
        return parse_function_decl(rest)
            .map(|(name, params, ret)| Symbol::new(name, SymbolKind::Function { params, ret }));
    }
    parse_variable_decl(rest, is_const)
}

/// Linkage string attached to a single declaration: `extern "C" int f();`.
fn strip_linkage_string(rest: &str) -> &str {
    let Some(tail) = rest.strip_prefix('"') else {
        return rest;
    };
    match tail.find('"') {
        Some(end) => tail[end + 1..].trim_start(),
        None => rest,
    }
}

fn classify_member(text: &str, class_name: &str) -> Option<Symbol> {
    let mut rest = text.trim();
    if rest.is_empty() {
        return None;
    }
    let mut is_virtual = false;
    let mut is_static = false;
    let mut const_hint = false;
    loop {
        if let Some(r) = strip_prefix_word(rest, "virtual") {
            is_virtual = true;
            rest = r;
            continue;
        }
        if let Some(r) = strip_prefix_word(rest, "static") {
            is_static = true;
            rest = r;
            continue;
        }
        if let Some(r) =
            strip_prefix_word(rest, "inline").or_else(|| strip_prefix_word(rest, "explicit"))
        {
            rest = r;
            continue;
        }
        if let Some(r) = strip_prefix_word(rest, "constexpr") {
            const_hint = true;
            rest = r;
            continue;
        }
        if strip_prefix_word(rest, "friend").is_some()
            || strip_prefix_word(rest, "using").is_some()
            || strip_prefix_word(rest, "typedef").is_some()
            || rest.starts_with("template")
        {
            tracing::debug!(member = text, "skipping unsupported member");
            return None;
        }
        break;
    }
    if strip_prefix_word(rest, "class").is_some()
        || strip_prefix_word(rest, "struct").is_some()
        || strip_prefix_word(rest, "enum").is_some()
        || strip_prefix_word(rest, "union").is_some()
    {
        tracing::debug!(member = text, "skipping forward declaration");
        return None;
    }

    let mut is_pure = false;
    let mut is_final = false;
    loop {
        let t = rest.trim_end();
        if let Some(s) = strip_suffix_word(t, "noexcept") {
            rest = s;
            continue;
        }
        if let Some(s) = strip_suffix_word(t, "override") {
            rest = s;
            continue;
        }
        if let Some(s) = strip_suffix_word(t, "final") {
            is_final = true;
            rest = s;
            continue;
        }
        if strip_suffix_word(t, "delete")
            .or_else(|| strip_suffix_word(t, "default"))
            .and_then(|s| s.trim_end().strip_suffix('='))
            .is_some()
        {
            return None;
        }
        if let Some(s) = t
            .strip_suffix('0')
            .and_then(|s| s.trim_end().strip_suffix('='))
        {
            if s.trim_end().ends_with(')') {
                is_pure = true;
                is_virtual = true;
                rest = s.trim_end();
                continue;
            }
        }
        break;
    }
    let mut rest = rest.trim_end().to_string();

    let mut is_const = false;
    if rest.contains('(') {
        if let Some(s) = strip_suffix_word(&rest, "const") {
            is_const = true;
            rest = s.to_string();
        }
    }
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }

    if rest.starts_with('~') {
        return None;
    }
    if rest.contains('(') {
        let (name, params, ret) = parse_function_decl(rest)?;
        if name == class_name {
            return None;
        }
        return Some(Symbol::new(
            name,
            SymbolKind::Method {
                params,
                ret,
                is_virtual,
                is_pure_virtual: is_pure,
                is_static,
                is_const,
                is_final,
            },
        ));
    }
    parse_variable_decl(rest, const_hint)
}

fn parse_function_decl(text: &str) -> Option<(String, Vec<Param>, String)> {
    let open = text.find('(')?;
    let head = text[..open].trim_end();
    if head.contains("operator") || head.is_empty() {
        tracing::debug!(decl = text, "skipping operator or unnamed function");
        return None;
    }
    let name_start = trailing_identifier(head);
    let name = &head[name_start..];
    let ret = head[..name_start].trim();
    if name.is_empty() || ret.is_empty() || ret.ends_with(':') {
        tracing::debug!(decl = text, "skipping declaration without a plain name");
        return None;
    }
    let close = matching_paren(text, open)?;
    let params = split_params(&text[open + 1..close]);
    Some((name.to_string(), params, ret.to_string()))
}

fn parse_variable_decl(text: &str, outer_const: bool) -> Option<Symbol> {
    let (decl, value) = match text.split_once('=') {
        Some((d, v)) => (d.trim_end(), Some(v.trim().to_string())),
        None => (text.trim_end(), None),
    };
    if decl.ends_with(']') {
        tracing::debug!(decl = text, "skipping array declaration");
        return None;
    }
    let name_start = trailing_identifier(decl);
    let name = &decl[name_start..];
    let ty = decl[..name_start].trim();
    if name.is_empty()
        || ty.is_empty()
        || ty.ends_with(':')
        || name.starts_with(|c: char| c.is_ascii_digit())
    {
        tracing::debug!(decl = text, "skipping unrecognized declaration");
        return None;
    }
    let is_const = outer_const || has_word(decl, "const");
    Some(Symbol::new(
        name,
        SymbolKind::Variable {
            ty: ty.to_string(),
            value,
            is_const,
            from_macro: false,
        },
    ))
}

fn parse_typedef(rest: &str) -> Option<Symbol> {
    let rest = rest.trim();
    // function-pointer alias: `ret (*Name)(args)`
    if let Some(star) = rest.find("(*") {
        let after = &rest[star + 2..];
        let name: String = after
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if name.is_empty() {
            return None;
        }
        let target = rest.replacen(&format!("(*{name})"), "(*)", 1);
        return Some(Symbol::new(name, SymbolKind::Typedef { target }));
    }
    if rest.ends_with(']') {
        tracing::debug!(decl = rest, "skipping array typedef");
        return None;
    }
    let name_start = trailing_identifier(rest);
    let name = &rest[name_start..];
    let target = rest[..name_start].trim();
    if name.is_empty() || target.is_empty() {
        return None;
    }
    Some(Symbol::new(
        name,
        SymbolKind::Typedef {
            target: target.to_string(),
        },
    ))
}

fn parse_using(rest: &str) -> Option<Symbol> {
    if strip_prefix_word(rest, "namespace").is_some() {
        return None;
    }
    let (name, target) = rest.split_once('=')?;
    Some(Symbol::new(
        name.trim(),
        SymbolKind::Typedef {
            target: target.trim().to_string(),
        },
    ))
}

fn parse_enum(header_rest: &str, body: &str) -> Symbol {
    let mut rest = header_rest.trim();
    let mut is_scoped = false;
    if let Some(r) =
        strip_prefix_word(rest, "class").or_else(|| strip_prefix_word(rest, "struct"))
    {
        is_scoped = true;
        rest = r;
    }
    // the underlying-type clause after `:` is irrelevant here
    let name = rest.split(':').next().unwrap_or("").trim();
    Symbol::new(
        name,
        SymbolKind::Enum {
            is_scoped,
            values: parse_enumerators(body),
        },
    )
}

fn parse_enumerators(body: &str) -> Vec<EnumValue> {
    let mut values = Vec::new();
    let mut next = 0i64;
    for piece in body.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let (name, explicit) = match piece.split_once('=') {
            Some((n, v)) => (n.trim(), parse_int_literal(v.trim())),
            None => (piece, None),
        };
        if name.is_empty() || !is_identifier(name) {
            continue;
        }
        if let Some(v) = explicit {
            next = v;
        }
        values.push(EnumValue {
            name: name.to_string(),
            value: next,
        });
        next = next.wrapping_add(1);
    }
    values
}

fn parse_int_literal(text: &str) -> Option<i64> {
    let t = text
        .trim()
        .trim_end_matches(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
    let (neg, t) = match t.strip_prefix('-') {
        Some(r) => (true, r.trim_start()),
        None => (false, t),
    };
    let value = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        t.parse::<i64>().ok()?
    };
    Some(if neg { -value } else { value })
}

fn split_params(text: &str) -> Vec<Param> {
    let mut params = Vec::new();
    let mut depth = 0i32;
    let mut piece = String::new();
    for c in text.chars() {
        match c {
            '(' | '<' | '[' => {
                depth += 1;
                piece.push(c);
            }
            ')' | '>' | ']' => {
                depth -= 1;
                piece.push(c);
            }
            ',' if depth == 0 => {
                push_param(&mut params, &piece);
                piece.clear();
            }
            _ => piece.push(c),
        }
    }
    push_param(&mut params, &piece);

    // C-style empty parameter list
    if params.len() == 1 && params[0].name.is_empty() && params[0].ty == "void" {
        params.clear();
    }
    params
}

fn push_param(params: &mut Vec<Param>, piece: &str) {
    // default arguments do not survive into the table
    let piece = piece.split('=').next().unwrap_or("").trim();
    if piece.is_empty() {
        return;
    }
    if piece == "..." {
        params.push(Param {
            name: String::new(),
            ty: "...".to_string(),
        });
        return;
    }
    let (ty, name) = split_param_name(piece);
    params.push(Param { name, ty });
}

/// Split `const char *host` into the type and the trailing parameter name,
/// when one is present.
fn split_param_name(piece: &str) -> (String, String) {
    let name_start = trailing_identifier(piece);
    let candidate = &piece[name_start..];
    let ty = piece[..name_start].trim();
    if candidate.is_empty()
        || ty.is_empty()
        || ty.ends_with("::")
        || TYPE_KEYWORDS.contains(&candidate)
        || candidate.starts_with(|c: char| c.is_ascii_digit())
    {
        return (piece.to_string(), String::new());
    }
    (ty.to_string(), candidate.to_string())
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offset where the trailing `[A-Za-z0-9_]+` run begins, or the text
/// length when the text does not end in one.
fn trailing_identifier(text: &str) -> usize {
    text.char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn normalize_decl(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !text.starts_with(|c: char| c.is_ascii_digit())
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .any(|t| t == word)
}

fn strip_prefix_word<'t>(text: &'t str, word: &str) -> Option<&'t str> {
    let rest = text.strip_prefix(word)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Strip a trailing keyword only on a word boundary, so a declaration name
/// merely ending in the keyword is left alone.
fn strip_suffix_word<'t>(text: &'t str, word: &str) -> Option<&'t str> {
    let stripped = text.strip_suffix(word)?;
    let trimmed = stripped.trim_end();
    if trimmed.len() == stripped.len() && !trimmed.is_empty() && !trimmed.ends_with(')') {
        return None;
    }
    Some(trimmed)
}

// ============================================================================
// Character-level cursor
// ============================================================================

enum Stmt {
    Decl(String),
    Block(String),
}

struct Cursor<'s> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    path: &'s Path,
}

impl<'s> Cursor<'s> {
    fn new(text: &str, path: &'s Path) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            path,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            path: self.path.to_path_buf(),
            line: self.line,
            message: message.into(),
        }
    }

    /// Consume to the end of the current line, excluding the newline's
    /// character from the result.
    fn read_line(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.bump();
            if c == '\n' {
                break;
            }
            out.push(c);
        }
        out
    }

    /// Accumulate one statement, ending at `;` (declaration) or `{` (block
    /// header). Both terminators are consumed.
    fn read_statement(&mut self) -> Result<Stmt, ParseError> {
        let mut buf = String::new();
        while let Some(c) = self.peek() {
            match c {
                ';' => {
                    self.bump();
                    return Ok(Stmt::Decl(buf));
                }
                '{' => {
                    self.bump();
                    return Ok(Stmt::Block(buf));
                }
                '}' => return Err(self.error("unexpected `}` inside a declaration")),
                '"' | '\'' => {
                    self.bump();
                    buf.push(c);
                    self.read_literal_into(&mut buf, c)?;
                }
                _ => {
                    self.bump();
                    buf.push(c);
                }
            }
        }
        Err(self.error("unexpected end of file inside a declaration"))
    }

    /// Consume a `{ ... }` body whose opening brace was already taken,
    /// returning the raw content between the braces.
    fn read_block_raw(&mut self) -> Result<String, ParseError> {
        let mut depth = 1usize;
        let mut buf = String::new();
        while let Some(c) = self.bump() {
            match c {
                '{' => {
                    depth += 1;
                    buf.push(c);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(buf);
                    }
                    buf.push(c);
                }
                '"' | '\'' => {
                    buf.push(c);
                    self.read_literal_into(&mut buf, c)?;
                }
                _ => buf.push(c),
            }
        }
        Err(self.error("unbalanced braces"))
    }

    fn read_literal_into(&mut self, buf: &mut String, quote: char) -> Result<(), ParseError> {
        while let Some(c) = self.bump() {
            buf.push(c);
            if c == '\\' {
                if let Some(escaped) = self.bump() {
                    buf.push(escaped);
                }
            } else if c == quote {
                return Ok(());
            }
        }
        Err(self.error("unterminated literal"))
    }

    /// Consume `public:` / `private:` / `protected:`, reporting whether the
    /// following members are public. Restores the cursor on anything else.
    fn eat_access_label(&mut self) -> Option<bool> {
        let start = (self.pos, self.line);
        let mut word = String::new();
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        {
            word.push(self.bump().unwrap_or_default());
        }
        let is_label = matches!(word.as_str(), "public" | "private" | "protected");
        if is_label {
            let mark = (self.pos, self.line);
            self.skip_ws();
            if self.eat(':') && self.peek() != Some(':') {
                return Some(word == "public");
            }
            (self.pos, self.line) = mark;
        }
        (self.pos, self.line) = start;
        None
    }
}

// ============================================================================
// Comment stripping
// ============================================================================

/// Remove line and block comments, preserving newlines so diagnostics keep
/// their line numbers. String and char literals pass through untouched.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                while chars.peek().is_some_and(|&n| n != '\n') {
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                loop {
                    match chars.next() {
                        None => break,
                        Some('*') if chars.peek() == Some(&'/') => {
                            chars.next();
                            break;
                        }
                        Some('\n') => out.push('\n'),
                        Some(_) => {}
                    }
                }
            }
            '"' | '\'' => {
                out.push(c);
                while let Some(n) = chars.next() {
                    out.push(n);
                    if n == '\\' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if n == c {
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}
